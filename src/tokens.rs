mod compiler;
pub(crate) mod model;

pub use compiler::Compiler;
pub use model::{Filter, FilterPredicate, GrammarError, OptionKind, Token};
