mod core;
mod model;

pub use model::{Bindings, Value};
