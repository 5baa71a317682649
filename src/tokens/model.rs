use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::constant::ELLIPSIS;

/// Predicate backing a custom filter.
///
/// Receives the raw input value by mutable reference and may rewrite it in
/// place.  Returning `false` rejects the value at its position.
pub type FilterPredicate = Arc<dyn Fn(&mut String) -> bool + Send + Sync>;

/// Validates (and possibly transforms) the raw value captured by an argument.
#[derive(Clone)]
pub enum Filter {
    /// Signed integer, binds as [`crate::Value::Integer`].
    Int,
    /// Non-negative integer, binds as [`crate::Value::Integer`].
    Uint,
    /// Floating point, binds as [`crate::Value::Float`].
    Float,
    /// Non-negative floating point, binds as [`crate::Value::Float`].
    Ufloat,
    /// Boolean (`1/true/on/yes` vs `0/false/off/no/`''), binds as [`crate::Value::Bool`].
    Bool,
    /// A named predicate registered via [`crate::Compiler::register_filter`].
    Custom {
        /// The name the filter resolves under in a pattern (`<x:name>`).
        name: String,
        /// The validation/rewrite predicate.
        predicate: FilterPredicate,
    },
}

impl Filter {
    /// The name this filter renders as within an argument block.
    pub fn name(&self) -> &str {
        match self {
            Filter::Int => "int",
            Filter::Uint => "uint",
            Filter::Float => "float",
            Filter::Ufloat => "ufloat",
            Filter::Bool => "bool",
            Filter::Custom { name, .. } => name,
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Custom { name, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .finish_non_exhaustive(),
            _ => f.write_str(match self {
                Filter::Int => "Int",
                Filter::Uint => "Uint",
                Filter::Float => "Float",
                Filter::Ufloat => "Ufloat",
                Filter::Bool => "Bool",
                Filter::Custom { .. } => unreachable!(),
            }),
        }
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Filter::Int, Filter::Int)
            | (Filter::Uint, Filter::Uint)
            | (Filter::Float, Filter::Float)
            | (Filter::Ufloat, Filter::Ufloat)
            | (Filter::Bool, Filter::Bool) => true,
            (
                Filter::Custom { name, predicate },
                Filter::Custom {
                    name: other_name,
                    predicate: other_predicate,
                },
            ) => name == other_name && Arc::ptr_eq(predicate, other_predicate),
            _ => false,
        }
    }
}

/// Error raised when a pattern cannot be compiled, or when a token tree
/// violates a structural invariant at construction time.
///
/// No partial tree is ever produced alongside a `GrammarError`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// The pattern is empty or whitespace-only.
    #[error("pattern must not be empty")]
    EmptyPattern,

    /// A `<` with no closing `>`.
    #[error("missing end of argument block")]
    UnterminatedArgument,

    /// A `[` with no closing `]`.
    #[error("missing end of optional block")]
    UnterminatedOptional,

    /// A `(` with no closing `)`.
    #[error("missing end of group")]
    UnterminatedGroup,

    /// A block or alternative member with no tokens in it.
    #[error("group must contain at least one token")]
    EmptyBlock,

    /// Two consecutive tokens with no whitespace between them.
    #[error("missing whitespace between tokens")]
    MissingWhitespace,

    /// An argument block with a blank name.
    #[error("argument name must not be empty")]
    EmptyArgumentName,

    /// A filter name that is not registered on the compiler.
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    /// An option name that is neither `-x` nor `--xyz` shaped.
    #[error("invalid option name '{0}'")]
    InvalidOptionName(String),

    /// A `=` value form with no value token following it.
    #[error("option is missing its value token")]
    MissingOptionValue,

    /// An alternative constructed from fewer than 2 members.
    #[error("alternative group must contain at least 2 tokens")]
    AlternativeTooFew,

    /// An optional token as a direct alternative member.
    #[error("alternative group must not contain optional tokens")]
    OptionalInAlternative,

    /// A sentence constructed from fewer than 2 members.
    #[error("sentence must contain at least 2 tokens")]
    SentenceTooFew,

    /// An optional block directly inside another optional block.
    #[error("optional block must not contain another optional block")]
    NestedOptional,

    /// A `...` suffix on an optional block, group or sentence.
    #[error("ellipsis only applies to word, argument and option tokens")]
    InvalidEllipsis,

    /// A character the grammar cannot place, e.g. an unbalanced `]`.
    #[error("unexpected character '{0}'")]
    Unexpected(char),
}

/// Whether an option is spelled `-x` or `--xyz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// Single dash, single character.
    Short,
    /// Double dash, at least two characters.
    Long,
}

/// One node of a compiled pattern.
///
/// Trees are built through the validating constructors (or via
/// [`crate::Compiler::compile`]) and are immutable afterwards; every
/// structural invariant is checked eagerly at construction, never at match
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub(crate) kind: TokenKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Word(String),
    Argument {
        name: String,
        filter: Option<Filter>,
    },
    Option {
        name: String,
        kind: OptionKind,
        placeholder: Option<Box<Token>>,
        required: bool,
    },
    Alternative(Vec<Token>),
    Optional(Box<Token>),
    Sentence(Vec<Token>),
    Ellipsis(Box<Token>),
}

pub(crate) fn dashed(kind: OptionKind, name: &str) -> String {
    match kind {
        OptionKind::Short => format!("-{name}"),
        OptionKind::Long => format!("--{name}"),
    }
}

impl Token {
    /// An exact literal word.
    pub fn word(word: impl Into<String>) -> Self {
        Token {
            kind: TokenKind::Word(word.into()),
        }
    }

    /// A named capture (`<name>` / `<name:filter>`).
    pub fn argument(name: impl Into<String>, filter: Option<Filter>) -> Result<Self, GrammarError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(GrammarError::EmptyArgumentName);
        }

        Ok(Token {
            kind: TokenKind::Argument { name, filter },
        })
    }

    /// An option flag (`-x` / `--xyz`), with an optional value placeholder.
    ///
    /// The `name` excludes the leading dash(es).  `required` controls the
    /// `=<..>` vs `[=<..>]` value forms and must not be set without a
    /// placeholder.
    pub fn option(
        name: impl Into<String>,
        kind: OptionKind,
        placeholder: Option<Token>,
        required: bool,
    ) -> Result<Self, GrammarError> {
        let name = name.into();
        let invalid = || GrammarError::InvalidOptionName(dashed(kind, &name));

        if name.starts_with('-') || name.contains('=') || name.contains(char::is_whitespace) {
            return Err(invalid());
        }

        match kind {
            OptionKind::Short => {
                if name.chars().count() != 1 {
                    return Err(invalid());
                }
            }
            OptionKind::Long => {
                if name.chars().count() < 2 {
                    return Err(invalid());
                }
            }
        }

        if required && placeholder.is_none() {
            return Err(GrammarError::MissingOptionValue);
        }

        Ok(Token {
            kind: TokenKind::Option {
                name,
                kind,
                placeholder: placeholder.map(Box::new),
                required,
            },
        })
    }

    /// A first-match-wins choice between at least 2 members.
    ///
    /// Members which are themselves alternatives are flattened into this one.
    pub fn alternative(members: Vec<Token>) -> Result<Self, GrammarError> {
        if members.len() < 2 {
            return Err(GrammarError::AlternativeTooFew);
        }

        let mut flattened = Vec::with_capacity(members.len());

        for member in members {
            match member.kind {
                TokenKind::Optional(_) => return Err(GrammarError::OptionalInAlternative),
                TokenKind::Alternative(inner) => flattened.extend(inner),
                _ => flattened.push(member),
            }
        }

        Ok(Token {
            kind: TokenKind::Alternative(flattened),
        })
    }

    /// A block that may fail to match without failing the surrounding
    /// sentence.
    pub fn optional(inner: Token) -> Result<Self, GrammarError> {
        if matches!(inner.kind, TokenKind::Optional(_)) {
            return Err(GrammarError::NestedOptional);
        }

        Ok(Token {
            kind: TokenKind::Optional(Box::new(inner)),
        })
    }

    /// An ordered conjunction of at least 2 members.
    ///
    /// Members which are themselves sentences are flattened into this one.
    pub fn sentence(members: Vec<Token>) -> Result<Self, GrammarError> {
        if members.len() < 2 {
            return Err(GrammarError::SentenceTooFew);
        }

        let mut flattened = Vec::with_capacity(members.len());

        for member in members {
            match member.kind {
                TokenKind::Sentence(inner) => flattened.extend(inner),
                _ => flattened.push(member),
            }
        }

        Ok(Token {
            kind: TokenKind::Sentence(flattened),
        })
    }

    /// Zero-or-more repetition of a word, argument or option token.
    pub fn ellipsis(inner: Token) -> Result<Self, GrammarError> {
        match inner.kind {
            TokenKind::Word(_) | TokenKind::Argument { .. } | TokenKind::Option { .. } => {
                Ok(Token {
                    kind: TokenKind::Ellipsis(Box::new(inner)),
                })
            }
            _ => Err(GrammarError::InvalidEllipsis),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Word(word) => write!(f, "{word}"),
            TokenKind::Argument { name, filter: None } => write!(f, "<{name}>"),
            TokenKind::Argument {
                name,
                filter: Some(filter),
            } => write!(f, "<{name}:{}>", filter.name()),
            TokenKind::Option {
                name,
                kind,
                placeholder,
                required,
            } => {
                write!(f, "{}", dashed(*kind, name))?;

                match placeholder {
                    None => Ok(()),
                    Some(placeholder) if *required => {
                        // required alternative values reparse through a group
                        if matches!(placeholder.kind, TokenKind::Alternative(_)) {
                            write!(f, "=({placeholder})")
                        } else {
                            write!(f, "={placeholder}")
                        }
                    }
                    Some(placeholder) => write!(f, "[={placeholder}]"),
                }
            }
            TokenKind::Alternative(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            TokenKind::Optional(inner) => write!(f, "[{inner}]"),
            TokenKind::Sentence(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    // alternatives bind looser than the sentence
                    if matches!(member.kind, TokenKind::Alternative(_)) {
                        write!(f, "({member})")?;
                    } else {
                        write!(f, "{member}")?;
                    }
                }
                Ok(())
            }
            TokenKind::Ellipsis(inner) => write!(f, "{inner}{ELLIPSIS}"),
        }
    }
}
