//! `cliroute` is a pattern-based command line router.
//!
//! Where a web framework routes URLs, `cliroute` routes argv-style token
//! lists: register route expressions written in a small declarative grammar,
//! and dispatch input tokens to the handler of the first expression that
//! matches, extracting named values along the way.
//!
//! # Usage
//! ```
//! use cliroute::{Bindings, Router};
//!
//! let mut router = Router::new();
//!
//! router.add("hello <name>", |args: Bindings| {
//!     format!("hello {}", args["name"].as_str().unwrap_or_default())
//! }).unwrap();
//!
//! router.add("hello", |_| "hello there".to_string()).unwrap();
//!
//! let greeting = router.dispatch(&["hello", "clue"]).unwrap();
//! assert_eq!(greeting, "hello clue");
//! ```
//!
//! # Route expressions
//! An expression is a whitespace-separated sentence of tokens:
//! * `word` matches that exact input element.
//! * `<name>` captures one input element under `name`; `<name:filter>`
//!   additionally validates/coerces it (`int`, `uint`, `float`, `ufloat`,
//!   `bool`, or a custom filter registered on the [`Compiler`]).
//! * `-x` / `--xyz` match an option flag anywhere before a `--` separator;
//!   `--xyz=<v>` requires a value, `--xyz[=<v>]` accepts one.
//! * `[..]` makes a block optional, `(..)` groups, `a | b` chooses the
//!   first alternative that matches, and a trailing `...` repeats a token,
//!   collecting its values into a list.
//!
//! Routes are tried strictly in registration order: the first route that
//! consumes the whole input (a single trailing `--` is tolerated) wins, and
//! its handler receives the collected [`Bindings`].
//!
//! Patterns are compiled once, at registration; malformed expressions are
//! reported as a [`GrammarError`] from [`Router::add`], never at match time.
//! Dispatch itself has exactly one failure mode, [`NoRouteFound`], which the
//! caller is expected to translate into a usage message (the registered
//! patterns render through [`Router::routes`] for exactly that purpose).
#![deny(missing_docs)]
mod constant;
mod matcher;
mod router;
mod tokens;

pub use matcher::{Bindings, Value};
pub use router::{NoRouteFound, Route, RouteId, Router, UnknownRoute};
pub use tokens::{Compiler, Filter, FilterPredicate, GrammarError, OptionKind, Token};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
