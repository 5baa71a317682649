use std::fmt;
use thiserror::Error;

use crate::constant::DOUBLE_DASH;
use crate::matcher::Bindings;
use crate::tokens::{Compiler, GrammarError, Token};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Error raised by [`Router::dispatch`] when no registered route consumes
/// the input.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no matching route found")]
pub struct NoRouteFound;

/// Error raised by [`Router::remove`] for an id that is not registered.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("given route is not registered")]
pub struct UnknownRoute;

/// Identity of a registered route, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(usize);

/// One registered route: an optional pattern tree plus the handler to invoke
/// when it matches.
///
/// A route without a tree (registered from an empty pattern) matches only an
/// empty remaining input.
pub struct Route<T> {
    token: Option<Token>,
    handler: Box<dyn FnMut(Bindings) -> T>,
    id: usize,
}

impl<T> Route<T> {
    /// Matches the route against `input`, requiring that nothing but at most
    /// a single trailing `--` separator remains afterwards.
    ///
    /// All-or-nothing: on `false` both `input` and `output` are restored.
    pub fn matches(&self, input: &mut Vec<String>, output: &mut Bindings) -> bool {
        let token = match &self.token {
            None => return remainder_consumed(input),
            Some(token) => token,
        };

        let saved_input = input.clone();
        let saved_output = output.clone();

        if token.matches(input, output) && remainder_consumed(input) {
            true
        } else {
            // excessive remaining elements reject the candidate
            *input = saved_input;
            *output = saved_output;
            false
        }
    }
}

impl<T> fmt::Display for Route<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{token}"),
            None => Ok(()),
        }
    }
}

impl<T> fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

fn remainder_consumed(input: &[String]) -> bool {
    input.is_empty() || (input.len() == 1 && input[0] == DOUBLE_DASH)
}

/// Registers routes and dispatches input token lists to the first route that
/// matches, in registration order.
///
/// The router never reads process state; callers pass the argument vector
/// (program name already stripped) to [`Router::dispatch`] explicitly.
pub struct Router<T> {
    routes: Vec<Route<T>>,
    compiler: Compiler,
    next_id: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::with_compiler(Compiler::new())
    }
}

impl<T> Router<T> {
    /// A router with no routes, using the standard filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A router compiling its patterns with `compiler`, e.g. one carrying
    /// custom filters.
    pub fn with_compiler(compiler: Compiler) -> Self {
        Self {
            routes: Vec::new(),
            compiler,
            next_id: 0,
        }
    }

    /// Compiles `pattern` and appends the route.
    ///
    /// An empty or whitespace-only pattern registers a route that matches
    /// only an empty input.
    pub fn add(
        &mut self,
        pattern: &str,
        handler: impl FnMut(Bindings) -> T + 'static,
    ) -> Result<RouteId, GrammarError> {
        let token = if pattern.trim().is_empty() {
            None
        } else {
            Some(self.compiler.compile(pattern)?)
        };

        let id = self.next_id;
        self.next_id += 1;
        self.routes.push(Route {
            token,
            handler: Box::new(handler),
            id,
        });

        Ok(RouteId(id))
    }

    /// Removes the route registered under `id`.
    pub fn remove(&mut self, id: RouteId) -> Result<(), UnknownRoute> {
        match self.routes.iter().position(|route| route.id == id.0) {
            Some(index) => {
                self.routes.remove(index);
                Ok(())
            }
            None => Err(UnknownRoute),
        }
    }

    /// The registered routes, in registration order.  Each route displays
    /// its pattern, which callers may use to render usage text.
    pub fn routes(&self) -> impl Iterator<Item = &Route<T>> {
        self.routes.iter()
    }

    /// Matches `args` against the registered routes in order and invokes the
    /// handler of the first route that consumes the input, returning its
    /// result.
    ///
    /// Each candidate works on its own copy of `args`; a route whose match
    /// leaves unconsumed input (beyond a single trailing `--`) is rejected
    /// and the next is tried.
    pub fn dispatch<S: AsRef<str>>(&mut self, args: &[S]) -> Result<T, NoRouteFound> {
        let args: Vec<String> = args.iter().map(|arg| arg.as_ref().to_string()).collect();

        for route in self.routes.iter_mut() {
            let mut input = args.clone();
            let mut output = Bindings::new();

            if Route::matches(route, &mut input, &mut output) {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!(
                        "Route '{route}' matched with {count} binding(s).",
                        count = output.len()
                    );
                }

                return Ok((route.handler)(output));
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("No route matched {count} input token(s).", count = args.len());
        }

        Err(NoRouteFound)
    }
}

impl<T> fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}
