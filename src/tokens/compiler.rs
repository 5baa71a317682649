use std::collections::HashMap;

use crate::constant::ELLIPSIS;
use crate::tokens::model::{Filter, GrammarError, OptionKind, Token};

/// Compiles route patterns into [`Token`] trees.
///
/// A `Compiler` owns the filter registry: `int`, `uint`, `float`, `ufloat`
/// and `bool` are preloaded, and custom named filters may be added via
/// [`Compiler::register_filter`].  Filter names resolve at compile time; an
/// unknown name fails the pattern, never the first match.
pub struct Compiler {
    filters: HashMap<String, Filter>,
}

impl Default for Compiler {
    fn default() -> Self {
        let filters = [
            Filter::Int,
            Filter::Uint,
            Filter::Float,
            Filter::Ufloat,
            Filter::Bool,
        ]
        .into_iter()
        .map(|filter| (filter.name().to_string(), filter))
        .collect();

        Self { filters }
    }
}

impl Compiler {
    /// A compiler with the standard filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom filter under `name`.
    ///
    /// The predicate receives each candidate value by mutable reference and
    /// may rewrite it in place; returning `false` rejects the value.
    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&mut String) -> bool + Send + Sync + 'static,
    ) {
        let name = name.into();
        self.filters.insert(
            name.clone(),
            Filter::Custom {
                name,
                predicate: std::sync::Arc::new(predicate),
            },
        );
    }

    /// Compiles `pattern` into a token tree.
    ///
    /// The whole pattern must be consumed; see [`GrammarError`] for the
    /// refusal conditions.
    pub fn compile(&self, pattern: &str) -> Result<Token, GrammarError> {
        let mut cursor = Cursor::new(pattern);
        cursor.skip_whitespace();

        if cursor.at_end() {
            return Err(GrammarError::EmptyPattern);
        }

        let token = self.read_alternative_sentence_or_single(&mut cursor)?;
        cursor.skip_whitespace();

        match cursor.peek() {
            None => Ok(token),
            Some(c) => Err(GrammarError::Unexpected(c)),
        }
    }

    /// One-or-more sentences separated by `|`; a single sentence returns
    /// as-is, otherwise the members wrap in an alternative.
    fn read_alternative_sentence_or_single(
        &self,
        cursor: &mut Cursor,
    ) -> Result<Token, GrammarError> {
        let mut members = vec![self.read_sentence_or_single(cursor)?];

        while cursor.eat('|') {
            members.push(self.read_sentence_or_single(cursor)?);
        }

        if members.len() == 1 {
            Ok(members.pop().expect("members is non-empty"))
        } else {
            Token::alternative(members)
        }
    }

    /// One-or-more tokens separated by mandatory whitespace, up to a
    /// terminator (`]`, `)`, `|` or end of input); a single token returns
    /// as-is, otherwise the members wrap in a sentence.
    fn read_sentence_or_single(&self, cursor: &mut Cursor) -> Result<Token, GrammarError> {
        cursor.skip_whitespace();
        let mut members = Vec::new();
        let mut separated = true;

        while !matches!(cursor.peek(), None | Some(']' | ')' | '|')) {
            if !separated {
                return Err(GrammarError::MissingWhitespace);
            }

            members.push(self.read_token(cursor)?);
            separated = cursor.skip_whitespace() > 0;
        }

        match members.len() {
            0 => Err(GrammarError::EmptyBlock),
            1 => Ok(members.pop().expect("members is non-empty")),
            _ => Token::sentence(members),
        }
    }

    /// Dispatches on the lookahead character, then checks for a trailing
    /// `...` repetition suffix.
    fn read_token(&self, cursor: &mut Cursor) -> Result<Token, GrammarError> {
        let token = match cursor.peek() {
            Some('<') => self.read_argument(cursor)?,
            Some('[') => self.read_optional_block(cursor)?,
            Some('(') => self.read_group(cursor)?,
            _ => self.read_word(cursor)?,
        };

        // `...` may trail the token across whitespace
        let saved = cursor.pos();
        cursor.skip_whitespace();

        if cursor.take(ELLIPSIS) {
            return Token::ellipsis(token);
        }

        cursor.rewind(saved);
        Ok(token)
    }

    /// Consumes `<name>` or `<name:filter>`, trimming whitespace around the
    /// name and filter.
    fn read_argument(&self, cursor: &mut Cursor) -> Result<Token, GrammarError> {
        cursor.advance(); // consume '<'
        let mut inner = String::new();

        loop {
            match cursor.next() {
                None => return Err(GrammarError::UnterminatedArgument),
                Some('>') => break,
                Some(c) => inner.push(c),
            }
        }

        let (name, filter) = match inner.split_once(':') {
            Some((name, filter)) => (name.trim(), Some(filter.trim())),
            None => (inner.trim(), None),
        };

        let filter = match filter {
            Some(name) => Some(
                self.filters
                    .get(name)
                    .cloned()
                    .ok_or_else(|| GrammarError::UnknownFilter(name.to_string()))?,
            ),
            None => None,
        };

        Token::argument(name, filter)
    }

    /// Consumes `[..]`, wrapping the inner tree in an optional token.
    fn read_optional_block(&self, cursor: &mut Cursor) -> Result<Token, GrammarError> {
        cursor.advance(); // consume '['
        let inner = self.read_alternative_sentence_or_single(cursor)?;

        if !cursor.eat(']') {
            return Err(GrammarError::UnterminatedOptional);
        }

        Token::optional(inner)
    }

    /// Consumes `(..)`; transparent grouping, the inner tree is returned
    /// directly.
    fn read_group(&self, cursor: &mut Cursor) -> Result<Token, GrammarError> {
        cursor.advance(); // consume '('
        let inner = self.read_alternative_sentence_or_single(cursor)?;

        if !cursor.eat(')') {
            return Err(GrammarError::UnterminatedGroup);
        }

        Ok(inner)
    }

    /// Consumes a literal run.  A leading dash switches to option syntax,
    /// which may continue with a `=<..>` (required) or `[=<..>]` (optional)
    /// value placeholder.
    fn read_word(&self, cursor: &mut Cursor) -> Result<Token, GrammarError> {
        let run = read_literal_run(cursor)?;

        if !run.starts_with('-') {
            return Ok(Token::word(run));
        }

        // attached value: `--name=..` carries its value token inline
        let name = match run.find('=') {
            Some(index) => {
                let name = run[..index].to_string();
                let after = run.chars().count() - name.chars().count() - 1;
                cursor.rewind(cursor.pos() - after);
                cursor.skip_whitespace();

                let placeholder = self.read_value_token(cursor)?;
                return self.build_option(name, Some(placeholder), true);
            }
            None => run,
        };

        // detached value: `= ..` or `[= ..]` may follow across whitespace
        let saved = cursor.pos();
        cursor.skip_whitespace();

        if cursor.eat('=') {
            cursor.skip_whitespace();
            let placeholder = self.read_value_token(cursor)?;
            return self.build_option(name, Some(placeholder), true);
        }

        if cursor.eat('[') {
            cursor.skip_whitespace();

            if cursor.eat('=') {
                cursor.skip_whitespace();
                let placeholder = self.read_alternative_sentence_or_single(cursor)?;

                if !cursor.eat(']') {
                    return Err(GrammarError::UnterminatedOptional);
                }

                return self.build_option(name, Some(placeholder), false);
            }
        }

        // not a value form after all; the whitespace separates the next token
        cursor.rewind(saved);
        self.build_option(name, None, false)
    }

    /// A single token serving as a required option value.
    fn read_value_token(&self, cursor: &mut Cursor) -> Result<Token, GrammarError> {
        match cursor.peek() {
            Some('<') => self.read_argument(cursor),
            Some('(') => self.read_group(cursor),
            Some(c) if !is_special(c) => Ok(Token::word(read_literal_run(cursor)?)),
            _ => Err(GrammarError::MissingOptionValue),
        }
    }

    fn build_option(
        &self,
        name: String,
        placeholder: Option<Token>,
        required: bool,
    ) -> Result<Token, GrammarError> {
        let (kind, bare) = match name.strip_prefix("--") {
            Some(bare) => (OptionKind::Long, bare),
            None => (OptionKind::Short, &name[1..]),
        };

        Token::option(bare, kind, placeholder, required)
            .map_err(|error| match error {
                // report the name as it was written, dashes included
                GrammarError::InvalidOptionName(_) => GrammarError::InvalidOptionName(name),
                other => other,
            })
    }
}

/// Characters which terminate a literal run.
fn is_special(c: char) -> bool {
    matches!(c, '<' | '>' | '[' | ']' | '(' | ')' | '|') || is_whitespace(c)
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Consumes a maximal run of non-special characters, leaving any trailing
/// `...` suffix for the enclosing repetition check.
fn read_literal_run(cursor: &mut Cursor) -> Result<String, GrammarError> {
    let mut run = String::new();

    while let Some(c) = cursor.peek() {
        if is_special(c) {
            break;
        }

        run.push(c);
        cursor.advance();
    }

    if run == ELLIPSIS {
        // repetition suffix with no token in front of it
        return Err(GrammarError::Unexpected('.'));
    }

    if run.len() > ELLIPSIS.len() && run.ends_with(ELLIPSIS) {
        run.truncate(run.len() - ELLIPSIS.len());
        cursor.rewind(cursor.pos() - ELLIPSIS.chars().count());
    }

    if run.is_empty() {
        return Err(GrammarError::Unexpected(cursor.peek().unwrap_or(' ')));
    }

    Ok(run)
}

/// Char cursor over the pattern string.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Consumes `c` if it is next; reports whether it was consumed.
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `prefix` if the remaining input starts with it.
    fn take(&mut self, prefix: &str) -> bool {
        let end = self.pos + prefix.chars().count();

        if end <= self.chars.len()
            && self.chars[self.pos..end].iter().copied().eq(prefix.chars())
        {
            self.pos = end;
            true
        } else {
            false
        }
    }

    /// Skips whitespace, reporting how many characters were skipped.
    fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if !is_whitespace(c) {
                break;
            }
            self.pos += 1;
        }

        self.pos - start
    }
}
