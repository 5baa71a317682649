use crate::constant::DOUBLE_DASH;
use crate::matcher::model::{Bindings, Value};
use crate::tokens::model::{dashed, Filter, OptionKind, Token, TokenKind};

impl Token {
    /// Attempts to consume `input` against this token, collecting named
    /// values into `output`.
    ///
    /// All-or-nothing: a `false` result leaves both `input` and `output`
    /// exactly as they were on entry; only a `true` result may mutate either.
    /// Matched elements are removed from `input`, preserving the relative
    /// order of the remainder.
    pub fn matches(&self, input: &mut Vec<String>, output: &mut Bindings) -> bool {
        match &self.kind {
            TokenKind::Word(word) => match_word(word, input),
            TokenKind::Argument { name, filter } => {
                match_argument(name, filter.as_ref(), input, output)
            }
            TokenKind::Option {
                name,
                kind,
                placeholder,
                required,
            } => match_option(
                name,
                *kind,
                placeholder.as_deref(),
                *required,
                input,
                output,
            ),
            TokenKind::Alternative(members) => members
                .iter()
                .any(|member| member.matches(input, output)),
            TokenKind::Optional(inner) => {
                // the inner token may fail without failing the whole
                inner.matches(input, output);
                true
            }
            TokenKind::Sentence(members) => match_sentence(members, input, output),
            TokenKind::Ellipsis(inner) => match_ellipsis(inner, input, output),
        }
    }
}

fn is_option_like(element: &str) -> bool {
    element.starts_with('-')
}

/// Scans for the literal among the leading option-like elements; the first
/// positional element which is not the literal stops the scan.
fn match_word(word: &str, input: &mut Vec<String>) -> bool {
    for i in 0..input.len() {
        if input[i] == word {
            input.remove(i);
            return true;
        }

        if !is_option_like(&input[i]) {
            return false;
        }
    }

    false
}

/// Captures the first element which is not option-like, or any element at
/// all once a `--` separator has been passed.  A filter rejection at the
/// candidate position is fatal, not a reason to keep scanning.
fn match_argument(
    name: &str,
    filter: Option<&Filter>,
    input: &mut Vec<String>,
    output: &mut Bindings,
) -> bool {
    let mut dashed = false;

    for i in 0..input.len() {
        if !dashed && is_option_like(&input[i]) {
            if input[i] == DOUBLE_DASH {
                dashed = true;
            }
            continue;
        }

        let value = match filter {
            None => Some(Value::String(input[i].clone())),
            Some(filter) => filter.apply(&input[i]),
        };

        return match value {
            Some(value) => {
                input.remove(i);
                output.insert(name.to_string(), value);
                true
            }
            None => false,
        };
    }

    false
}

/// Scans for this option among the elements before any `--` separator,
/// resolving the four value shapes: bare flag, `name=value`, attached value
/// (short options) and a separate next element.
///
/// A candidate whose value cannot be resolved is skipped when the value is
/// required; when the value is optional the flag matches valueless instead.
fn match_option(
    name: &str,
    kind: OptionKind,
    placeholder: Option<&Token>,
    required: bool,
    input: &mut Vec<String>,
    output: &mut Bindings,
) -> bool {
    let flag = dashed(kind, name);

    for i in 0..input.len() {
        if input[i] == DOUBLE_DASH {
            // nothing past the separator is eligible
            return false;
        }

        let rest = match input[i].strip_prefix(flag.as_str()) {
            Some(rest) => rest.to_string(),
            None => continue,
        };

        if rest.is_empty() {
            match placeholder {
                None => {
                    input.remove(i);
                    output.insert(name.to_string(), Value::None);
                    return true;
                }
                Some(placeholder) => {
                    // the next separate element may serve as the value
                    let next = input.get(i + 1).cloned();

                    if let Some(next) = next {
                        if !is_option_like(&next) {
                            if let Some(bound) = match_placeholder(placeholder, &next) {
                                input.drain(i..=i + 1);
                                merge_placeholder(output, bound, name);
                                return true;
                            }
                        }
                    }

                    if !required {
                        // fall back to a valueless flag
                        input.remove(i);
                        output.insert(name.to_string(), Value::None);
                        return true;
                    }

                    // keep searching for a candidate with a usable value
                    continue;
                }
            }
        }

        // a value attached to the flag itself
        let attached = match rest.strip_prefix('=') {
            Some(value) => value.to_string(),
            None if kind == OptionKind::Short => rest,
            // a longer option sharing this prefix, e.g. `--names` vs `--name`
            None => continue,
        };

        let Some(placeholder) = placeholder else {
            continue;
        };

        if let Some(bound) = match_placeholder(placeholder, &attached) {
            input.remove(i);
            merge_placeholder(output, bound, name);
            return true;
        }

        // an attached value which fails validation skips this candidate;
        // consuming it valueless would drop the text after the `=`
    }

    false
}

/// Matches `value` against the placeholder token as a one-element input; the
/// placeholder must consume it fully.
fn match_placeholder(placeholder: &Token, value: &str) -> Option<Bindings> {
    let mut input = vec![value.to_string()];
    let mut output = Bindings::new();

    if placeholder.matches(&mut input, &mut output) && input.is_empty() {
        Some(output)
    } else {
        None
    }
}

/// Folds the bindings produced by a placeholder match into the real output.
/// A placeholder which bound nothing still records the flag's presence.
fn merge_placeholder(output: &mut Bindings, bound: Bindings, name: &str) {
    if bound.is_empty() {
        output.insert(name.to_string(), Value::None);
    } else {
        output.extend(bound);
    }
}

/// Members match strictly in order; any failure restores the state captured
/// before the first member was attempted.
fn match_sentence(members: &[Token], input: &mut Vec<String>, output: &mut Bindings) -> bool {
    let saved_input = input.clone();
    let saved_output = output.clone();

    for member in members {
        if !member.matches(input, output) {
            *input = saved_input;
            *output = saved_output;
            return false;
        }
    }

    true
}

/// Repeats the inner token against the shrinking input, collecting each
/// newly-produced or changed binding into an ordered list per name.  At
/// least one repetition must succeed.
fn match_ellipsis(inner: &Token, input: &mut Vec<String>, output: &mut Bindings) -> bool {
    let saved_output = output.clone();

    if !inner.matches(input, output) {
        return false;
    }

    let mut collected: Vec<(String, Vec<Value>)> = Vec::new();

    loop {
        for (name, value) in output.iter() {
            if saved_output.get(name) != Some(value) {
                match collected.iter_mut().find(|(n, _)| n == name) {
                    Some((_, values)) => values.push(value.clone()),
                    None => collected.push((name.clone(), vec![value.clone()])),
                }
            }
        }

        // reset to the original bindings and try another repetition
        *output = saved_output.clone();

        if !inner.matches(input, output) {
            break;
        }
    }

    for (name, values) in collected {
        output.insert(name, Value::List(values));
    }

    true
}
