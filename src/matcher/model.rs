use std::collections::HashMap;

use crate::tokens::Filter;

/// A value captured from the input during a successful match.
///
/// Arguments bind as [`Value::String`] unless a filter coerced them; options
/// without a value bind as [`Value::None`] (presence is signaled by the key
/// existing); repeated tokens bind as [`Value::List`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An unfiltered (or custom-filtered) raw value.
    String(String),
    /// An `int`- or `uint`-filtered value.
    Integer(i64),
    /// A `float`- or `ufloat`-filtered value.
    Float(f64),
    /// A `bool`-filtered value.
    Bool(bool),
    /// The no-value marker bound by an option flag without a value.
    None,
    /// The values collected across the repetitions of a `...` token.
    List(Vec<Value>),
}

impl Value {
    /// The contained string, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// The contained integer, if this is a [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The contained float, if this is a [`Value::Float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The contained boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The contained values, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

/// Named values collected while matching one route.
pub type Bindings = HashMap<String, Value>;

impl Filter {
    /// Validates `raw`, producing the typed value to bind, or `None` when the
    /// value is rejected.
    pub(crate) fn apply(&self, raw: &str) -> Option<Value> {
        match self {
            Filter::Int => raw.parse::<i64>().ok().map(Value::Integer),
            Filter::Uint => raw
                .parse::<u64>()
                .ok()
                .and_then(|value| i64::try_from(value).ok())
                .map(Value::Integer),
            Filter::Float => raw.parse::<f64>().ok().map(Value::Float),
            Filter::Ufloat => raw
                .parse::<f64>()
                .ok()
                .filter(|value| *value >= 0.0)
                .map(Value::Float),
            Filter::Bool => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Some(Value::Bool(true)),
                "0" | "false" | "off" | "no" | "" => Some(Value::Bool(false)),
                _ => None,
            },
            Filter::Custom { predicate, .. } => {
                let mut value = raw.to_string();

                if predicate(&mut value) {
                    Some(Value::String(value))
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("10", Some(Value::Integer(10)))]
    #[case("-10", Some(Value::Integer(-10)))]
    #[case("0", Some(Value::Integer(0)))]
    #[case("x", None)]
    #[case("1.5", None)]
    #[case("", None)]
    fn int(#[case] raw: &str, #[case] expected: Option<Value>) {
        assert_eq!(Filter::Int.apply(raw), expected);
    }

    #[rstest]
    #[case("10", Some(Value::Integer(10)))]
    #[case("0", Some(Value::Integer(0)))]
    #[case("-10", None)]
    #[case("x", None)]
    fn uint(#[case] raw: &str, #[case] expected: Option<Value>) {
        assert_eq!(Filter::Uint.apply(raw), expected);
    }

    #[rstest]
    #[case("1.5", Some(Value::Float(1.5)))]
    #[case("-1.5", Some(Value::Float(-1.5)))]
    #[case("10", Some(Value::Float(10.0)))]
    #[case("x", None)]
    fn float(#[case] raw: &str, #[case] expected: Option<Value>) {
        assert_eq!(Filter::Float.apply(raw), expected);
    }

    #[rstest]
    #[case("1.5", Some(Value::Float(1.5)))]
    #[case("0.0", Some(Value::Float(0.0)))]
    #[case("-1.5", None)]
    #[case("x", None)]
    fn ufloat(#[case] raw: &str, #[case] expected: Option<Value>) {
        assert_eq!(Filter::Ufloat.apply(raw), expected);
    }

    #[rstest]
    #[case("1", Some(Value::Bool(true)))]
    #[case("true", Some(Value::Bool(true)))]
    #[case("TRUE", Some(Value::Bool(true)))]
    #[case("on", Some(Value::Bool(true)))]
    #[case("yes", Some(Value::Bool(true)))]
    #[case("0", Some(Value::Bool(false)))]
    #[case("false", Some(Value::Bool(false)))]
    #[case("off", Some(Value::Bool(false)))]
    #[case("no", Some(Value::Bool(false)))]
    #[case("", Some(Value::Bool(false)))]
    #[case("x", None)]
    #[case("2", None)]
    fn bool_coercion(#[case] raw: &str, #[case] expected: Option<Value>) {
        assert_eq!(Filter::Bool.apply(raw), expected);
    }

    #[test]
    fn custom_rewrites_in_place() {
        let filter = Filter::Custom {
            name: "caps".to_string(),
            predicate: std::sync::Arc::new(|value: &mut String| {
                *value = value.to_uppercase();
                true
            }),
        };

        assert_eq!(
            filter.apply("hello"),
            Some(Value::String("HELLO".to_string()))
        );
    }

    #[test]
    fn custom_rejects() {
        let filter = Filter::Custom {
            name: "never".to_string(),
            predicate: std::sync::Arc::new(|_: &mut String| false),
        };

        assert_eq!(filter.apply("hello"), None);
    }
}
