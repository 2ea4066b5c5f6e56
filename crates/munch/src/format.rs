//! Type-directed literal rendering and the elision policy.
//!
//! Every value that reaches SQL text (filter operands, INSERT values, UPDATE
//! assignments) goes through [`format_value`], and the decision whether it is
//! rendered at all goes through [`ElisionPolicy::render`].

use crate::dialect::Dialect;
use crate::error::{MunchError, MunchResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

/// Render a value as a SQL literal for `dialect`.
///
/// | Value            | Literal                                   |
/// |------------------|-------------------------------------------|
/// | `Int` / `UInt`   | decimal digits                            |
/// | `Float`          | shortest round-trip decimal               |
/// | `Bool`           | `TRUE` / `FALSE`                          |
/// | `List`           | `(a, b, c)` with each element formatted   |
/// | `Text`           | quoted with the dialect's string quote    |
/// | `Null`           | empty                                     |
///
/// Empty text and lists whose elements all render empty also yield an empty
/// string.
pub fn format_value(value: &Value, dialect: Dialect) -> String {
    let mut out = String::new();
    write_value(&mut out, value, dialect);
    out
}

fn write_value(out: &mut String, value: &Value, dialect: Dialect) {
    match value {
        Value::Null => {}
        Value::Int(v) => {
            let _ = write!(out, "{v}");
        }
        Value::UInt(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Float(v) if v.is_nan() => out.push_str(&dialect.quote_str("NaN")),
        Value::Float(v) if v.is_infinite() => {
            let text = if v.is_sign_positive() { "Infinity" } else { "-Infinity" };
            out.push_str(&dialect.quote_str(text));
        }
        Value::Float(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Bool(true) => out.push_str("TRUE"),
        Value::Bool(false) => out.push_str("FALSE"),
        Value::Text(s) if s.is_empty() => {}
        Value::Text(s) => out.push_str(&dialect.quote_str(s)),
        Value::List(items) => {
            let start = out.len();
            out.push('(');
            let mut first = true;
            for item in items {
                let literal = format_value(item, dialect);
                if literal.is_empty() {
                    continue;
                }
                if !first {
                    out.push_str(", ");
                }
                first = false;
                out.push_str(&literal);
            }
            if first {
                out.truncate(start);
            } else {
                out.push(')');
            }
        }
    }
}

/// Policy deciding which values count as "not provided".
///
/// Omitted values drop their column from INSERT, their assignment from
/// UPDATE, and their whole clause from WHERE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElisionPolicy {
    /// Omit values whose literal is empty: NULL, empty text, empty lists.
    #[default]
    EmptyLiteral,
    /// Also omit `0`, `0.0` and `false`, so zero-valued record fields act as unset.
    ZeroValue,
}

impl ElisionPolicy {
    /// Whether `value` (already rendered as `literal`) is omitted under this policy.
    pub fn elides(self, value: &Value, literal: &str) -> bool {
        match self {
            ElisionPolicy::EmptyLiteral => literal.is_empty(),
            ElisionPolicy::ZeroValue => literal.is_empty() || value.is_zero(),
        }
    }

    /// Render `value`, or `None` if the policy omits it.
    pub fn render(self, value: &Value, dialect: Dialect) -> Option<String> {
        let literal = format_value(value, dialect);
        (!self.elides(value, &literal)).then_some(literal)
    }
}

impl FromStr for ElisionPolicy {
    type Err = MunchError;

    fn from_str(s: &str) -> MunchResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty_literal" | "empty" => Ok(ElisionPolicy::EmptyLiteral),
            "zero_value" | "zero" => Ok(ElisionPolicy::ZeroValue),
            _ => Err(MunchError::validation(format!("unknown elision policy: {s:?}"))),
        }
    }
}
