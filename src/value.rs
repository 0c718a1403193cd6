//! Typed values held by the flag/env layer.

use std::fmt;

use serde_json::Value;

use crate::schema::LeafKind;

/// A flag or environment value, typed by the binding's [`LeafKind`].
///
/// `Int` carries both `int` and `int64` kinds, `Float` both float widths.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<String>),
}

impl RawValue {
    /// The zero value for a kind.
    pub fn zero(kind: LeafKind) -> Self {
        match kind {
            LeafKind::Bool => RawValue::Bool(false),
            LeafKind::Int | LeafKind::Int64 => RawValue::Int(0),
            LeafKind::Float32 | LeafKind::Float64 => RawValue::Float(0.0),
            LeafKind::String => RawValue::Str(String::new()),
            LeafKind::StringSeq => RawValue::Seq(Vec::new()),
        }
    }

    /// Parse command-line / environment text.
    ///
    /// Booleans accept `1 t true 0 f false` in any case. Floats must be
    /// finite. Sequences split on `,`; the empty string is the empty sequence.
    pub fn parse(kind: LeafKind, text: &str) -> Result<Self, String> {
        let trimmed = text.trim();
        match kind {
            LeafKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "t" | "true" => Ok(RawValue::Bool(true)),
                "0" | "f" | "false" => Ok(RawValue::Bool(false)),
                _ => Err(format!("invalid boolean '{text}'")),
            },
            LeafKind::Int => trimmed
                .parse::<i32>()
                .map(|v| RawValue::Int(i64::from(v)))
                .map_err(|e| format!("invalid int '{text}': {e}")),
            LeafKind::Int64 => trimmed
                .parse::<i64>()
                .map(RawValue::Int)
                .map_err(|e| format!("invalid int64 '{text}': {e}")),
            LeafKind::Float32 => trimmed
                .parse::<f32>()
                .map_err(|e| format!("invalid float32 '{text}': {e}"))
                .and_then(|v| finite(f64::from(v), text)),
            LeafKind::Float64 => trimmed
                .parse::<f64>()
                .map_err(|e| format!("invalid float64 '{text}': {e}"))
                .and_then(|v| finite(v, text)),
            LeafKind::String => Ok(RawValue::Str(text.to_string())),
            LeafKind::StringSeq => Ok(RawValue::Seq(split_list(text))),
        }
    }

    /// Read a value of `kind` out of a serialized struct field.
    pub fn from_json(kind: LeafKind, value: &Value) -> Option<Self> {
        match kind {
            LeafKind::Bool => value.as_bool().map(RawValue::Bool),
            LeafKind::Int | LeafKind::Int64 => value
                .as_i64()
                .or_else(|| value.as_u64().and_then(|u| i64::try_from(u).ok()))
                .map(RawValue::Int),
            LeafKind::Float32 | LeafKind::Float64 => match value {
                Value::Null => Some(RawValue::Float(0.0)),
                _ => value.as_f64().map(RawValue::Float),
            },
            LeafKind::String => value.as_str().map(|s| RawValue::Str(s.to_string())),
            LeafKind::StringSeq => value.as_array().map(|items| {
                RawValue::Seq(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                )
            }),
        }
    }

    /// The value to write back into a serialized struct field.
    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Int(i) => Value::from(*i),
            RawValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            RawValue::Str(s) => Value::String(s.clone()),
            RawValue::Seq(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            RawValue::Bool(b) => !b,
            RawValue::Int(i) => *i == 0,
            RawValue::Float(f) => *f == 0.0,
            RawValue::Str(s) => s.is_empty(),
            RawValue::Seq(items) => items.is_empty(),
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, RawValue::Bool(true))
    }
}

/// Command-line string form. Sequences render as `[a,b]`.
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Str(s) => write!(f, "{s}"),
            RawValue::Seq(items) => write!(f, "[{}]", items.join(",")),
        }
    }
}

/// Whether a serialized struct field holds its type's zero value.
/// Values that do not fit `kind` count as zero.
pub fn is_zero_json(kind: LeafKind, value: &Value) -> bool {
    RawValue::from_json(kind, value).is_none_or(|v| v.is_zero())
}

fn finite(v: f64, text: &str) -> Result<RawValue, String> {
    if v.is_finite() {
        Ok(RawValue::Float(v))
    } else {
        Err(format!("float '{text}' is not finite"))
    }
}

fn split_list(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(|s| s.trim().to_string()).collect()
}
