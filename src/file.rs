//! Config file loading.
//!
//! The format is picked from the extension (`.json` or `.toml`). The parsed
//! document is then conformed to the schema: keys are matched to field names
//! ignoring case, `_` and `-`, and scalars are coerced toward the declared
//! kind. Keys that match no field are kept as written so that fields outside
//! the schema can still be filled from the file.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::FlagfigError;
use crate::schema::{FieldKind, LeafKind, Schema};
use crate::value::RawValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// Read and parse a config file into its top-level object.
pub fn load_config_file(path: &Path) -> Result<Map<String, Value>, FlagfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FlagfigError::ConfigFileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(FlagfigError::ConfigFileUnreadable {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    tracing::debug!(path = %path.display(), "loaded config file");
    parse_config(path, &content)
}

/// Parse file content, choosing the format from `path`'s extension.
pub fn parse_config(path: &Path, content: &str) -> Result<Map<String, Value>, FlagfigError> {
    let malformed = |reason: String| FlagfigError::ConfigFileMalformed {
        path: path.to_path_buf(),
        reason,
    };
    let format = Format::from_path(path)
        .ok_or_else(|| malformed("unsupported config format (expected .json or .toml)".into()))?;
    let document: Value = match format {
        Format::Json => serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?,
        Format::Toml => toml::from_str(content).map_err(|e| malformed(e.to_string()))?,
    };
    match document {
        Value::Object(map) => Ok(map),
        other => Err(malformed(format!(
            "top level must be an object, found {}",
            crate::walk::describe(&other)
        ))),
    }
}

/// Rename keys to the schema's field names and coerce leaf values.
pub fn conform(schema: &Schema, document: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in document {
        let Some(field) = schema.find_loose(&key) else {
            out.insert(key, value);
            continue;
        };
        let value = match (field.kind(), value) {
            (FieldKind::Nested(inner), Value::Object(child)) => Value::Object(conform(inner, child)),
            (FieldKind::Leaf(kind), value) => coerce(*kind, value),
            (FieldKind::Nested(_), value) => value,
        };
        out.insert(field.name().to_string(), value);
    }
    out
}

/// Weakly convert a file value toward `kind`. Values that cannot be
/// converted are returned unchanged and fail later at write-back.
fn coerce(kind: LeafKind, value: Value) -> Value {
    match (kind, value) {
        (LeafKind::StringSeq, Value::Array(items)) => {
            Value::Array(items.into_iter().map(|item| Value::String(scalar_text(item))).collect())
        }
        (LeafKind::StringSeq, Value::String(text)) => RawValue::parse(kind, &text)
            .map(|v| v.to_json())
            .unwrap_or(Value::String(text)),
        (LeafKind::String, value @ (Value::Number(_) | Value::Bool(_))) => {
            Value::String(scalar_text(value))
        }
        (LeafKind::Int | LeafKind::Int64, Value::Number(n)) if n.as_i64().is_none() => {
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
                _ => Value::Number(n),
            }
        }
        (
            LeafKind::Bool | LeafKind::Int | LeafKind::Int64 | LeafKind::Float32 | LeafKind::Float64,
            Value::String(text),
        ) => RawValue::parse(kind, &text)
            .map(|v| v.to_json())
            .unwrap_or(Value::String(text)),
        (_, value) => value,
    }
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
