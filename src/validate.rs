//! Post-resolution checks: required fields and unknown config keys.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FlagfigError;
use crate::registry::{Binding, Registry};
use crate::schema::{FieldKind, LeafKind, Schema};
use crate::value::RawValue;

/// Fail on the first required binding that was neither set on the command
/// line nor holds a non-zero value.
pub fn validate_required<'a, I, Ch, Cur>(bindings: I, changed: Ch, current: Cur) -> Result<(), FlagfigError>
where
    I: IntoIterator<Item = &'a Binding>,
    Ch: Fn(&str) -> bool,
    Cur: Fn(&str) -> Option<RawValue>,
{
    for binding in bindings {
        if !binding.required || changed(&binding.flag) {
            continue;
        }
        if current(&binding.flag).is_none_or(|v| v.is_zero()) {
            return Err(FlagfigError::MissingRequiredField {
                name: binding.flag.clone(),
            });
        }
    }
    Ok(())
}

/// [`validate_required`] against a registry's own state.
pub fn check_required(registry: &Registry) -> Result<(), FlagfigError> {
    validate_required(
        registry.bindings(),
        |flag| registry.is_changed(flag),
        |flag| registry.current_value(flag),
    )
}

/// Deserialize the resolved tree into `C`, collecting the dotted paths of
/// keys `C` does not consume.
///
/// On failure the error names the first schema field whose value does not fit
/// its type, or the struct itself when no field can be blamed.
pub fn deserialize_tracking<C: DeserializeOwned>(
    schema: &Schema,
    tree: &Value,
) -> Result<(C, Vec<String>), FlagfigError> {
    let mut ignored = Vec::new();
    let config = serde_ignored::deserialize(tree, |path| ignored.push(path.to_string()))
        .map_err(|e| FlagfigError::InvalidValue {
            key: misfit_field(schema, tree, "")
                .unwrap_or_else(|| std::any::type_name::<C>().to_string()),
            reason: e.to_string(),
        })?;
    Ok((config, ignored))
}

/// Dotted path of the first leaf under `tree` holding a value its type rejects.
fn misfit_field(schema: &Schema, tree: &Value, prefix: &str) -> Option<String> {
    for field in schema.fields() {
        let Some(value) = tree.get(field.name()) else {
            continue;
        };
        let path = if prefix.is_empty() {
            field.name().to_string()
        } else {
            format!("{prefix}.{}", field.name())
        };
        let found = match field.kind() {
            FieldKind::Nested(inner) if value.is_object() => misfit_field(inner, value, &path),
            FieldKind::Nested(_) => Some(path),
            FieldKind::Leaf(kind) => (!fits(*kind, value)).then_some(path),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn fits(kind: LeafKind, value: &Value) -> bool {
    match kind {
        LeafKind::Int => value.as_i64().is_some_and(|i| i32::try_from(i).is_ok()),
        LeafKind::Float32 | LeafKind::Float64 => value.is_number(),
        _ => kind.accepts(value),
    }
}

/// Turn ignored keys from `path` into [`FlagfigError::UnknownKeys`].
pub fn reject_unknown_keys(keys: Vec<String>, path: &Path) -> Result<(), FlagfigError> {
    if keys.is_empty() {
        return Ok(());
    }
    let errors = keys
        .into_iter()
        .map(|key| FlagfigError::UnknownKey {
            key,
            path: path.to_path_buf(),
        })
        .collect();
    Err(FlagfigError::UnknownKeys(errors))
}
