//! Precedence resolution over the serialized struct.
//!
//! By the time this runs, the struct tree already carries the struct literal
//! with the config file merged on top, and the registry carries the parsed
//! flags. For each leaf, in order:
//!
//! 1. The source is the env value when one is set, else the flag value.
//! 2. Back-fill: a non-zero struct value is copied into a zero flag, so the
//!    registry reflects values that only arrived through the file.
//! 3. Default preservation: with no env value, a flag the user did not set
//!    that still holds its registered default never overwrites a non-zero
//!    struct value.
//! 4. The source is written with per-kind rules: bools are OR-ed with the
//!    current value, and zero numbers, empty strings and empty sequences
//!    leave the field untouched.
//!
//! Resolution is idempotent: a second pass with the same inputs leaves the
//! tree unchanged.

use serde_json::Value;

use crate::codec;
use crate::error::FlagfigError;
use crate::registry::Registry;
use crate::schema::{LeafKind, Schema};
use crate::value::{RawValue, is_zero_json};
use crate::walk::{self, describe, dotted};

pub fn resolve(schema: &Schema, root: &mut Value, registry: &mut Registry) -> Result<(), FlagfigError> {
    walk::walk(schema, root, &mut |slot, field, path| {
        let Some(kind) = field.leaf_kind() else {
            return Ok(());
        };
        if !kind.accepts(slot) {
            return Err(FlagfigError::UnsupportedFieldType {
                path: dotted(path, field.name()),
                found: describe(slot).to_string(),
            });
        }
        let flag = codec::flag_name(path, field.name());
        let Some(binding) = registry.binding(&flag) else {
            tracing::debug!(flag, "no binding registered; leaving field as is");
            return Ok(());
        };
        let default = binding.default.clone();

        let env = registry.env_value(&flag);
        let flag_before = registry.value(&flag).cloned();
        let struct_set = !is_zero_json(kind, slot);

        if kind != LeafKind::Bool
            && struct_set
            && flag_before.as_ref().is_none_or(RawValue::is_zero)
            && let Some(current) = RawValue::from_json(kind, slot)
        {
            tracing::debug!(flag, value = %current, "back-filling flag from struct");
            registry.backfill(&flag, current);
        }

        if env.is_none()
            && struct_set
            && !registry.is_changed(&flag)
            && flag_before.as_ref() == Some(&default)
            && !default.to_string().is_empty()
        {
            tracing::debug!(flag, "flag holds its default; keeping struct value");
            return Ok(());
        }

        let (origin, source) = match env {
            Some(value) => ("env", value),
            None => match registry.value(&flag) {
                Some(value) => ("flag", value.clone()),
                None => return Ok(()),
            },
        };
        if write(kind, slot, &source) {
            tracing::debug!(flag, origin, value = %source, "resolved");
        } else {
            tracing::debug!(flag, origin, "source is empty; field left untouched");
        }
        Ok(())
    })
}

/// Write `source` into `slot`. Returns whether the slot was written.
fn write(kind: LeafKind, slot: &mut Value, source: &RawValue) -> bool {
    match (kind, source) {
        (LeafKind::Bool, RawValue::Bool(b)) => {
            let current = slot.as_bool().unwrap_or(false);
            *slot = Value::Bool(*b || current);
            true
        }
        (LeafKind::StringSeq, RawValue::Seq(items)) => {
            if items.first().is_none_or(|first| first.is_empty() || first == "[]") {
                return false;
            }
            *slot = source.to_json();
            true
        }
        (_, value) => {
            if value.is_zero() {
                return false;
            }
            *slot = value.to_json();
            true
        }
    }
}
