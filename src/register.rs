//! Registration: one flag and one env binding per bindable leaf.

use serde_json::Value;

use crate::codec;
use crate::error::FlagfigError;
use crate::registry::{Binding, Registry};
use crate::schema::{Field, LeafKind, Schema};
use crate::value::RawValue;
use crate::walk::{self, describe, dotted};

/// Walk `root` with `schema` and declare every leaf on `registry`.
///
/// A leaf whose serialized value does not have the shape of its declared kind
/// fails with [`FlagfigError::UnsupportedFieldType`].
pub fn register(schema: &Schema, root: &mut Value, registry: &mut Registry) -> Result<(), FlagfigError> {
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
        let env = codec::env_name(path, field.name());
        let attrs = field.attrs();
        registry.declare_flag(Binding {
            flag: flag.clone(),
            env: None,
            field: dotted(path, field.name()),
            kind,
            default: declared_default(kind, field, &flag),
            description: attrs.description.clone(),
            required: attrs.required,
        })?;
        registry.bind_env(&flag, env);
        Ok(())
    })
}

/// The registered default for a leaf.
///
/// Booleans always default to `false`. Numeric defaults that fail to parse
/// fall back to zero. An empty sequence default is the empty sequence.
fn declared_default(kind: LeafKind, field: &Field, flag: &str) -> RawValue {
    let Some(text) = field.attrs().default.as_deref() else {
        return RawValue::zero(kind);
    };
    match kind {
        LeafKind::Bool => {
            tracing::warn!(flag, default = text, "boolean defaults are ignored");
            RawValue::Bool(false)
        }
        LeafKind::String => RawValue::Str(text.to_string()),
        _ => RawValue::parse(kind, text).unwrap_or_else(|reason| {
            tracing::debug!(flag, %reason, "unparseable default, using zero");
            RawValue::zero(kind)
        }),
    }
}
