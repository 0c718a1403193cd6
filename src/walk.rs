//! Depth-first walk over a schema and the serialized struct it describes.
//!
//! Only leaves are visited. Nested structs are recursed into with their name
//! appended to the path; skipped fields and their subtrees are never entered;
//! schema fields that the struct does not serialize are not settable and are
//! passed over silently.

use serde_json::{Map, Value};

use crate::error::FlagfigError;
use crate::schema::{Field, FieldKind, Schema};

/// Call `visit(slot, field, path)` once per bindable leaf, in declaration order.
///
/// `path` holds the names of the enclosing nested fields, outermost first, and
/// excludes the leaf itself. The first error returned by `visit` stops the
/// walk and is returned unchanged.
pub fn walk<F>(schema: &Schema, root: &mut Value, visit: &mut F) -> Result<(), FlagfigError>
where
    F: FnMut(&mut Value, &Field, &[&str]) -> Result<(), FlagfigError>,
{
    let Value::Object(map) = root else {
        return Err(FlagfigError::InvalidRoot(format!(
            "expected a struct, found {}",
            describe(root)
        )));
    };
    let mut path = Vec::new();
    walk_object(schema, map, &mut path, visit)
}

fn walk_object<'s, F>(
    schema: &'s Schema,
    object: &mut Map<String, Value>,
    path: &mut Vec<&'s str>,
    visit: &mut F,
) -> Result<(), FlagfigError>
where
    F: FnMut(&mut Value, &Field, &[&str]) -> Result<(), FlagfigError>,
{
    for field in schema.fields() {
        if field.attrs().skip {
            continue;
        }
        let Some(slot) = object.get_mut(field.name()) else {
            tracing::debug!(field = %dotted(path, field.name()), "field not serialized; skipping");
            continue;
        };

        match field.kind() {
            FieldKind::Nested(inner) => {
                let Value::Object(child) = slot else {
                    return Err(FlagfigError::UnsupportedFieldType {
                        path: dotted(path, field.name()),
                        found: describe(slot).to_string(),
                    });
                };
                path.push(field.name());
                let result = walk_object(inner, child, path, visit);
                path.pop();
                result?;
            }
            FieldKind::Leaf(_) => visit(slot, field, path)?,
        }
    }
    Ok(())
}

/// `a.b.leaf` form of a field location, used in error messages.
pub fn dotted(path: &[&str], leaf: &str) -> String {
    path.iter()
        .copied()
        .chain(std::iter::once(leaf))
        .collect::<Vec<_>>()
        .join(".")
}

/// Short name of a serialized value's shape.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
