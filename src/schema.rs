//! Schema descriptors: the static description of which struct fields bind to
//! flags and environment variables.
//!
//! A target struct implements [`Settings`] and returns a [`Schema`] listing its
//! bindable fields in declaration order. Leaves get their kind from the Rust
//! type through [`FieldType`]; nested structs point at their own schema.
//!
//! ```ignore
//! impl Settings for ServerConfig {
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .field(Field::new::<String>("host").default("0.0.0.0"))
//!             .field(Field::new::<i32>("port").required().description("listen port"))
//!             .field(Field::nested::<TlsConfig>("tls"))
//!     }
//! }
//! ```
//!
//! Field names are the serialized (serde) keys of the struct.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A struct that can be resolved from flags, env vars, and a config file.
pub trait Settings: Serialize + DeserializeOwned {
    fn schema() -> Schema;
}

/// The leaf kinds the binding engine knows how to parse and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Bool,
    Int,
    Int64,
    Float32,
    Float64,
    String,
    StringSeq,
}

impl LeafKind {
    /// Whether a serialized struct value has the shape this kind expects.
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match self {
            LeafKind::Bool => value.is_boolean(),
            LeafKind::Int | LeafKind::Int64 => value.is_i64() || value.is_u64(),
            // NaN and infinities serialize as null.
            LeafKind::Float32 | LeafKind::Float64 => value.is_number() || value.is_null(),
            LeafKind::String => value.is_string(),
            LeafKind::StringSeq => match value {
                Value::Array(items) => items.iter().all(Value::is_string),
                _ => false,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LeafKind::Bool => "bool",
            LeafKind::Int => "int",
            LeafKind::Int64 => "int64",
            LeafKind::Float32 => "float32",
            LeafKind::Float64 => "float64",
            LeafKind::String => "string",
            LeafKind::StringSeq => "[]string",
        }
    }
}

/// Maps a Rust field type onto a [`LeafKind`].
pub trait FieldType {
    const KIND: LeafKind;
}

impl FieldType for bool {
    const KIND: LeafKind = LeafKind::Bool;
}

impl FieldType for i32 {
    const KIND: LeafKind = LeafKind::Int;
}

impl FieldType for i64 {
    const KIND: LeafKind = LeafKind::Int64;
}

impl FieldType for f32 {
    const KIND: LeafKind = LeafKind::Float32;
}

impl FieldType for f64 {
    const KIND: LeafKind = LeafKind::Float64;
}

impl FieldType for String {
    const KIND: LeafKind = LeafKind::String;
}

impl FieldType for Vec<String> {
    const KIND: LeafKind = LeafKind::StringSeq;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Leaf(LeafKind),
    Nested(Schema),
}

/// Per-field metadata that drives registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAttrs {
    /// Must end up non-zero from some source.
    pub required: bool,
    /// Registered default, in its command-line string form.
    pub default: Option<String>,
    /// Help text for the flag.
    pub description: Option<String>,
    /// Excluded from binding, including every field beneath it.
    pub skip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    kind: FieldKind,
    attrs: FieldAttrs,
}

impl Field {
    /// A leaf field of Rust type `T`.
    pub fn new<T: FieldType>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Leaf(T::KIND),
            attrs: FieldAttrs::default(),
        }
    }

    /// A nested struct field, walked with `S`'s schema.
    pub fn nested<S: Settings>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Nested(S::schema()),
            attrs: FieldAttrs::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.attrs.required = true;
        self
    }

    /// Default value in command-line form. Sequences are comma-separated.
    /// Ignored for `bool` fields, which always default to `false`.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.attrs.default = Some(value.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.attrs.description = Some(text.into());
        self
    }

    pub fn skip(mut self) -> Self {
        self.attrs.skip = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn attrs(&self) -> &FieldAttrs {
        &self.attrs
    }

    pub fn leaf_kind(&self) -> Option<LeafKind> {
        match self.kind {
            FieldKind::Leaf(kind) => Some(kind),
            FieldKind::Nested(_) => None,
        }
    }
}

/// Ordered list of a struct's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find a field by name, ignoring case, `_` and `-`.
    pub fn find_loose(&self, key: &str) -> Option<&Field> {
        let wanted = loose_key(key);
        self.fields.iter().find(|f| loose_key(&f.name) == wanted)
    }
}

fn loose_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{TestStruct, TestSubStruct};
    use serde_json::json;

    #[test]
    fn leaf_kind_from_rust_type() {
        assert_eq!(Field::new::<bool>("b").leaf_kind(), Some(LeafKind::Bool));
        assert_eq!(Field::new::<i32>("i").leaf_kind(), Some(LeafKind::Int));
        assert_eq!(Field::new::<i64>("i").leaf_kind(), Some(LeafKind::Int64));
        assert_eq!(Field::new::<f32>("f").leaf_kind(), Some(LeafKind::Float32));
        assert_eq!(Field::new::<f64>("f").leaf_kind(), Some(LeafKind::Float64));
        assert_eq!(Field::new::<String>("s").leaf_kind(), Some(LeafKind::String));
        assert_eq!(
            Field::new::<Vec<String>>("v").leaf_kind(),
            Some(LeafKind::StringSeq)
        );
    }

    #[test]
    fn nested_field_embeds_child_schema() {
        let field = Field::nested::<TestSubStruct>("sub");
        assert_eq!(field.leaf_kind(), None);
        match field.kind() {
            FieldKind::Nested(schema) => assert_eq!(schema, &TestSubStruct::schema()),
            other => panic!("expected nested, got {other:?}"),
        }
    }

    #[test]
    fn attrs_builder() {
        let field = Field::new::<String>("dstring")
            .default("string")
            .description("a string")
            .required();
        assert!(field.attrs().required);
        assert_eq!(field.attrs().default.as_deref(), Some("string"));
        assert_eq!(field.attrs().description.as_deref(), Some("a string"));
        assert!(!field.attrs().skip);
        assert!(Field::new::<i32>("x").skip().attrs().skip);
    }

    #[test]
    fn schema_keeps_declaration_order() {
        let schema = TestStruct::schema();
        let names: Vec<&str> = schema.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["int", "bool", "string", "dstring", "sub"]);
    }

    #[test]
    fn find_loose_ignores_case_and_separators() {
        let schema = TestSubStruct::schema();
        assert_eq!(schema.find_loose("subsub").map(Field::name), Some("sub_sub"));
        assert_eq!(schema.find_loose("SubSub").map(Field::name), Some("sub_sub"));
        assert_eq!(schema.find_loose("Dstring").map(Field::name), Some("dstring"));
        assert!(schema.find_loose("nope").is_none());
    }

    #[test]
    fn accepts_matches_serialized_shapes() {
        assert!(LeafKind::Bool.accepts(&json!(true)));
        assert!(!LeafKind::Bool.accepts(&json!("true")));
        assert!(LeafKind::Int.accepts(&json!(3)));
        assert!(!LeafKind::Int.accepts(&json!(3.5)));
        assert!(LeafKind::Float64.accepts(&json!(3)));
        assert!(LeafKind::String.accepts(&json!("x")));
        assert!(LeafKind::StringSeq.accepts(&json!(["a", "b"])));
        assert!(LeafKind::StringSeq.accepts(&json!([])));
        assert!(!LeafKind::StringSeq.accepts(&json!([1, 2])));
        assert!(!LeafKind::String.accepts(&json!({"a": 1})));
    }
}
