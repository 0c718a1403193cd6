//! Bind a typed settings struct to command-line flags, environment variables
//! and an optional config file, without writing any binding code.
//!
//! ```ignore
//! let config: ServerConfig = Flagfig::builder()
//!     .name("my-server")
//!     .load()?;
//! ```
//!
//! That call registers one `--flag` per field of `ServerConfig`, reads
//! `MY_SERVER_*` environment variables, loads the file named by `--config`
//! when given, and hands back the resolved struct.
//!
//! # Describing the struct
//!
//! The struct implements [`Settings`], returning a [`Schema`] that lists its
//! bindable fields. Names are the serde keys of the struct; nested structs
//! point at their own schema:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Default)]
//! struct ServerConfig {
//!     host: String,
//!     port: i32,
//!     tls: TlsConfig,
//! }
//!
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
//! Supported leaf types are `bool`, `i32`, `i64`, `f32`, `f64`, `String` and
//! `Vec<String>`.
//!
//! # Names
//!
//! Flag and variable names come from the field path, split into words:
//!
//! | Field | Flag | Variable (name `test`) |
//! |-------|------|------------------------|
//! | `port` | `--port` | `TEST_PORT` |
//! | `sub.sub_sub.rint` | `--sub-sub-sub-rint` | `TEST_SUB_SUB_SUB_RINT` |
//! | `TestURLs` | `--test-urls` | `TEST_TEST_URLS` |
//!
//! # Precedence
//!
//! ```text
//! Declared default      Field::default(..)
//!        ↑ overridden by
//! Struct literal        values already in the struct passed to load_into
//!        ↑ overridden by
//! Config file           --config <PATH> or <PREFIX>_CONFIG, JSON or TOML
//!        ↑ overridden by
//! CLI flag              --flag value
//!        ↑ overridden by
//! Environment           <PREFIX>_<NAME>
//! ```
//!
//! Two rules soften the ladder:
//!
//! - Zero values never override. A flag or variable holding `0`, `""` or an
//!   empty list leaves the field as it was, so a field cannot be set to its
//!   zero value from the command line or environment.
//! - Booleans only ever turn on. A `bool` field is the OR of its sources and
//!   always defaults to `false`.
//!
//! # Required fields
//!
//! A field marked [`Field::required`] must end up non-zero from some source,
//! otherwise loading fails with [`FlagfigError::MissingRequiredField`] naming
//! the flag.
//!
//! # Re-running
//!
//! [`FlagfigBuilder::build`] returns a [`Binder`] that can parse repeatedly.
//! Every parse starts from a fresh [`Registry`]:
//!
//! ```ignore
//! let mut binder = Flagfig::builder::<ServerConfig>().name("srv").build()?;
//! binder.set_args(["--port", "8080"]);
//! binder.parse(&mut config)?;
//! ```
//!
//! # Logging
//!
//! Resolution decisions are reported through `tracing` at `debug` level;
//! ignored boolean defaults and unparseable environment values at `warn`.

pub mod codec;
pub mod error;
pub mod registry;
pub mod schema;
pub mod value;

mod builder;
mod cli;
mod env;
mod file;
pub(crate) mod merge;
mod register;
mod resolve;
mod validate;
mod walk;

#[cfg(test)]
mod fixtures;

pub use builder::{Binder, Flagfig, FlagfigBuilder};
pub use env::EnvSnapshot;
pub use error::FlagfigError;
pub use registry::{Binding, Registry};
pub use schema::{Field, FieldAttrs, FieldKind, FieldType, LeafKind, Schema, Settings};
pub use value::RawValue;
