use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum FlagfigError {
    #[error("Invalid root: {0}")]
    InvalidRoot(String),

    #[error("{found} is unsupported by config @ {path}")]
    UnsupportedFieldType { path: String, found: String },

    #[error("Config file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ConfigFileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ConfigFileMalformed { path: PathBuf, reason: String },

    #[error("Required flag `{name}` has not been set")]
    MissingRequiredField { name: String },

    #[error("Flag `--{0}` is registered more than once")]
    DuplicateFlag(String),

    #[error("Unknown key '{key}' in {path}")]
    UnknownKey { key: String, path: PathBuf },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<FlagfigError>),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Command name is required: call .name() on the builder")]
    NameRequired,

    #[error(transparent)]
    Cli(#[from] clap::Error),
}
