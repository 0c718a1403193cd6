//! Clap adapter.
//!
//! Turns the registry's bindings into a [`clap::Command`] with one
//! `--<flag>` arg per binding, plus the reserved `--config <PATH>` and a
//! trailing list of positional arguments. After parsing, every flag the user
//! actually typed is recorded on the registry as changed; flags clap only
//! filled from defaults are left untouched.
//!
//! | Kind | Accepted forms |
//! |------|----------------|
//! | bool | `--flag`, `--flag=true`, `--flag=false` |
//! | numbers, string | `--flag value`, `--flag=value` |
//! | string sequence | `--flag a,b`, `--flag a --flag b` |

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::error::FlagfigError;
use crate::registry::{Binding, CONFIG_FLAG, Registry};
use crate::schema::LeafKind;
use crate::value::RawValue;

/// Arg id for positional arguments. Brackets keep it out of the flag namespace.
const POSITIONAL_ID: &str = "[args]";

/// What argv carried besides field flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    pub config: Option<PathBuf>,
    pub positional: Vec<String>,
}

/// Build the clap command for every binding on `registry`.
pub fn build_command(name: &str, about: Option<&str>, registry: &Registry) -> Command {
    let mut cmd = Command::new(name.to_string())
        .args_override_self(true)
        .arg(
            Arg::new(CONFIG_FLAG)
                .long(CONFIG_FLAG)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Path to a JSON or TOML config file"),
        )
        .arg(
            Arg::new(POSITIONAL_ID)
                .value_name("ARGS")
                .num_args(0..)
                .action(ArgAction::Append),
        );
    if let Some(about) = about {
        cmd = cmd.about(about.to_string());
    }
    for binding in registry.bindings() {
        cmd = cmd.arg(flag_arg(binding));
    }
    cmd
}

fn flag_arg(binding: &Binding) -> Arg {
    let kind = binding.kind;
    let arg = Arg::new(binding.flag.clone())
        .long(binding.flag.clone())
        .value_name(kind.name().to_ascii_uppercase())
        .value_parser(move |text: &str| RawValue::parse(kind, text));

    let arg = match kind {
        LeafKind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .action(ArgAction::Set),
        LeafKind::StringSeq => arg.value_delimiter(',').action(ArgAction::Append),
        LeafKind::String => arg.action(ArgAction::Set),
        LeafKind::Int | LeafKind::Int64 | LeafKind::Float32 | LeafKind::Float64 => {
            arg.allow_negative_numbers(true).action(ArgAction::Set)
        }
    };

    match help_text(binding) {
        Some(help) => arg.help(help),
        None => arg,
    }
}

fn help_text(binding: &Binding) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(desc) = &binding.description {
        parts.push(desc.clone());
    }
    if binding.kind != LeafKind::Bool && !binding.default.is_zero() {
        parts.push(format!("[default: {}]", binding.default));
    }
    if binding.required {
        parts.push("[required]".to_string());
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Parse `args` (without the program name) and record typed flags on `registry`.
///
/// `--help` and malformed argv come back as [`FlagfigError::Cli`].
pub fn parse_args(
    command: Command,
    args: &[String],
    registry: &mut Registry,
) -> Result<ParsedArgs, FlagfigError> {
    let argv0 = command.get_name().to_string();
    let matches = command.try_get_matches_from(std::iter::once(argv0).chain(args.iter().cloned()))?;

    let flags: Vec<(String, LeafKind)> = registry
        .bindings()
        .iter()
        .map(|b| (b.flag.clone(), b.kind))
        .collect();
    for (flag, kind) in flags {
        if matches.value_source(&flag) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = typed_value(&matches, &flag, kind) {
            tracing::debug!(flag, %value, "flag set on command line");
            registry.set_from_cli(&flag, value);
        }
    }

    Ok(ParsedArgs {
        config: matches.get_one::<PathBuf>(CONFIG_FLAG).cloned(),
        positional: matches
            .get_many::<String>(POSITIONAL_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    })
}

fn typed_value(matches: &ArgMatches, flag: &str, kind: LeafKind) -> Option<RawValue> {
    if kind != LeafKind::StringSeq {
        return matches.get_one::<RawValue>(flag).cloned();
    }
    let items = matches
        .get_many::<RawValue>(flag)?
        .flat_map(|value| match value {
            RawValue::Seq(items) => items.clone(),
            other => vec![other.to_string()],
        })
        .collect();
    Some(RawValue::Seq(items))
}
