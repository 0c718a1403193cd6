use std::marker::PhantomData;
use std::path::PathBuf;

use serde_json::Value;

use crate::cli;
use crate::codec;
use crate::env::EnvSnapshot;
use crate::error::FlagfigError;
use crate::file;
use crate::merge::deep_merge;
use crate::register::register;
use crate::registry::Registry;
use crate::resolve::resolve;
use crate::schema::{Schema, Settings};
use crate::validate;

/// Env name (under the process prefix) that supplies the config path when
/// `--config` is absent.
const CONFIG_ENV: &str = "CONFIG";

/// Entry point for binding a settings struct to flags, env vars and a config file.
pub struct Flagfig;

impl Flagfig {
    pub fn builder<C: Settings>() -> FlagfigBuilder<C> {
        FlagfigBuilder::new()
    }
}

/// Builder for a [`Binder`].
///
/// Only [`name()`](Self::name) is mandatory. It names the clap command and,
/// unless overridden, derives the environment prefix (`"my-tool"` reads
/// `MY_TOOL_*` variables).
pub struct FlagfigBuilder<C: Settings> {
    name: Option<String>,
    about: Option<String>,
    args: Option<Vec<String>>,
    env_vars: Option<Vec<(String, String)>>,
    env_prefix: Option<String>,
    env_enabled: bool,
    strict: bool,
    _phantom: PhantomData<C>,
}

impl<C: Settings> FlagfigBuilder<C> {
    fn new() -> Self {
        Self {
            name: None,
            about: None,
            args: None,
            env_vars: None,
            env_prefix: None,
            env_enabled: true,
            strict: false,
            _phantom: PhantomData,
        }
    }

    /// Command name. Drives the env prefix and the help header.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// One-line description shown in `--help`.
    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    /// Arguments to parse, without the program name.
    /// Defaults to the process arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Use these variables instead of the process environment.
    pub fn env_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Override the environment variable prefix (default: derived from the name).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable lookup entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, config file keys the struct does not consume are errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn effective_name(&self) -> Result<&str, FlagfigError> {
        self.name.as_deref().ok_or(FlagfigError::NameRequired)
    }

    /// Resolve the effective env prefix (None if env disabled).
    fn effective_env_prefix(&self) -> Result<Option<String>, FlagfigError> {
        if !self.env_enabled {
            return Ok(None);
        }
        if let Some(prefix) = &self.env_prefix {
            return Ok(Some(prefix.clone()));
        }
        Ok(Some(codec::env_prefix(self.effective_name()?)))
    }

    pub fn build(self) -> Result<Binder<C>, FlagfigError> {
        let name = self.effective_name()?.to_string();
        let env_prefix = self.effective_env_prefix()?;
        let args = self
            .args
            .unwrap_or_else(|| std::env::args().skip(1).collect());
        Ok(Binder {
            name,
            about: self.about,
            args,
            env_vars: self.env_vars,
            env_prefix,
            strict: self.strict,
            schema: C::schema(),
            registry: Registry::default(),
            positional: Vec::new(),
            _phantom: PhantomData,
        })
    }

    /// Resolve into `C::default()`.
    pub fn load(self) -> Result<C, FlagfigError>
    where
        C: Default,
    {
        let mut config = C::default();
        self.load_into(&mut config)?;
        Ok(config)
    }

    /// Resolve into a pre-populated struct. Its values rank below the config
    /// file and above declared defaults.
    pub fn load_into(self, config: &mut C) -> Result<(), FlagfigError> {
        self.build()?.parse(config)
    }
}

/// A reusable binding between a settings type and the command line.
///
/// Every [`parse`](Self::parse) starts from a fresh registry, so the same
/// binder can be re-run with new arguments through [`set_args`](Self::set_args).
pub struct Binder<C: Settings> {
    name: String,
    about: Option<String>,
    args: Vec<String>,
    env_vars: Option<Vec<(String, String)>>,
    env_prefix: Option<String>,
    strict: bool,
    schema: Schema,
    registry: Registry,
    positional: Vec<String>,
    _phantom: PhantomData<fn() -> C>,
}

impl<C: Settings> Binder<C> {
    /// Register, parse argv, load the config file, resolve and validate.
    ///
    /// `config` is only written when every step succeeds.
    pub fn parse(&mut self, config: &mut C) -> Result<(), FlagfigError> {
        self.reset();
        self.registry = Registry::new(self.env_snapshot());

        let mut tree =
            serde_json::to_value(&*config).map_err(|e| FlagfigError::InvalidRoot(e.to_string()))?;
        register(&self.schema, &mut tree, &mut self.registry)?;
        tracing::debug!(
            command = %self.name,
            flags = self.registry.bindings().len(),
            "registered flags"
        );

        let command = self.command();
        let parsed = cli::parse_args(command, &self.args, &mut self.registry)?;
        self.positional = parsed.positional;

        let config_path = parsed.config.or_else(|| {
            self.registry
                .env()
                .get(CONFIG_ENV)
                .map(PathBuf::from)
        });
        if let Some(path) = &config_path {
            let document = file::conform(&self.schema, file::load_config_file(path)?);
            tree = match tree {
                Value::Object(base) => Value::Object(deep_merge(base, document)),
                other => other,
            };
        }

        resolve(&self.schema, &mut tree, &mut self.registry)?;

        let (resolved, ignored) = validate::deserialize_tracking::<C>(&self.schema, &tree)?;
        match &config_path {
            Some(path) if self.strict => validate::reject_unknown_keys(ignored, path)?,
            _ => {
                for key in &ignored {
                    tracing::debug!(key, "ignoring unknown config key");
                }
            }
        }
        validate::check_required(&self.registry)?;

        *config = resolved;
        Ok(())
    }

    /// Replace the arguments used by the next [`parse`](Self::parse).
    pub fn set_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
    }

    /// Drop every registered flag and the positional arguments.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.positional.clear();
    }

    /// Flag state left by the last parse.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Positional arguments from the last parse.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// The clap command for the flags registered by the last parse.
    pub fn command(&self) -> clap::Command {
        cli::build_command(&self.name, self.about.as_deref(), &self.registry)
    }

    fn env_snapshot(&self) -> EnvSnapshot {
        let Some(prefix) = &self.env_prefix else {
            return EnvSnapshot::disabled();
        };
        match &self.env_vars {
            Some(vars) => EnvSnapshot::new(prefix, vars.iter().cloned()),
            None => EnvSnapshot::new(prefix, std::env::vars()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{
        TestStruct, TestStruct2, TestSubStruct, TestSubSubStruct, Toggles, with_required_flags,
        with_strings,
    };
    use std::fs;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Run one scenario: argv, synthetic env, and an optional JSON config
    /// passed through `--config`.
    fn run<C: Settings + Default>(
        args: &[&str],
        env: &[(&str, &str)],
        conf: Option<&str>,
    ) -> Result<C, FlagfigError> {
        let dir = TempDir::new().unwrap();
        let mut argv: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        if let Some(content) = conf {
            let path = dir.path().join("config.json");
            fs::write(&path, content).unwrap();
            argv.push("--config".into());
            argv.push(path.display().to_string());
        }
        Flagfig::builder::<C>()
            .name("test")
            .args(argv)
            .env_vars(vars(env))
            .load()
    }

    fn missing(result: Result<impl std::fmt::Debug, FlagfigError>) -> String {
        match result {
            Err(FlagfigError::MissingRequiredField { name }) => name,
            other => panic!("expected MissingRequiredField, got {other:?}"),
        }
    }

    #[test]
    fn name_required() {
        let result = Flagfig::builder::<TestStruct>().args(Vec::<String>::new()).build();
        assert!(matches!(result, Err(FlagfigError::NameRequired)));
    }

    #[test]
    fn env_prefix_derived_from_name() {
        let builder = Flagfig::builder::<TestStruct>().name("my-tool");
        assert_eq!(builder.effective_env_prefix().unwrap(), Some("MY_TOOL".into()));
        let builder = builder.env_prefix("APP");
        assert_eq!(builder.effective_env_prefix().unwrap(), Some("APP".into()));
        let builder = builder.no_env();
        assert_eq!(builder.effective_env_prefix().unwrap(), None);
    }

    #[test]
    fn nothing_set_fails_on_first_required() {
        assert_eq!(missing(run::<TestStruct>(&[], &[], None)), "string");
    }

    #[test]
    fn partial_flags_fail_on_next_required() {
        assert_eq!(
            missing(run::<TestStruct>(&["--string", "string"], &[], None)),
            "sub-string"
        );
        assert_eq!(
            missing(run::<TestStruct>(&["--sub-string", "string"], &[], None)),
            "string"
        );
        assert_eq!(
            missing(run::<TestStruct>(&["--string", "string", "--sub-int", "9"], &[], None)),
            "sub-string"
        );
    }

    #[test]
    fn partial_file_fails() {
        assert_eq!(
            missing(run::<TestStruct>(&[], &[], Some(r#"{"string": "string"}"#))),
            "sub-string"
        );
        assert_eq!(
            missing(run::<TestStruct>(&[], &[], Some(r#"{"sub": {"string": "string"}}"#))),
            "string"
        );
    }

    #[test]
    fn flags_env_and_file_combine() {
        let config: TestStruct = run(
            &["--sub-string", "substring", "--sub-sub-sub-rint", "2"],
            &[("TEST_INT", "9")],
            Some(r#"{"string": "string"}"#),
        )
        .unwrap();
        assert_eq!(
            config,
            with_strings(TestStruct {
                int: 9,
                ..Default::default()
            })
        );
    }

    #[test]
    fn file_alone_satisfies_required() {
        let config: TestStruct = run(
            &[],
            &[],
            Some(r#"{"string": "stringg", "sub": {"string": "string", "subsub": {"rint": 2}}}"#),
        )
        .unwrap();
        assert_eq!(config.string, "stringg");
        assert_eq!(config.sub.sub_sub.rint, 2);
    }

    #[test]
    fn flags_only() {
        let args = with_required_flags(&["--int", "9", "--sub-bool"]);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let config: TestStruct = run(&args, &[], None).unwrap();
        assert_eq!(
            config,
            with_strings(TestStruct {
                int: 9,
                sub: TestSubStruct {
                    bool: true,
                    ..Default::default()
                },
                ..Default::default()
            })
        );
    }

    #[test]
    fn env_and_flag_override_defaults() {
        let args = with_required_flags(&["--dstring", "blahhh"]);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let config: TestStruct = run(
            &args,
            &[("TEST_SUB_INT", "8"), ("TEST_SUB_DSTRING", "subblahhh")],
            None,
        )
        .unwrap();
        assert_eq!(
            config,
            with_strings(TestStruct {
                dstring: "blahhh".into(),
                sub: TestSubStruct {
                    dstring: "subblahhh".into(),
                    int: 8,
                    ..Default::default()
                },
                ..Default::default()
            })
        );
    }

    #[test]
    fn file_values_beat_declared_defaults() {
        let conf = r#"
        {
            "Int": 9, "Bool": true, "String": "string", "Dstring": "blahhhh",
            "sub": {
                "Int": 8, "String": "substring", "Dstring": "subblahhhh",
                "subsub": {"rint": 5, "dint": 8}
            }
        }"#;
        let config: TestStruct = run(&[], &[], Some(conf)).unwrap();
        assert_eq!(
            config,
            TestStruct {
                int: 9,
                bool: true,
                string: "string".into(),
                dstring: "blahhhh".into(),
                sub: TestSubStruct {
                    int: 8,
                    bool: false,
                    string: "substring".into(),
                    dstring: "subblahhhh".into(),
                    sub_sub: TestSubSubStruct { rint: 5, dint: 8 },
                },
            }
        );
    }

    #[test]
    fn full_precedence_env_over_flag_over_file() {
        let config: TestStruct = run(
            &[
                "--string",
                "poop!",
                "--sub-dstring",
                "poop2!",
                "--sub-sub-sub-rint",
                "2",
            ],
            &[("TEST_SUB_STRING", "asdf"), ("TEST_SUB_SUB_SUB_DINT", "3")],
            Some(r#"{"string": "string", "sub": {"subsub": {"dint": 9}}}"#),
        )
        .unwrap();
        assert_eq!(
            config,
            TestStruct {
                string: "poop!".into(),
                dstring: "string".into(),
                sub: TestSubStruct {
                    string: "asdf".into(),
                    dstring: "poop2!".into(),
                    sub_sub: TestSubSubStruct { rint: 2, dint: 3 },
                    ..Default::default()
                },
                ..Default::default()
            }
        );
    }

    #[test]
    fn env_supplies_required_value() {
        let config: TestStruct = run(
            &["--string", "poop!", "--sub-dstring", "poop2!"],
            &[("TEST_SUB_STRING", "asdf"), ("TEST_SUB_SUB_SUB_RINT", "2")],
            Some(r#"{"string": "string", "sub": {"string": "string2", "Dstring": "string2"}}"#),
        )
        .unwrap();
        assert_eq!(
            config,
            TestStruct {
                string: "poop!".into(),
                dstring: "string".into(),
                sub: TestSubStruct {
                    string: "asdf".into(),
                    dstring: "poop2!".into(),
                    sub_sub: TestSubSubStruct { rint: 2, dint: 1 },
                    ..Default::default()
                },
                ..Default::default()
            }
        );
    }

    #[test]
    fn floats_and_slices_from_file() {
        let config: TestStruct2 =
            run(&[], &[], Some(r#"{"floatr": 1.0, "slicer": [4,5,6]}"#)).unwrap();
        assert_eq!(
            config,
            TestStruct2 {
                float: 0.0,
                floatr: 1.0,
                floatd: 2.0,
                slice: vec![],
                slicer: vec!["4".into(), "5".into(), "6".into()],
                sliced: vec!["7".into(), "8".into(), "9".into()],
            }
        );
    }

    #[test]
    fn empty_required_slice_fails() {
        assert_eq!(
            missing(run::<TestStruct2>(&[], &[], Some(r#"{"floatr": 1.0, "slicer": []}"#))),
            "slicer"
        );
    }

    #[test]
    fn malformed_file_fails() {
        let result = run::<TestStruct2>(&[], &[], Some(r#"{"floatr": 1.0, "slice":[1,2,3]"#));
        assert!(matches!(result, Err(FlagfigError::ConfigFileMalformed { .. })));
    }

    #[test]
    fn every_float_and_slice_from_file() {
        let config: TestStruct2 = run(
            &[],
            &[],
            Some(
                r#"{"floatr": 1.0, "floatd": 2.0, "slice":[1,2,3], "slicer": [4,5,6], "sliced":[7,8,9]}"#,
            ),
        )
        .unwrap();
        assert_eq!(config.slice, ["1", "2", "3"]);
        assert_eq!(config.slicer, ["4", "5", "6"]);
        assert_eq!(config.sliced, ["7", "8", "9"]);
        assert_eq!(config.floatd, 2.0);
    }

    #[test]
    fn struct_literal_kept_when_file_sets_other_field() {
        let mut config = TestStruct {
            int: 9,
            ..Default::default()
        };
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"sub": {"int": 4}}"#).unwrap();
        let args = with_required_flags(&["--config", path.to_str().unwrap()]);
        Flagfig::builder::<TestStruct>()
            .name("test")
            .args(args)
            .no_env()
            .load_into(&mut config)
            .unwrap();
        assert_eq!(config.int, 9);
        assert_eq!(config.sub.int, 4);
    }

    #[test]
    fn struct_literal_beats_declared_default() {
        let mut config = TestStruct {
            dstring: "literal".into(),
            ..Default::default()
        };
        Flagfig::builder::<TestStruct>()
            .name("test")
            .args(with_required_flags(&[]))
            .no_env()
            .load_into(&mut config)
            .unwrap();
        assert_eq!(config.dstring, "literal");
        assert_eq!(config.sub.dstring, "substring");
    }

    #[test]
    fn struct_literal_alone_satisfies_required() {
        let literal = TestStruct {
            string: "a".into(),
            sub: TestSubStruct {
                string: "b".into(),
                sub_sub: TestSubSubStruct {
                    rint: 3,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let mut config = literal.clone();
        Flagfig::builder::<TestStruct>()
            .name("test")
            .args(Vec::<String>::new())
            .no_env()
            .load_into(&mut config)
            .unwrap();
        assert_eq!(config, with_strings(literal));
    }

    #[test]
    fn bool_flag_then_positional() {
        let mut binder = Flagfig::builder::<Toggles>()
            .name("test")
            .args(["--test", "true"])
            .no_env()
            .build()
            .unwrap();
        let mut config = Toggles::default();
        binder.parse(&mut config).unwrap();
        assert!(config.test);
        assert!(!config.test2);
        assert_eq!(binder.positional(), ["true"]);
    }

    #[test]
    fn bool_env_cannot_be_forced_false_by_flag_default() {
        let config: Toggles = run(&[], &[("TEST_TEST", "true")], None).unwrap();
        assert!(config.test);
    }

    #[test]
    fn config_path_from_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf.toml");
        fs::write(
            &path,
            "string = \"string\"\n[sub]\nstring = \"substring\"\n[sub.sub_sub]\nrint = 7\n",
        )
        .unwrap();
        let config: TestStruct = run(
            &[],
            &[("TEST_CONFIG", path.to_str().unwrap())],
            None,
        )
        .unwrap();
        assert_eq!(config.sub.sub_sub.rint, 7);
    }

    #[test]
    fn missing_config_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        let args = with_required_flags(&["--config", path.to_str().unwrap()]);
        let result = Flagfig::builder::<TestStruct>()
            .name("test")
            .args(args)
            .no_env()
            .load();
        assert!(matches!(result, Err(FlagfigError::ConfigFileNotFound { .. })));
    }

    #[test]
    fn strict_rejects_unknown_file_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"typo": 1, "sub": {"extra": true}}"#).unwrap();
        let args = with_required_flags(&["--config", path.to_str().unwrap()]);

        let lenient = Flagfig::builder::<TestStruct>()
            .name("test")
            .args(args.clone())
            .no_env()
            .load();
        assert!(lenient.is_ok());

        let strict = Flagfig::builder::<TestStruct>()
            .name("test")
            .args(args)
            .no_env()
            .strict(true)
            .load();
        match strict {
            Err(FlagfigError::UnknownKeys(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn failed_parse_leaves_config_untouched() {
        let mut config = TestStruct {
            int: 3,
            ..Default::default()
        };
        let result = Flagfig::builder::<TestStruct>()
            .name("test")
            .args(["--int", "9"])
            .no_env()
            .load_into(&mut config);
        assert!(result.is_err());
        assert_eq!(config, TestStruct { int: 3, ..Default::default() });
    }

    #[test]
    fn binder_reparses_with_new_args() {
        let mut binder = Flagfig::builder::<TestStruct>()
            .name("test")
            .args(with_required_flags(&["--int", "1"]))
            .no_env()
            .build()
            .unwrap();
        let mut first = TestStruct::default();
        binder.parse(&mut first).unwrap();
        assert_eq!(first.int, 1);
        assert!(binder.registry().is_changed("int"));

        binder.set_args(with_required_flags(&["--sub-int", "5"]));
        let mut second = TestStruct::default();
        binder.parse(&mut second).unwrap();
        assert_eq!(second.int, 0);
        assert_eq!(second.sub.int, 5);
        assert!(!binder.registry().is_changed("int"));
    }

    #[test]
    fn reset_clears_registry() {
        let mut binder = Flagfig::builder::<TestStruct>()
            .name("test")
            .args(with_required_flags(&["extra"]))
            .no_env()
            .build()
            .unwrap();
        binder.parse(&mut TestStruct::default()).unwrap();
        assert_eq!(binder.positional(), ["extra"]);
        assert_eq!(binder.registry().bindings().len(), 10);

        binder.reset();
        assert!(binder.registry().bindings().is_empty());
        assert!(binder.positional().is_empty());
    }

    #[test]
    fn help_surfaces_as_cli_error() {
        let result = Flagfig::builder::<TestStruct>()
            .name("test")
            .about("test desc")
            .args(["--help"])
            .no_env()
            .load();
        match result {
            Err(FlagfigError::Cli(e)) => {
                assert_eq!(e.kind(), clap::error::ErrorKind::DisplayHelp);
                assert!(e.to_string().contains("--sub-sub-sub-rint"));
            }
            other => panic!("expected help, got {other:?}"),
        }
    }

    #[test]
    fn zero_from_flag_does_not_clear_file_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"int": 9}"#).unwrap();
        let args = with_required_flags(&["--int", "0", "--config", path.to_str().unwrap()]);
        let config: TestStruct = Flagfig::builder::<TestStruct>()
            .name("test")
            .args(args)
            .no_env()
            .load()
            .unwrap();
        assert_eq!(config.int, 9);
    }
}
