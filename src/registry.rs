//! The flag/env layer: every registered binding plus its current flag state.
//!
//! A [`Registry`] is built explicitly and handed to each stage (registration,
//! CLI parsing, resolution, validation). Nothing is global: [`Registry::reset`]
//! drops all bindings so a fresh registration can run against the same
//! environment snapshot.

use std::collections::HashMap;

use crate::env::EnvSnapshot;
use crate::error::FlagfigError;
use crate::schema::LeafKind;
use crate::value::RawValue;

/// Flag accepted at the root regardless of schema.
pub const CONFIG_FLAG: &str = "config";

/// Flag names no field may derive.
const RESERVED_FLAGS: [&str; 2] = [CONFIG_FLAG, "help"];

/// One registered field: its flag, its env name, and registration metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Flag name without the leading `--`.
    pub flag: String,
    /// Env name without the process prefix; set by [`Registry::bind_env`].
    pub env: Option<String>,
    /// Dotted field location, e.g. `sub.sub_sub.rint`.
    pub field: String,
    pub kind: LeafKind,
    pub default: RawValue,
    pub description: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FlagState {
    value: RawValue,
    changed: bool,
}

#[derive(Debug, Default)]
pub struct Registry {
    bindings: Vec<Binding>,
    states: Vec<FlagState>,
    index: HashMap<String, usize>,
    env: EnvSnapshot,
}

impl Registry {
    pub fn new(env: EnvSnapshot) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }

    /// Register a flag. Its value starts out as the binding's default.
    pub fn declare_flag(&mut self, binding: Binding) -> Result<(), FlagfigError> {
        if RESERVED_FLAGS.contains(&binding.flag.as_str()) || self.index.contains_key(&binding.flag) {
            return Err(FlagfigError::DuplicateFlag(binding.flag));
        }
        self.index.insert(binding.flag.clone(), self.bindings.len());
        self.states.push(FlagState {
            value: binding.default.clone(),
            changed: false,
        });
        self.bindings.push(binding);
        Ok(())
    }

    /// Attach an env name to an already declared flag.
    pub fn bind_env(&mut self, flag: &str, env_name: impl Into<String>) {
        match self.index.get(flag) {
            Some(&i) => self.bindings[i].env = Some(env_name.into()),
            None => tracing::warn!(flag, "env binding for undeclared flag ignored"),
        }
    }

    /// Bindings in registration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding(&self, flag: &str) -> Option<&Binding> {
        self.index.get(flag).map(|&i| &self.bindings[i])
    }

    /// The flag's current value: set from argv, back-filled, or the default.
    pub fn value(&self, flag: &str) -> Option<&RawValue> {
        self.index.get(flag).map(|&i| &self.states[i].value)
    }

    /// Whether the flag was given on the command line.
    pub fn is_changed(&self, flag: &str) -> bool {
        self.index
            .get(flag)
            .is_some_and(|&i| self.states[i].changed)
    }

    /// Record a value parsed from argv.
    pub fn set_from_cli(&mut self, flag: &str, value: RawValue) {
        if let Some(&i) = self.index.get(flag) {
            self.states[i] = FlagState {
                value,
                changed: true,
            };
        }
    }

    /// Overwrite the flag's value without marking it changed.
    pub fn backfill(&mut self, flag: &str, value: RawValue) {
        if let Some(&i) = self.index.get(flag) {
            self.states[i].value = value;
        }
    }

    /// Value of the env variable bound to `flag`, parsed by the binding's kind.
    ///
    /// Unparseable values are logged and treated as unset.
    pub fn env_value(&self, flag: &str) -> Option<RawValue> {
        let binding = self.binding(flag)?;
        let env_name = binding.env.as_deref()?;
        let text = self.env.get(env_name)?;
        match RawValue::parse(binding.kind, text) {
            Ok(value) => Some(value),
            Err(reason) => {
                tracing::warn!(
                    var = self.env.var_name(env_name).unwrap_or_default(),
                    %reason,
                    "ignoring environment variable"
                );
                None
            }
        }
    }

    /// What the layer holds for `flag`: the env value when set, else the flag value.
    pub fn current_value(&self, flag: &str) -> Option<RawValue> {
        self.env_value(flag).or_else(|| self.value(flag).cloned())
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    /// Drop every binding and flag state. The env snapshot is kept.
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.states.clear();
        self.index.clear();
    }
}
