use std::collections::HashMap;

/// Snapshot of the environment, keyed by full variable name.
///
/// A field bound to env name `SUB_INT` under prefix `TEST` is read from
/// `TEST_SUB_INT`. Empty variables count as unset. A snapshot without a
/// prefix is disabled and never yields values.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    prefix: Option<String>,
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn new(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            vars: vars.into_iter().collect(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.prefix.is_some()
    }

    /// Full variable name for a bound env name, or `None` when disabled.
    pub fn var_name(&self, env_name: &str) -> Option<String> {
        let prefix = self.prefix.as_deref()?;
        if prefix.is_empty() {
            Some(env_name.to_string())
        } else {
            Some(format!("{prefix}_{env_name}"))
        }
    }

    /// Non-empty value of the variable bound to `env_name`.
    pub fn get(&self, env_name: &str) -> Option<&str> {
        let var = self.var_name(env_name)?;
        self.vars
            .get(&var)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}
