use crate::config::args::FlagMap;
use crate::config::keys::{ConfigKey, CONFIG_KEYS};
use std::collections::{BTreeMap, HashMap};

/// Merged but unvalidated settings. Any key may be missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    values: BTreeMap<ConfigKey, String>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Present and non-empty.
    pub fn is_set(&self, key: ConfigKey) -> bool {
        self.get(key).map(|value| !value.is_empty()).unwrap_or(false)
    }

    pub fn take(&mut self, key: ConfigKey) -> Option<String> {
        self.values.remove(&key)
    }
}

/// Command-line flags win over environment variables; an empty flag still wins.
pub fn merge(env: &HashMap<String, String>, flags: &FlagMap) -> RawConfig {
    let mut raw = RawConfig::new();
    for key in CONFIG_KEYS {
        let value = flags.get(key).cloned().or_else(|| {
            key.env_names()
                .iter()
                .find_map(|name| env.get(*name).cloned())
        });
        if let Some(value) = value {
            raw.values.insert(*key, value);
        }
    }
    raw
}
