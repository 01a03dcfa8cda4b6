use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::ConfigError;

/// Registry settings applied when a [`PlayerRegistry`](crate::registry::PlayerRegistry)
/// is built.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pass mimetype parameters (e.g. `codecs=...`) through to the backend.
    /// When off, backends only ever see the essence.
    pub forward_parameters: bool,
    /// Priority overrides by backend name. Higher wins.
    pub priorities: HashMap<String, i32>,
    /// Backends that are never listed nor selected.
    pub disabled: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            forward_parameters: true,
            priorities: HashMap::new(),
            disabled: Vec::new(),
        }
    }
}

impl PlayerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn is_disabled(&self, backend: &str) -> bool {
        self.disabled.iter().any(|name| name == backend)
    }
}
