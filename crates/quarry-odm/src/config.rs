use serde::{Deserialize, Serialize};

use crate::error::OdmError;

pub const PERSIST_IN_SAFE_MODE_VAR: &str = "QUARRY_PERSIST_IN_SAFE_MODE";
pub const IDENTITY_MAP_ENABLED_VAR: &str = "QUARRY_IDENTITY_MAP_ENABLED";

/// Mapper-wide settings. Handed to [`Session::new`](crate::Session::new);
/// nothing reads them from global state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdmConfig {
    /// Default `safe` flag for writes that don't override it.
    #[serde(default)]
    pub persist_in_safe_mode: bool,
    #[serde(default)]
    pub identity_map_enabled: bool,
}

impl OdmConfig {
    pub fn from_json(json: &str) -> Result<Self, OdmError> {
        serde_json::from_str(json).map_err(|e| OdmError::Config(e.to_string()))
    }

    /// Defaults, overridden by `QUARRY_PERSIST_IN_SAFE_MODE` and
    /// `QUARRY_IDENTITY_MAP_ENABLED` when set.
    pub fn from_env() -> Result<Self, OdmError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, OdmError> {
        let mut config = Self::default();
        if let Some(value) = lookup(PERSIST_IN_SAFE_MODE_VAR) {
            config.persist_in_safe_mode = parse_flag(PERSIST_IN_SAFE_MODE_VAR, &value)?;
        }
        if let Some(value) = lookup(IDENTITY_MAP_ENABLED_VAR) {
            config.identity_map_enabled = parse_flag(IDENTITY_MAP_ENABLED_VAR, &value)?;
        }
        Ok(config)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, OdmError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(OdmError::Config(format!(
            "{name}: expected true/false/1/0, got '{other}'"
        ))),
    }
}
