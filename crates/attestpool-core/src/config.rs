// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Address;

pub const ENV_ENGINE_ADDRESS: &str = "ATTESTPOOL_ENGINE_ADDRESS";
pub const ENV_MAX_TEXT_BYTES: &str = "ATTESTPOOL_MAX_TEXT_BYTES";
pub const ENV_BOOTSTRAP_REASON: &str = "ATTESTPOOL_BOOTSTRAP_REASON";

pub const DEFAULT_MAX_TEXT_BYTES: usize = 4096;
pub const DEFAULT_BOOTSTRAP_REASON: &str = "pool creator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Attester identity the engine uses for the claims it issues itself.
    pub engine_address: Address,
    /// Upper bound on every decoded text field, in bytes.
    pub max_text_bytes: usize,
    /// Reason text carried by the creator invite issued at pool creation.
    pub bootstrap_reason: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_address: Address::tagged(1),
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            bootstrap_reason: DEFAULT_BOOTSTRAP_REASON.to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by whichever `ATTESTPOOL_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = fs::read(path)?;
        let config: Self = serde_json::from_slice(&payload)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_ENGINE_ADDRESS) {
            config.engine_address = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(raw.clone()))?;
        }
        if let Some(raw) = lookup(ENV_MAX_TEXT_BYTES) {
            config.max_text_bytes = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_MAX_TEXT_BYTES,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = lookup(ENV_BOOTSTRAP_REASON) {
            config.bootstrap_reason = raw;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_address.is_zero() {
            return Err(ConfigError::InvalidAddress(self.engine_address.to_string()));
        }
        if self.max_text_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_text_bytes",
                value: "0".to_string(),
            });
        }
        if self.bootstrap_reason.len() > self.max_text_bytes {
            return Err(ConfigError::InvalidValue {
                key: "bootstrap_reason",
                value: self.bootstrap_reason.clone(),
            });
        }
        Ok(())
    }
}
