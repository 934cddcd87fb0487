//! Configuration loading and representation.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use stash_inventory::CapacityPolicy;

use crate::owner_store::OwnerKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidVar { key: &'static str, value: String },
}

/// Runtime settings for the inventory adapters.
///
/// ```toml
/// catalog_ready_timeout_ms = 5000
/// decay_interval_ms = 60000
///
/// [player]
/// max_cells = 48
/// max_weight = 64.0
/// enforce_cells = true
/// enforce_weight = true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StashConfig {
    pub player: CapacityPolicy,
    pub vehicle: CapacityPolicy,
    pub storage: CapacityPolicy,
    /// How long an operation waits for the catalog before giving up.
    pub catalog_ready_timeout_ms: u64,
    /// Real time between two decay ticks.
    pub decay_interval_ms: u64,
    pub decay_enabled: bool,
}

impl Default for StashConfig {
    fn default() -> Self {
        Self {
            player: CapacityPolicy::unlimited().with_cells(48).with_weight(64.0),
            vehicle: CapacityPolicy::unlimited().with_cells(96).with_weight(400.0),
            storage: CapacityPolicy::unlimited().with_cells(256),
            catalog_ready_timeout_ms: 5_000,
            decay_interval_ms: 60_000,
            decay_enabled: true,
        }
    }
}

impl StashConfig {
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(data)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_toml_str(&data)
    }

    /// Load from `STASH_CONFIG` (when set) and apply `STASH_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var("STASH_CONFIG") {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };

        if let Some(ms) = env_parse("STASH_CATALOG_READY_TIMEOUT_MS")? {
            cfg.catalog_ready_timeout_ms = ms;
        }
        if let Some(ms) = env_parse("STASH_DECAY_INTERVAL_MS")? {
            cfg.decay_interval_ms = ms;
        }
        if let Some(enabled) = env_parse("STASH_DECAY_ENABLED")? {
            cfg.decay_enabled = enabled;
        }
        Ok(cfg)
    }

    /// Default limits for an owner kind (before per-record overrides).
    pub fn policy_for(&self, kind: OwnerKind) -> CapacityPolicy {
        match kind {
            OwnerKind::Player => self.player,
            OwnerKind::Vehicle => self.vehicle,
            OwnerKind::Storage => self.storage,
        }
    }

    pub fn catalog_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_ready_timeout_ms)
    }

    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }

    pub fn with_policy(mut self, kind: OwnerKind, policy: CapacityPolicy) -> Self {
        match kind {
            OwnerKind::Player => self.player = policy,
            OwnerKind::Vehicle => self.vehicle = policy,
            OwnerKind::Storage => self.storage = policy,
        }
        self
    }

    pub fn with_catalog_ready_timeout(mut self, timeout: Duration) -> Self {
        self.catalog_ready_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_decay_interval(mut self, interval: Duration) -> Self {
        self.decay_interval_ms = interval.as_millis() as u64;
        self
    }
}

fn env_parse<T: core::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { key, value }),
        Err(_) => Ok(None),
    }
}
