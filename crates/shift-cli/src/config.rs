use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shift_crypto::EnvelopeKey;
use shift_sync::RemoteConfig;

/// Settings read from `shift.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    pub chain_path: PathBuf,
    /// Seed the envelope key is derived from.
    pub envelope_seed: u64,
    pub remote: RemoteConfig,
}

impl ShiftConfig {
    /// Read `path`, or fall back to defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read config file {}", path.display())),
        }
    }

    pub fn envelope_key(&self) -> EnvelopeKey {
        EnvelopeKey::from_seed(self.envelope_seed)
    }

    /// TOML rendering with the API key masked.
    pub fn redacted(&self) -> anyhow::Result<String> {
        let mut shown = self.clone();
        if !shown.remote.api_key.is_empty() {
            shown.remote.api_key = "********".into();
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            chain_path: PathBuf::from("shift.db"),
            envelope_seed: EnvelopeKey::DEFAULT_SEED,
            remote: RemoteConfig::default(),
        }
    }
}
