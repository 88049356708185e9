//! Configuration handling for the sign-up form

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment override for the simulated backend delay
pub const SUBMIT_DELAY_ENV: &str = "SIGNUP_SUBMIT_DELAY_MS";

/// User configuration; unset keys fall back to the defaults below
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SignupConfig {
    /// Simulated backend latency
    pub submit_delay_ms: Option<u64>,
    /// How long the success banner stays up
    pub banner_timeout_ms: Option<u64>,
    /// Give up on the backend after this long
    pub submit_timeout_ms: Option<u64>,
    /// Usernames the simulated backend rejects
    pub taken_usernames: Option<Vec<String>>,
}

impl SignupConfig {
    pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 500;
    pub const DEFAULT_BANNER_TIMEOUT_MS: u64 = 5000;
    pub const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 10_000;

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "signup", "signup-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the user config dir, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(SUBMIT_DELAY_ENV).ok().as_deref());
        Ok(config)
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn apply_env_override(&mut self, delay: Option<&str>) {
        let Some(raw) = delay else {
            return;
        };
        match raw.trim().parse::<u64>() {
            Ok(ms) => self.submit_delay_ms = Some(ms),
            Err(_) => tracing::warn!("ignoring {SUBMIT_DELAY_ENV}={raw:?}, not a number"),
        }
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(
            self.submit_delay_ms
                .unwrap_or(Self::DEFAULT_SUBMIT_DELAY_MS),
        )
    }

    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(
            self.banner_timeout_ms
                .unwrap_or(Self::DEFAULT_BANNER_TIMEOUT_MS),
        )
    }

    /// `0` disables the timeout
    pub fn submit_timeout(&self) -> Option<Duration> {
        match self
            .submit_timeout_ms
            .unwrap_or(Self::DEFAULT_SUBMIT_TIMEOUT_MS)
        {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn taken_usernames(&self) -> &[String] {
        self.taken_usernames.as_deref().unwrap_or_default()
    }
}
