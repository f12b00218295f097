//! Simulation configuration read from the environment.
use std::env;
use std::path::PathBuf;

/// Settings for one scripted damage session.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Directory holding the RON/TOML content.
    pub data_dir: PathBuf,
    /// Overrides `audit_changes` from `config.toml` when set.
    pub audit: Option<bool>,
}

impl SimConfig {
    pub const DEFAULT_DATA_DIR: &'static str = "data";

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DAMAGE_DATA_DIR` - Content directory (default: `data`)
    /// - `DAMAGE_AUDIT` - `true`/`false` to force audit logging on or off
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("DAMAGE_DATA_DIR") {
            config.data_dir = dir;
        }
        config.audit = read_env::<bool>("DAMAGE_AUDIT");

        config
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(Self::DEFAULT_DATA_DIR),
            audit: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
