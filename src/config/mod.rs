//! Settings loading.
//!
//! Layers, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `$XDG_CONFIG_HOME/scm-sync/config.toml`
//! 3. `./scm-sync.toml`
//! 4. An explicit `--config <file>` (must exist)
//! 5. `SCM_SYNC_*` environment variables, `__` separating nested keys
//!    (e.g. `SCM_SYNC_HTTP__TIMEOUT_SECS=10`)

pub mod settings;

pub use settings::{
    BitbucketCloudSettings, BitbucketServerSettings, GithubSettings, HttpSettings, Settings,
};

use crate::errors::{Result, ScmError};
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SCM_SYNC";
pub const LOCAL_CONFIG_FILE: &str = "scm-sync.toml";

/// User-level config file (`~/.config/scm-sync/config.toml` on Linux)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scm-sync").join("config.toml"))
}

/// Load settings from every layer and validate the result
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let mut builder = Config::builder();

    if let Some(path) = user_config_path() {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
    }
    builder = builder.add_source(
        File::with_name(LOCAL_CONFIG_FILE)
            .format(FileFormat::Toml)
            .required(false),
    );
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ScmError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }

    let settings: Settings = builder
        .add_source(environment())
        .build()
        .and_then(|config| config.try_deserialize())
        .map_err(|e| ScmError::config(format!("Failed to load settings: {e}")))?;

    settings.validate()?;
    tracing::debug!("Loaded settings: {:?}", settings);
    Ok(settings)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
