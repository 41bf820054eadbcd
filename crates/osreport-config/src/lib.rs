//! Configuration system for osreport.
//!
//! Provides TOML-based configuration with:
//! - Config file layering (user config dir + project-local override)
//! - Environment variable overrides (`API_TOKEN`, `PORT`, ...)
//! - Defaults for every setting, so an empty config is a working one

pub mod discovery;
pub mod env;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    user_config_dir, user_config_path,
};
pub use env::{apply_env_overrides, apply_overrides_from};
pub use error::{ConfigError, Result};
pub use types::*;
