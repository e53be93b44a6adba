//! PlotKit Settings Crate
//!
//! Loads, validates and saves application configuration.

pub mod config;
pub mod error;

pub use config::{
    config_dir, default_config_path, Config, LoggingSettings, ProcessingSettings,
    CONFIG_FILE_NAME,
};
pub use error::{SettingsError, SettingsResult};
