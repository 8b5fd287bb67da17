//! Startup configuration assembly.
//!
//! # Responsibilities
//! - Load the optional config file (defaults otherwise)
//! - Apply command-line overrides on top
//! - Validate the merged result
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Command-line values win over the file

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::config::{load_config, validate_config, ConfigError, ServerConfig};

/// Values taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub directory: Option<PathBuf>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Build the effective configuration.
pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: Overrides,
) -> Result<ServerConfig, ConfigError> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(directory) = overrides.directory {
        config.files.serving_directory = Some(directory);
    }
    if let Some(port) = overrides.port {
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }
    if let Some(level) = overrides.log_level {
        config.observability.log_level = level;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn with_port(bind_address: &str, port: u16) -> String {
    match bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        // Leave it for validation to report.
        Err(_) => bind_address.to_string(),
    }
}
