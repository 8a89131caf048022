//! Configuration loading from disk and the environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::{ListenerConfig, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the upstream base URL.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";

/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid {name}: '{value}'")]
    Env { name: &'static str, value: String },
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without semantic validation.
///
/// Used when further overrides are layered on before validating.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply `BACKEND_URL` and `PORT` overrides using the given lookup.
///
/// Taking the lookup as a closure keeps tests away from process-global
/// environment state; production code passes `|k| std::env::var(k).ok()`.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(upstream) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
        config.forwarding.upstream = upstream.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_PORT).filter(|v| !v.trim().is_empty()) {
        let port = raw.trim().parse::<u16>().map_err(|_| ConfigError::Env {
            name: ENV_PORT,
            value: raw.clone(),
        })?;
        set_port(&mut config.listener, port);
    }

    Ok(())
}

/// Replace the port of the bind address, keeping its host.
pub fn set_port(listener: &mut ListenerConfig, port: u16) {
    listener.bind_address = match listener.bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{}", port),
    };
}
