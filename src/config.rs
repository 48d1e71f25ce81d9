//! Configuration management for the mailer
//!
//! This module defines the `Config` struct and the `Settings` it carries for
//! the handler. It uses the `figment` crate to layer built-in defaults, a
//! configuration file, environment variables and command-line arguments.
//!
//! The file may be TOML or, for drop-in use next to a Sensu install, the
//! JSON `mailer.json` shape:
//!
//! ```json
//! { "mailer": { "mail_to": "ops@example.com", "mail_from": "sensu@example.com" } }
//! ```

use crate::cli::Cli;
use crate::core::{ChannelConfig, TlsMode};
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment variable overrides, e.g. `SENSU_MAILER_MAIL_TO`.
pub const ENV_PREFIX: &str = "SENSU_MAILER_";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Mail delivery defaults.
    pub mailer: Settings,
}

/// Process-wide mail settings, read-only once loaded.
#[serde_as]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Default recipient when the check does not set `mail_to`.
    #[serde(default)]
    pub mail_to: Option<String>,
    /// Default sender when the check does not set `mail_from`.
    #[serde(default)]
    pub mail_from: Option<String>,
    pub smtp_address: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub smtp_port: u16,
    pub smtp_domain: String,
    /// Transport security towards the SMTP server.
    pub tls: TlsMode,
    /// Wall-clock budget for one invocation, in seconds.
    pub timeout_seconds: u64,
}

impl Settings {
    /// The channel configuration for a single delivery.
    pub fn channel(&self) -> ChannelConfig {
        ChannelConfig {
            address: self.smtp_address.clone(),
            port: self.smtp_port,
            domain: self.smtp_domain.clone(),
            tls: self.tls,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mail_to: None,
            mail_from: None,
            smtp_address: "localhost".to_string(),
            smtp_port: 25,
            smtp_domain: "localhost.localdomain".to_string(),
            tls: TlsMode::Strict,
            timeout_seconds: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mailer: Settings::default(),
        }
    }
}

impl Config {
    /// Loads the configuration, layering defaults, the optional config file,
    /// environment variables and finally the command-line arguments.
    pub fn load_from_cli(cli: Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = &cli.config {
            if !path.exists() {
                bail!("Config file not found at specified path: {}", path.display());
            }
            figment = merge_file(figment, path);
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).only(&["log_level"]))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["log_level"])
                    .map(|key| format!("mailer.{}", key).into()),
            )
            .merge(cli)
            .extract()?;
        Ok(config)
    }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        figment.merge(Json::file(path))
    } else {
        figment.merge(Toml::file(path))
    }
}
