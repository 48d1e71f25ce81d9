//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the handler using the
//! `clap` crate. The arguments double as the highest-precedence configuration
//! layer: `Cli` implements `figment::Provider`, so any flag that is set
//! overrides the config file and the environment.

use crate::core::TlsMode;
use clap::{Parser, ValueEnum};
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Sensu handler that mails check alerts and recoveries.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML or JSON configuration file.
    #[arg(short, long, value_name = "FILE", env = "SENSU_MAILER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the event from FILE instead of standard input.
    #[arg(short, long, value_name = "FILE")]
    pub event: Option<PathBuf>,

    /// Default recipient address.
    #[arg(long, value_name = "ADDRESS")]
    pub mail_to: Option<String>,

    /// Default sender address.
    #[arg(long, value_name = "ADDRESS")]
    pub mail_from: Option<String>,

    /// SMTP server host name or IP.
    #[arg(long, value_name = "HOST")]
    pub smtp_address: Option<String>,

    /// SMTP server port.
    #[arg(long, value_name = "PORT")]
    pub smtp_port: Option<u16>,

    /// Domain announced in HELO/EHLO.
    #[arg(long, value_name = "DOMAIN")]
    pub smtp_domain: Option<String>,

    /// Transport security towards the SMTP server.
    #[arg(long, value_enum)]
    pub tls: Option<TlsArg>,

    /// Overall delivery deadline in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Logging level (overridden by RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlsArg {
    Strict,
    Permissive,
    Disabled,
}

impl From<TlsArg> for TlsMode {
    fn from(arg: TlsArg) -> Self {
        match arg {
            TlsArg::Strict => TlsMode::Strict,
            TlsArg::Permissive => TlsMode::Permissive,
            TlsArg::Disabled => TlsMode::Disabled,
        }
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut mailer = Dict::new();

        if let Some(to) = &self.mail_to {
            mailer.insert("mail_to".into(), Value::from(to.clone()));
        }
        if let Some(from) = &self.mail_from {
            mailer.insert("mail_from".into(), Value::from(from.clone()));
        }
        if let Some(address) = &self.smtp_address {
            mailer.insert("smtp_address".into(), Value::from(address.clone()));
        }
        if let Some(port) = self.smtp_port {
            mailer.insert("smtp_port".into(), Value::from(port));
        }
        if let Some(domain) = &self.smtp_domain {
            mailer.insert("smtp_domain".into(), Value::from(domain.clone()));
        }
        if let Some(tls) = self.tls {
            mailer.insert("tls".into(), Value::from(TlsMode::from(tls).to_string()));
        }
        if let Some(timeout) = self.timeout {
            mailer.insert("timeout_seconds".into(), Value::from(timeout));
        }

        let mut dict = Dict::new();
        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }
        if !mailer.is_empty() {
            dict.insert("mailer".into(), Value::Dict(Tag::Default, mailer));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
