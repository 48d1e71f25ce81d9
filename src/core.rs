//! Core domain types and service traits for the mailer
//!
//! This module defines the event shape handed to us by the monitoring
//! pipeline, the transient message types derived from it, and the trait
//! contract for the component that actually puts a message on the wire.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// One state transition of a monitoring check, as delivered by Sensu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Event {
    /// Whether the check started failing or cleared.
    #[serde(default)]
    pub action: Action,
    /// The entity the check ran against.
    pub client: Client,
    /// The check that produced this event.
    pub check: Check,
}

impl Event {
    /// Parses an event from a JSON document, e.g. the handler's stdin.
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// The `client/check` name used in subjects and status lines.
    pub fn short_name(&self) -> String {
        format!("{}/{}", self.client.name, self.check.name)
    }
}

/// The reporting host or entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Client {
    pub name: String,
}

/// Check identity, output and the optional per-check mail overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Check {
    pub name: String,
    /// Raw output of the check execution.
    #[serde(default)]
    pub output: String,
    /// Short human summary, used in the default subject.
    #[serde(default)]
    pub notification: String,
    /// Longer explanation of what the check means and what to do about it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_subject: Option<String>,
}

/// The event action. Anything other than `resolve` counts as a firing alert.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    #[default]
    Create,
    Resolve,
    Flapping,
    Other(String),
}

impl Action {
    pub fn is_resolve(&self) -> bool {
        matches!(self, Action::Resolve)
    }

    /// The leading token of the default subject.
    pub fn label(&self) -> &'static str {
        if self.is_resolve() {
            "RESOLVED"
        } else {
            "ALERT"
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Create => "create",
            Action::Resolve => "resolve",
            Action::Flapping => "flapping",
            Action::Other(s) => s,
        }
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        match s.as_str() {
            "create" => Action::Create,
            "resolve" => Action::Resolve,
            "flapping" => Action::Flapping,
            _ => Action::Other(s),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective delivery parameters after applying overrides and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub to: String,
    pub from: String,
    pub subject: String,
}

/// A fully composed message, ready for a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Opportunistic STARTTLS with full certificate verification.
    #[default]
    Strict,
    /// Opportunistic STARTTLS that accepts invalid certificates and hostnames.
    Permissive,
    /// Plaintext only.
    Disabled,
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TlsMode::Strict => "strict",
            TlsMode::Permissive => "permissive",
            TlsMode::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// Where and how a message is handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub address: String,
    pub port: u16,
    /// Name we announce ourselves as in HELO/EHLO.
    pub domain: String,
    pub tls: TlsMode,
}

/// Result of a single bounded delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    TimedOut,
}

// =============================================================================
// Service Traits
// =============================================================================

/// Delivers composed messages to their recipient.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// A short name for the sink (e.g., "smtp"), used for logging and errors.
    fn name(&self) -> &str;

    /// Sends one message through the given channel.
    ///
    /// # Returns
    /// * `Ok(())` once the message was accepted
    /// * `Err` for any delivery failure (connection refused, rejected sender, ...)
    async fn deliver(&self, message: &ResolvedMessage, channel: &ChannelConfig) -> Result<()>;
}
