//! A delivery sink that sends mail over SMTP.

use crate::core::{ChannelConfig, DeliverySink, ResolvedMessage, TlsMode};
use crate::resolver::recipients;
use anyhow::Context;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::{Message, SmtpTransport, Transport};
use tokio::task;
use tracing::{debug, info, instrument};

/// Sends each message over a fresh SMTP connection.
///
/// The connection is configured from the `ChannelConfig` passed with every
/// call and discarded afterwards; nothing is pooled between invocations.
#[derive(Debug, Default, Clone)]
pub struct SmtpSink;

impl SmtpSink {
    pub fn new() -> Self {
        Self
    }

    /// Builds the transport for one delivery.
    fn build_transport(channel: &ChannelConfig) -> anyhow::Result<SmtpTransport> {
        let tls = match channel.tls {
            TlsMode::Disabled => Tls::None,
            TlsMode::Strict => Tls::Opportunistic(TlsParameters::new(channel.address.clone())?),
            TlsMode::Permissive => Tls::Opportunistic(
                TlsParameters::builder(channel.address.clone())
                    .dangerous_accept_invalid_certs(true)
                    .dangerous_accept_invalid_hostnames(true)
                    .build()?,
            ),
        };

        Ok(SmtpTransport::builder_dangerous(channel.address.as_str())
            .port(channel.port)
            .hello_name(ClientId::Domain(channel.domain.clone()))
            .tls(tls)
            .build())
    }

    /// Turns a resolved message into a MIME message. `to` may list several
    /// comma-separated recipients.
    fn build_message(message: &ResolvedMessage) -> anyhow::Result<Message> {
        let from: Mailbox = message
            .from
            .parse()
            .with_context(|| format!("invalid sender address {:?}", message.from))?;

        let mut builder = Message::builder().from(from);
        for recipient in recipients(&message.to) {
            let mailbox: Mailbox = recipient
                .parse()
                .with_context(|| format!("invalid recipient address {:?}", recipient))?;
            builder = builder.to(mailbox);
        }

        let email = builder
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;
        Ok(email)
    }

    /// Sends the message in a blocking manner.
    fn send_blocking(message: &ResolvedMessage, channel: &ChannelConfig) -> anyhow::Result<()> {
        let email = Self::build_message(message)?;
        let transport = Self::build_transport(channel)?;
        let response = transport
            .send(&email)
            .with_context(|| format!("SMTP delivery to {}:{} failed", channel.address, channel.port))?;
        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for SmtpSink {
    fn name(&self) -> &str {
        "smtp"
    }

    #[instrument(skip(self, message, channel), fields(to = %message.to, server = %channel.address, port = channel.port, tls = %channel.tls))]
    async fn deliver(&self, message: &ResolvedMessage, channel: &ChannelConfig) -> anyhow::Result<()> {
        let message = message.clone();
        let channel = channel.clone();

        task::spawn_blocking(move || Self::send_blocking(&message, &channel))
            .await
            .context("SMTP delivery task failed")??;

        info!("Message handed off to SMTP server.");
        Ok(())
    }
}
