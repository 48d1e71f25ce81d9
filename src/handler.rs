//! The mail handler: resolves, composes and dispatches one event.

use crate::config::Settings;
use crate::core::{Action, DeliverySink, Event, Outcome};
use crate::dispatch::dispatch;
use crate::error::HandlerError;
use crate::formatting::{compose, BodyFormatter, PlainTextFormatter};
use crate::resolver::resolve;
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// Handles events with a fixed set of settings and a delivery sink.
///
/// Holds no per-event state, so one `Mailer` can serve any number of
/// invocations, concurrently or not.
pub struct Mailer {
    settings: Arc<Settings>,
    sink: Arc<dyn DeliverySink>,
    formatter: Box<dyn BodyFormatter>,
}

/// What happened to one event, printable as the handler's status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub outcome: Outcome,
    pub action: Action,
    pub short_name: String,
    pub to: String,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Sent => write!(f, "mail -- sent alert for {} to {}", self.short_name, self.to),
            Outcome::TimedOut => write!(
                f,
                "mail -- timed out while attempting to {} an incident -- {}",
                self.action, self.short_name
            ),
        }
    }
}

impl Mailer {
    pub fn new(settings: Arc<Settings>, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            settings,
            sink,
            formatter: Box::new(PlainTextFormatter),
        }
    }

    /// Replaces the default plain-text body formatter.
    pub fn with_formatter(mut self, formatter: Box<dyn BodyFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Runs the full pipeline for `event`.
    ///
    /// The delivery deadline counts from the moment this is called. Missing
    /// recipient or sender fails before anything is sent; a timeout comes back
    /// as a normal [`Delivery`]; any other delivery failure is an error.
    #[instrument(skip_all, fields(short_name = %event.short_name(), action = %event.action))]
    pub async fn handle(&self, event: &Event) -> Result<Delivery, HandlerError> {
        let deadline = Instant::now() + self.settings.timeout();
        let short_name = event.short_name();

        let fields = resolve(event, &self.settings)?;
        let message = compose(event, fields, self.formatter.as_ref());
        let to = message.to.clone();

        let outcome = dispatch(
            self.sink.clone(),
            message,
            self.settings.channel(),
            deadline,
            &short_name,
        )
        .await?;

        match outcome {
            Outcome::Sent => info!(%to, "Alert mail sent"),
            Outcome::TimedOut => warn!(
                timeout_seconds = self.settings.timeout_seconds,
                "Gave up on alert mail"
            ),
        }

        Ok(Delivery {
            outcome,
            action: event.action.clone(),
            short_name,
            to,
        })
    }
}
