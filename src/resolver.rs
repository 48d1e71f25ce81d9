//! Computes the effective recipient, sender and subject for an event.
//!
//! Each field is resolved on its own: a per-check override wins when it is
//! present and non-empty, otherwise the process-wide default applies.

use crate::config::Settings;
use crate::core::{Event, ResolvedFields};
use crate::error::ResolveError;

/// Resolves the envelope and subject of the message for `event`.
///
/// Fails when neither the check nor the settings name a recipient or a
/// sender, or when the chosen `to` lists no address at all (e.g. `","`);
/// nothing should be composed or sent in that case.
pub fn resolve(event: &Event, settings: &Settings) -> Result<ResolvedFields, ResolveError> {
    let check = &event.check;

    let to = pick(check.mail_to.as_deref(), settings.mail_to.as_deref())
        .filter(|to| recipients(to).next().is_some())
        .ok_or(ResolveError::MissingRecipient)?;
    let from = pick(check.mail_from.as_deref(), settings.mail_from.as_deref())
        .ok_or(ResolveError::MissingSender)?;
    let subject = match present(check.mail_subject.as_deref()) {
        Some(subject) => subject.to_string(),
        None => default_subject(event),
    };

    Ok(ResolvedFields {
        to: to.to_string(),
        from: from.to_string(),
        subject,
    })
}

/// `"<ALERT|RESOLVED> - <client>/<check>: <notification>"`
pub fn default_subject(event: &Event) -> String {
    format!(
        "{} - {}: {}",
        event.action.label(),
        event.short_name(),
        event.check.notification
    )
}

fn pick<'a>(overridden: Option<&'a str>, default: Option<&'a str>) -> Option<&'a str> {
    present(overridden).or_else(|| present(default))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// The individual addresses of a comma-separated recipient list.
pub fn recipients(to: &str) -> impl Iterator<Item = &str> {
    to.split(',').map(str::trim).filter(|r| !r.is_empty())
}
