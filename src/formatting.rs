// src/formatting.rs

use crate::core::{Event, ResolvedFields, ResolvedMessage};

/// Shown instead of a check description when the check does not define one.
pub const MISSING_DESCRIPTION: &str = "This check has no description. Whoever owns it \
should add a `description` field to the check definition explaining what the \
alert means and what to do when this mail arrives.";

pub const ALL_CLEAR: &str = "All Clear!";

const SIGN_OFF: &str = "\n\nLove,\n\nSensu";

/// A trait for rendering the body of an alert mail.
pub trait BodyFormatter: Send + Sync {
    fn format_body(&self, event: &Event) -> String;
}

/// Plain-text body: the check output, then either the all-clear line or the
/// check description, then a fixed sign-off.
pub struct PlainTextFormatter;

impl BodyFormatter for PlainTextFormatter {
    fn format_body(&self, event: &Event) -> String {
        let check = &event.check;
        let mut body = format!("{}\n\n", check.output);

        if event.action.is_resolve() {
            body.push_str(ALL_CLEAR);
        } else {
            let description = check
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(MISSING_DESCRIPTION);
            body.push_str("Check Description:\n");
            body.push_str(description);
        }

        body.push_str(SIGN_OFF);
        body
    }
}

/// Renders the body with the default [`PlainTextFormatter`].
pub fn compose_body(event: &Event) -> String {
    PlainTextFormatter.format_body(event)
}

/// Combines resolved fields and the rendered body into the final message.
pub fn compose(event: &Event, fields: ResolvedFields, formatter: &dyn BodyFormatter) -> ResolvedMessage {
    ResolvedMessage {
        to: fields.to,
        from: fields.from,
        subject: fields.subject,
        body: formatter.format_body(event),
    }
}
