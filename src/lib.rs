/// Sensu Mailer - a Sensu handler that mails alerts and recoveries
///
/// This library resolves the delivery parameters of a check event, composes
/// a plain-text notification and sends it under a hard deadline.
pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod formatting;
pub mod handler;
pub mod notification;
pub mod resolver;

// Re-export core types for convenience
pub use crate::core::*;
pub use handler::{Delivery, Mailer};
