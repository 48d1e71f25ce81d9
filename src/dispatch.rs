//! Runs a single delivery attempt under a hard wall-clock deadline.
//!
//! The sink runs in its own task and the caller only ever waits until the
//! deadline. When time runs out the task is aborted and left to unwind on its
//! own; a blocking send may still finish in the background, but nobody waits
//! for it.

use crate::core::{ChannelConfig, DeliverySink, Outcome, ResolvedMessage};
use crate::error::DispatchError;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Attempts exactly one delivery of `message`, giving up at `deadline`.
///
/// A timeout is reported as [`Outcome::TimedOut`]; every other failure of the
/// sink is returned as an error.
pub async fn dispatch(
    sink: Arc<dyn DeliverySink>,
    message: ResolvedMessage,
    channel: ChannelConfig,
    deadline: Instant,
    short_name: &str,
) -> Result<Outcome, DispatchError> {
    let sink_name = sink.name().to_string();
    debug!(sink = %sink_name, address = %channel.address, port = channel.port, "Dispatching message");

    let mut task = tokio::spawn(async move { sink.deliver(&message, &channel).await });

    match timeout_at(deadline, &mut task).await {
        Ok(Ok(Ok(()))) => Ok(Outcome::Sent),
        Ok(Ok(Err(e))) => Err(DispatchError::DeliveryFault {
            sink: sink_name,
            short_name: short_name.to_string(),
            source: e.into(),
        }),
        Ok(Err(join_error)) => Err(DispatchError::TaskFailed {
            short_name: short_name.to_string(),
            source: join_error,
        }),
        Err(_elapsed) => {
            task.abort();
            warn!(sink = %sink_name, short_name, "Delivery did not finish before the deadline");
            Ok(Outcome::TimedOut)
        }
    }
}
