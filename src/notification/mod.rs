//! Delivery sinks that put composed messages on the wire.
//!
//! The handler only depends on the `DeliverySink` trait from `core`; this
//! module holds the production implementation.
pub mod smtp;
