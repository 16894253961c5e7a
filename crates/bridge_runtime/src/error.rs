//! Runtime errors

use thiserror::Error;

/// Client-side bridge failures.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transport is not available")]
    TransportUnavailable,

    #[error("transport closed by peer")]
    TransportClosed,

    // Message text matches what generated frontends assert on.
    #[error("eventType {0} not found.")]
    EventTypeNotFound(String),

    #[error("method {method} not found on {object}")]
    MethodNotFound { object: String, method: String },

    #[error("signal {signal} not found on {object}")]
    SignalNotFound { object: String, signal: String },

    #[error("input request {0} expired before a reply arrived")]
    InputExpired(String),

    #[error("bridge session closed")]
    SessionClosed,
}

/// Host-side failures surfaced through [`crate::host::HostHandle`].
#[derive(Debug, Error)]
pub enum HostError {
    #[error("eventType {0} not found.")]
    EventTypeNotFound(String),

    #[error("transport closed by peer")]
    TransportClosed,
}
