//! Capability objects
//!
//! The host-side counterpart of a schema object. A capability receives
//! method invocations from the dispatch loop and may push signals back to
//! the client through the [`SignalEmitter`] it was attached with.

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::message::ChannelMessage;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("unknown method {0}")]
    UnknownMethod(String),

    #[error("invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },
}

/// Host-side implementation of one exported capability.
pub trait CapabilityObject: Send {
    /// Called once at registration with the emitter bound to this
    /// capability's channel. The default keeps no emitter.
    fn attach(&mut self, _signals: SignalEmitter) {}

    /// Dispatch one method call. Arguments arrive positionally, already
    /// decoded from the wire.
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, CapabilityError>;
}

/// Pushes signal emissions onto the session's outbound stream.
///
/// Cloneable and detached from the dispatch loop, so capabilities can emit
/// from wherever they hold state. Emissions after the session ends are
/// silently dropped.
#[derive(Clone)]
pub struct SignalEmitter {
    object: String,
    tx: mpsc::UnboundedSender<ChannelMessage>,
}

impl SignalEmitter {
    pub fn new(object: String, tx: mpsc::UnboundedSender<ChannelMessage>) -> Self {
        Self { object, tx }
    }

    /// Emit a named signal with positional arguments.
    pub fn emit(&self, signal: &str, args: Vec<Value>) {
        let message = ChannelMessage::Signal {
            object: self.object.clone(),
            signal: signal.to_string(),
            args,
        };
        if self.tx.send(message).is_err() {
            debug!(object = %self.object, signal, "dropping signal, session closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emitter_addresses_its_object() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emitter = SignalEmitter::new("HostApi_example".to_string(), tx);
        emitter.emit("statusChanged", vec![json!("ready")]);
        let message = rx.try_recv().unwrap();
        assert_eq!(
            message,
            ChannelMessage::Signal {
                object: "HostApi_example".to_string(),
                signal: "statusChanged".to_string(),
                args: vec![json!("ready")],
            }
        );
    }

    #[test]
    fn test_emit_after_close_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let emitter = SignalEmitter::new("HostApi_example".to_string(), tx);
        emitter.emit("statusChanged", vec![]);
    }
}
