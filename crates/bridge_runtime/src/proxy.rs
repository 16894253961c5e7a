//! Capability proxies
//!
//! Client-side stand-in for one schema object. A call on a proxy becomes a
//! wire message; non-void calls are correlated back through the session's
//! pending-call table, void calls settle immediately without waiting for
//! the host.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use bridge_types::schema::CapabilityDescriptor;

use crate::error::BridgeError;
use crate::events::SignalHandler;
use crate::message::ChannelMessage;

/// Call-id to reply-slot table, shared by every proxy in a session.
pub(crate) type PendingCalls = Arc<DashMap<u64, oneshot::Sender<Value>>>;

/// Signal-name to handler-list table for one proxy.
pub(crate) type SignalTable = Arc<Mutex<HashMap<String, Vec<SignalHandler>>>>;

/// Reply to a proxy call. Void methods resolve immediately; everything else
/// waits for the host's result message.
#[derive(Debug)]
pub struct DeferredReply {
    inner: DeferredInner,
}

#[derive(Debug)]
enum DeferredInner {
    Resolved(Value),
    Pending(oneshot::Receiver<Value>),
}

impl DeferredReply {
    pub(crate) fn resolved(value: Value) -> Self {
        Self {
            inner: DeferredInner::Resolved(value),
        }
    }

    pub(crate) fn pending(rx: oneshot::Receiver<Value>) -> Self {
        Self {
            inner: DeferredInner::Pending(rx),
        }
    }

    /// Wait for the reply value.
    pub async fn wait(self) -> Result<Value, BridgeError> {
        match self.inner {
            DeferredInner::Resolved(value) => Ok(value),
            DeferredInner::Pending(rx) => rx.await.map_err(|_| BridgeError::SessionClosed),
        }
    }
}

pub struct CapabilityProxy {
    descriptor: Arc<CapabilityDescriptor>,
    channel: String,
    out_tx: mpsc::UnboundedSender<ChannelMessage>,
    pending_calls: PendingCalls,
    next_call_id: Arc<AtomicU64>,
    signal_handlers: SignalTable,
}

impl CapabilityProxy {
    pub(crate) fn new(
        descriptor: Arc<CapabilityDescriptor>,
        channel: String,
        out_tx: mpsc::UnboundedSender<ChannelMessage>,
        pending_calls: PendingCalls,
        next_call_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            descriptor,
            channel,
            out_tx,
            pending_calls,
            next_call_id,
            signal_handlers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Exported name of the capability this proxy fronts.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    pub(crate) fn signal_table(&self) -> SignalTable {
        self.signal_handlers.clone()
    }

    /// Invoke a schema method. The method must exist on this capability.
    pub fn call(&self, method: &str, args: Vec<Value>) -> Result<DeferredReply, BridgeError> {
        let Some(descriptor) = self.descriptor.get_method(method) else {
            return Err(BridgeError::MethodNotFound {
                object: self.descriptor.name.clone(),
                method: method.to_string(),
            });
        };

        if descriptor.returns_void {
            // Fire and forget, nothing to correlate.
            self.out_tx
                .send(ChannelMessage::Call {
                    object: self.channel.clone(),
                    method: method.to_string(),
                    args,
                    call_id: None,
                })
                .map_err(|_| BridgeError::TransportClosed)?;
            return Ok(DeferredReply::resolved(Value::Null));
        }

        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending_calls.insert(call_id, tx);
        let sent = self.out_tx.send(ChannelMessage::Call {
            object: self.channel.clone(),
            method: method.to_string(),
            args,
            call_id: Some(call_id),
        });
        if sent.is_err() {
            self.pending_calls.remove(&call_id);
            return Err(BridgeError::TransportClosed);
        }
        Ok(DeferredReply::pending(rx))
    }

    /// Register a handler for a declared signal.
    pub fn register_event_handler(
        &self,
        signal: &str,
        handler: SignalHandler,
    ) -> Result<(), BridgeError> {
        if !self.descriptor.has_signal(signal) {
            return Err(BridgeError::SignalNotFound {
                object: self.descriptor.name.clone(),
                signal: signal.to_string(),
            });
        }
        self.signal_handlers
            .lock()
            .entry(signal.to_string())
            .or_default()
            .push(handler);
        Ok(())
    }

    /// Remove a previously registered handler by identity.
    pub fn remove_event_handler(
        &self,
        signal: &str,
        handler: &SignalHandler,
    ) -> Result<(), BridgeError> {
        if !self.descriptor.has_signal(signal) {
            return Err(BridgeError::SignalNotFound {
                object: self.descriptor.name.clone(),
                signal: signal.to_string(),
            });
        }
        if let Some(handlers) = self.signal_handlers.lock().get_mut(signal) {
            handlers.retain(|h| !h.same_handler(handler));
        }
        Ok(())
    }
}

/// Run every handler registered for `signal`, in registration order. A
/// panicking handler is isolated so the rest still run.
pub(crate) fn dispatch_signal(table: &SignalTable, signal: &str, args: &[Value]) {
    let handlers: Vec<SignalHandler> = match table.lock().get(signal) {
        Some(handlers) => handlers.clone(),
        None => return,
    };
    for handler in handlers {
        if catch_unwind(AssertUnwindSafe(|| handler.call(args))).is_err() {
            warn!(signal, "signal handler panicked");
        }
    }
}
