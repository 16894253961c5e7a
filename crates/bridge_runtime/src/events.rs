//! Handler types
//!
//! Listener callbacks registered on the client side. Identity is the
//! allocation behind the `Arc`, so the exact handle passed to `add` must be
//! passed to `remove`. Cloning a handler preserves identity.

use std::sync::Arc;

use serde_json::Value;

/// Callback for broadcast events on the root bridge object.
#[derive(Clone)]
pub struct EventHandler(Arc<dyn Fn(&Value) + Send + Sync>);

impl EventHandler {
    pub fn new(f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, payload: &Value) {
        (self.0)(payload)
    }

    pub fn same_handler(&self, other: &EventHandler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Callback for signal emissions on a capability proxy.
#[derive(Clone)]
pub struct SignalHandler(Arc<dyn Fn(&[Value]) + Send + Sync>);

impl SignalHandler {
    pub fn new(f: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) {
        (self.0)(args)
    }

    pub fn same_handler(&self, other: &SignalHandler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
