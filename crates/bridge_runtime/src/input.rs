//! Input-request correlation
//!
//! `getInput` and the host's reply race in both directions: the waiter can
//! register before the reply arrives, or the reply can arrive before the
//! waiter registers. Both maps live behind one lock so a token is always in
//! exactly one of them, never both.
//!
//! Buffered replies and parked waiters that nobody ever claims are evicted
//! after a TTL, so an abandoned request cannot pin memory forever.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

struct PendingWaiter {
    reply_to: oneshot::Sender<Value>,
    registered_at: Instant,
}

struct BufferedReply {
    value: Value,
    arrived_at: Instant,
}

/// What `register_waiter` resolved to.
pub enum WaiterOutcome {
    /// A reply was already buffered for the token.
    Immediate(Value),
    /// No reply yet; the returned receiver fires when one arrives.
    Parked(oneshot::Receiver<Value>),
}

/// Token-keyed rendezvous between input waiters and host replies.
pub struct InputCorrelation {
    ttl: Duration,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    pending: HashMap<String, PendingWaiter>,
    buffered: HashMap<String, BufferedReply>,
}

impl InputCorrelation {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(State::default()),
        }
    }

    /// Deliver a host reply: wake a parked waiter if one exists, otherwise
    /// buffer the value under the token.
    pub fn resolve_or_buffer(&self, token: &str, value: Value) {
        let mut state = self.state.lock();
        Self::evict_expired_locked(&mut state, self.ttl);
        if let Some(waiter) = state.pending.remove(token) {
            // Receiver may have been dropped by a cancelled caller.
            let _ = waiter.reply_to.send(value);
        } else {
            state.buffered.insert(
                token.to_string(),
                BufferedReply {
                    value,
                    arrived_at: Instant::now(),
                },
            );
        }
    }

    /// Register a waiter for a token: consume a buffered reply if one is
    /// already there, otherwise park until the reply arrives.
    pub fn register_waiter(&self, token: &str) -> WaiterOutcome {
        let mut state = self.state.lock();
        Self::evict_expired_locked(&mut state, self.ttl);
        if let Some(reply) = state.buffered.remove(token) {
            return WaiterOutcome::Immediate(reply.value);
        }
        let (tx, rx) = oneshot::channel();
        state.pending.insert(
            token.to_string(),
            PendingWaiter {
                reply_to: tx,
                registered_at: Instant::now(),
            },
        );
        WaiterOutcome::Parked(rx)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop entries older than the TTL from both maps.
    pub fn evict_expired(&self) {
        let mut state = self.state.lock();
        Self::evict_expired_locked(&mut state, self.ttl);
    }

    fn evict_expired_locked(state: &mut State, ttl: Duration) {
        let now = Instant::now();
        let before = state.pending.len() + state.buffered.len();
        state
            .pending
            .retain(|_, waiter| now.duration_since(waiter.registered_at) < ttl);
        state
            .buffered
            .retain(|_, reply| now.duration_since(reply.arrived_at) < ttl);
        let evicted = before - (state.pending.len() + state.buffered.len());
        if evicted > 0 {
            debug!(evicted, "evicted expired input correlations");
        }
    }

    #[cfg(test)]
    fn counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.pending.len(), state.buffered.len())
    }
}
