//! Bridge client
//!
//! Connects to a host over an endpoint, performs the handshake, builds one
//! proxy per schema object, and runs the receive loop that routes replies,
//! signals, events, and input answers back to their consumers.
//!
//! A schema that fails to parse degrades the session instead of failing
//! it: the client comes up with an empty schema and no proxies, and the
//! root object's own operations keep working.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use bridge_types::Schema;
use bridge_types::version::is_compatible;

use crate::channel::ChannelEndpoint;
use crate::error::BridgeError;
use crate::events::EventHandler;
use crate::input::{InputCorrelation, WaiterOutcome};
use crate::message::{ChannelMessage, ROOT_CHANNEL_NAME, capability_channel_name};
use crate::proxy::{CapabilityProxy, PendingCalls, SignalTable, dispatch_signal};

const NOTIFICATION_CAPACITY: usize = 64;
const DEFAULT_INPUT_REPLY_TTL: Duration = Duration::from_secs(300);

/// Connection parameters.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Version the frontend was generated against. Checked advisorily
    /// against the host's version; a mismatch never blocks the session.
    pub expected_version: Option<String>,
    /// How long an unclaimed input reply or abandoned input waiter is kept.
    pub input_reply_ttl: Duration,
    /// Notification channel to broadcast on. Subscribe to it before
    /// connecting to observe the `Ready` and `VersionMismatch`
    /// notifications emitted during the handshake; when absent the session
    /// creates its own channel, which only carries post-connect traffic.
    pub notifications: Option<broadcast::Sender<BridgeNotification>>,
}

impl ClientOptions {
    /// Create a notification channel sized for a session.
    pub fn notification_channel() -> (
        broadcast::Sender<BridgeNotification>,
        broadcast::Receiver<BridgeNotification>,
    ) {
        broadcast::channel(NOTIFICATION_CAPACITY)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            expected_version: None,
            input_reply_ttl: DEFAULT_INPUT_REPLY_TTL,
            notifications: None,
        }
    }
}

/// Session-level notifications for the embedding application.
#[derive(Debug, Clone)]
pub enum BridgeNotification {
    Ready {
        version: String,
        schema: Arc<Schema>,
    },
    VersionMismatch {
        expected: String,
        actual: String,
    },
}

type EventTable = Arc<Mutex<HashMap<String, Vec<EventHandler>>>>;

/// The connected root bridge object.
pub struct BridgeRoot {
    version: String,
    schema: Arc<Schema>,
    valid_event_types: Vec<String>,
    version_mismatch: Option<(String, String)>,
    proxies: HashMap<String, Arc<CapabilityProxy>>,
    out_tx: mpsc::UnboundedSender<ChannelMessage>,
    pending_calls: PendingCalls,
    next_call_id: Arc<AtomicU64>,
    input: Arc<InputCorrelation>,
    event_handlers: EventTable,
    notifications: broadcast::Sender<BridgeNotification>,
}

/// Connect over `endpoint`: handshake, proxy construction, receive loop.
pub async fn connect(
    endpoint: ChannelEndpoint,
    options: ClientOptions,
) -> Result<BridgeRoot, BridgeError> {
    let (out_tx, mut rx) = endpoint.split();
    out_tx
        .send(ChannelMessage::Hello)
        .map_err(|_| BridgeError::TransportUnavailable)?;

    debug!("awaiting welcome");
    let (objects, version, schema_json, valid_event_types) = loop {
        match rx.recv().await {
            Some(ChannelMessage::Welcome {
                objects,
                version,
                schema_json,
                valid_event_types,
            }) => break (objects, version, schema_json, valid_event_types),
            Some(other) => debug!(?other, "ignoring pre-welcome message"),
            None => return Err(BridgeError::TransportClosed),
        }
    };

    debug!(%version, "loading schema");
    let schema = match Schema::from_json_text(&schema_json) {
        Ok(schema) => Arc::new(schema),
        Err(error) => {
            warn!(%error, "schema failed to parse, continuing degraded");
            Arc::new(Schema::default())
        }
    };

    let version_mismatch = match &options.expected_version {
        Some(expected) if !is_compatible(Some(expected.as_str()), &version) => {
            warn!(%expected, actual = %version, "bridge version mismatch");
            Some((expected.clone(), version.clone()))
        }
        _ => None,
    };

    debug!(objects = schema.objects.len(), "building proxies");
    let pending_calls: PendingCalls = Arc::new(DashMap::new());
    let next_call_id = Arc::new(AtomicU64::new(1));
    let mut proxies = HashMap::new();
    let mut signal_tables: HashMap<String, SignalTable> = HashMap::new();
    for descriptor in &schema.objects {
        let channel = capability_channel_name(&descriptor.name);
        if !objects.iter().any(|o| o == &channel) {
            warn!(object = %descriptor.name, "schema object has no channel, skipping");
            continue;
        }
        let proxy = CapabilityProxy::new(
            Arc::new(descriptor.clone()),
            channel.clone(),
            out_tx.clone(),
            pending_calls.clone(),
            next_call_id.clone(),
        );
        signal_tables.insert(channel, proxy.signal_table());
        proxies.insert(descriptor.name.clone(), Arc::new(proxy));
    }

    let input = Arc::new(InputCorrelation::new(options.input_reply_ttl));
    let event_handlers: EventTable = Arc::new(Mutex::new(HashMap::new()));
    let notifications = options
        .notifications
        .clone()
        .unwrap_or_else(|| broadcast::channel(NOTIFICATION_CAPACITY).0);

    tokio::spawn(receive_loop(
        rx,
        pending_calls.clone(),
        input.clone(),
        event_handlers.clone(),
        signal_tables,
    ));

    if let Some((expected, actual)) = &version_mismatch {
        let _ = notifications.send(BridgeNotification::VersionMismatch {
            expected: expected.clone(),
            actual: actual.clone(),
        });
    }
    let _ = notifications.send(BridgeNotification::Ready {
        version: version.clone(),
        schema: schema.clone(),
    });
    debug!("bridge ready");

    Ok(BridgeRoot {
        version,
        schema,
        valid_event_types,
        version_mismatch,
        proxies,
        out_tx,
        pending_calls,
        next_call_id,
        input,
        event_handlers,
        notifications,
    })
}

async fn receive_loop(
    mut rx: mpsc::UnboundedReceiver<ChannelMessage>,
    pending_calls: PendingCalls,
    input: Arc<InputCorrelation>,
    event_handlers: EventTable,
    signal_tables: HashMap<String, SignalTable>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            ChannelMessage::CallResult { call_id, value } => {
                if let Some((_, slot)) = pending_calls.remove(&call_id) {
                    let _ = slot.send(value);
                } else {
                    debug!(call_id, "reply for unknown call");
                }
            }
            ChannelMessage::Signal {
                object,
                signal,
                args,
            } => {
                if let Some(table) = signal_tables.get(&object) {
                    dispatch_signal(table, &signal, &args);
                }
            }
            ChannelMessage::Event {
                event_type,
                payload,
            } => dispatch_event(&event_handlers, &event_type, &payload),
            ChannelMessage::InputProvided { token, value } => {
                input.resolve_or_buffer(&token, value);
            }
            other => debug!(?other, "ignoring unexpected message"),
        }
    }
    debug!("host disconnected, receive loop ending");
}

/// Run event listeners in registration order, isolating panics.
fn dispatch_event(table: &EventTable, event_type: &str, payload: &Value) {
    let handlers: Vec<EventHandler> = match table.lock().get(event_type) {
        Some(handlers) => handlers.clone(),
        None => return,
    };
    for handler in handlers {
        if catch_unwind(AssertUnwindSafe(|| handler.call(payload))).is_err() {
            warn!(event_type, "event listener panicked");
        }
    }
}

impl BridgeRoot {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn valid_event_types(&self) -> &[String] {
        &self.valid_event_types
    }

    /// The advisory mismatch recorded at connect time, if any.
    pub fn version_mismatch(&self) -> Option<(&str, &str)> {
        self.version_mismatch
            .as_ref()
            .map(|(e, a)| (e.as_str(), a.as_str()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeNotification> {
        self.notifications.subscribe()
    }

    /// Proxy for an exported capability, if the schema declares it and the
    /// host serves its channel.
    pub fn capability(&self, name: &str) -> Option<Arc<CapabilityProxy>> {
        self.proxies.get(name).cloned()
    }

    /// Fire-and-forget payload push to the host application.
    pub fn send_data(&self, payload: Value) -> Result<(), BridgeError> {
        self.root_call("sendData", vec![payload])
    }

    /// Fire-and-forget output text update.
    pub fn set_output(&self, text: &str) -> Result<(), BridgeError> {
        self.root_call("setOutput", vec![Value::String(text.to_string())])
    }

    fn root_call(&self, method: &str, args: Vec<Value>) -> Result<(), BridgeError> {
        self.out_tx
            .send(ChannelMessage::Call {
                object: ROOT_CHANNEL_NAME.to_string(),
                method: method.to_string(),
                args,
                call_id: None,
            })
            .map_err(|_| BridgeError::TransportClosed)
    }

    /// Ask the host for input and wait for the answer.
    ///
    /// Two correlations happen in sequence: the call id resolves to the
    /// request token, then the token resolves to the provided value. The
    /// second wait is bounded by the input-reply TTL.
    pub async fn get_input(&self) -> Result<Value, BridgeError> {
        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending_calls.insert(call_id, tx);
        let sent = self.out_tx.send(ChannelMessage::Call {
            object: ROOT_CHANNEL_NAME.to_string(),
            method: "requestInput".to_string(),
            args: vec![],
            call_id: Some(call_id),
        });
        if sent.is_err() {
            self.pending_calls.remove(&call_id);
            return Err(BridgeError::TransportClosed);
        }
        let token_value = rx.await.map_err(|_| BridgeError::SessionClosed)?;
        let Some(token) = token_value.as_str().map(str::to_string) else {
            warn!("input token was not a string");
            return Err(BridgeError::SessionClosed);
        };

        match self.input.register_waiter(&token) {
            WaiterOutcome::Immediate(value) => Ok(value),
            WaiterOutcome::Parked(reply) => {
                match tokio::time::timeout(self.input.ttl(), reply).await {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(_)) => Err(BridgeError::SessionClosed),
                    Err(_) => {
                        self.input.evict_expired();
                        Err(BridgeError::InputExpired(token))
                    }
                }
            }
        }
    }

    /// Register a listener for a declared event type.
    pub fn add_event_listener(
        &self,
        event_type: &str,
        handler: EventHandler,
    ) -> Result<(), BridgeError> {
        if !self.valid_event_types.iter().any(|t| t == event_type) {
            return Err(BridgeError::EventTypeNotFound(event_type.to_string()));
        }
        self.event_handlers
            .lock()
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
        Ok(())
    }

    /// Remove a previously added listener by identity.
    pub fn remove_event_listener(
        &self,
        event_type: &str,
        handler: &EventHandler,
    ) -> Result<(), BridgeError> {
        if !self.valid_event_types.iter().any(|t| t == event_type) {
            return Err(BridgeError::EventTypeNotFound(event_type.to_string()));
        }
        if let Some(handlers) = self.event_handlers.lock().get_mut(event_type) {
            handlers.retain(|h| !h.same_handler(handler));
        }
        Ok(())
    }
}
