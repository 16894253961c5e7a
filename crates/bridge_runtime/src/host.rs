//! Bridge host
//!
//! Owns the registered capability objects and serves one client session:
//! answers the handshake with the schema, dispatches capability calls,
//! brokers the root object's `sendData`/`setOutput`/`requestInput` traffic,
//! and pushes application events to the client.
//!
//! The dispatch loop runs on one task and owns every capability, so
//! capability implementations never need their own locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::capability::{CapabilityObject, SignalEmitter};
use crate::channel::ChannelEndpoint;
use crate::error::HostError;
use crate::message::{ChannelMessage, ROOT_CHANNEL_NAME, capability_channel_name};

const NOTIFICATION_CAPACITY: usize = 64;

/// Session parameters advertised in the welcome message.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub version: String,
    /// Schema document as JSON text, embedded at build time.
    pub schema_json: String,
    pub valid_event_types: Vec<String>,
}

/// What the hosting application observes about the session.
#[derive(Debug, Clone)]
pub enum HostNotification {
    /// Client opened the handshake.
    ClientHello,
    /// Client pushed a payload through `sendData`.
    DataReceived(Value),
    /// Client replaced the output text through `setOutput`.
    OutputChanged(String),
    /// Client asked for input; answer with
    /// [`HostHandle::provide_input`] using this token.
    InputRequested { token: String },
}

enum ControlCommand {
    Shutdown,
}

/// Cloneable application-side handle to a running host.
#[derive(Clone)]
pub struct HostHandle {
    out_tx: mpsc::UnboundedSender<ChannelMessage>,
    control_tx: mpsc::UnboundedSender<ControlCommand>,
    notifications: broadcast::Sender<HostNotification>,
    valid_event_types: Arc<[String]>,
}

impl HostHandle {
    /// Answer an earlier input request.
    pub fn provide_input(&self, token: &str, value: Value) -> Result<(), HostError> {
        self.out_tx
            .send(ChannelMessage::InputProvided {
                token: token.to_string(),
                value,
            })
            .map_err(|_| HostError::TransportClosed)
    }

    /// Broadcast an application event to the client. The event type must be
    /// one of the session's declared types.
    pub fn trigger_event(&self, event_type: &str, payload: Value) -> Result<(), HostError> {
        if !self.valid_event_types.iter().any(|t| t == event_type) {
            return Err(HostError::EventTypeNotFound(event_type.to_string()));
        }
        self.out_tx
            .send(ChannelMessage::Event {
                event_type: event_type.to_string(),
                payload,
            })
            .map_err(|_| HostError::TransportClosed)
    }

    /// Subscribe to session notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<HostNotification> {
        self.notifications.subscribe()
    }

    /// Stop the dispatch loop.
    pub fn shutdown(&self) {
        let _ = self.control_tx.send(ControlCommand::Shutdown);
    }
}

/// One host session over one endpoint.
pub struct BridgeHost {
    endpoint: ChannelEndpoint,
    config: HostConfig,
    // BTreeMap keeps the advertised object list in a stable order.
    capabilities: BTreeMap<String, Box<dyn CapabilityObject>>,
    control_tx: mpsc::UnboundedSender<ControlCommand>,
    control_rx: mpsc::UnboundedReceiver<ControlCommand>,
    notifications: broadcast::Sender<HostNotification>,
}

impl BridgeHost {
    pub fn new(endpoint: ChannelEndpoint, config: HostConfig) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            endpoint,
            config,
            capabilities: BTreeMap::new(),
            control_tx,
            control_rx,
            notifications,
        }
    }

    /// Bind a capability under its exported name. The object is attached to
    /// a signal emitter addressing its channel before it can be invoked.
    pub fn register_capability(&mut self, export_name: &str, mut object: Box<dyn CapabilityObject>) {
        let channel = capability_channel_name(export_name);
        object.attach(SignalEmitter::new(channel.clone(), self.endpoint.sender()));
        self.capabilities.insert(channel, object);
    }

    pub fn handle(&self) -> HostHandle {
        HostHandle {
            out_tx: self.endpoint.sender(),
            control_tx: self.control_tx.clone(),
            notifications: self.notifications.clone(),
            valid_event_types: self.config.valid_event_types.clone().into(),
        }
    }

    /// Serve the session until the peer disconnects or the handle shuts
    /// the host down.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                message = self.endpoint.recv() => {
                    match message {
                        Some(message) => {
                            if !self.handle_message(message) {
                                break;
                            }
                        }
                        None => {
                            debug!("client disconnected");
                            break;
                        }
                    }
                }
                command = self.control_rx.recv() => {
                    match command {
                        Some(ControlCommand::Shutdown) | None => break,
                    }
                }
            }
        }
    }

    /// Returns false once the outbound side is gone.
    fn handle_message(&mut self, message: ChannelMessage) -> bool {
        match message {
            ChannelMessage::Hello => self.send_welcome(),
            ChannelMessage::Call {
                object,
                method,
                args,
                call_id,
            } => {
                if object == ROOT_CHANNEL_NAME {
                    self.dispatch_root(&method, &args, call_id)
                } else {
                    self.dispatch_capability(&object, &method, &args, call_id)
                }
            }
            other => {
                debug!(?other, "ignoring unexpected message");
                true
            }
        }
    }

    fn send_welcome(&mut self) -> bool {
        let mut objects = vec![ROOT_CHANNEL_NAME.to_string()];
        objects.extend(self.capabilities.keys().cloned());
        let _ = self.notifications.send(HostNotification::ClientHello);
        self.endpoint
            .send(ChannelMessage::Welcome {
                objects,
                version: self.config.version.clone(),
                schema_json: self.config.schema_json.clone(),
                valid_event_types: self.config.valid_event_types.clone(),
            })
            .is_ok()
    }

    fn dispatch_root(&mut self, method: &str, args: &[Value], call_id: Option<u64>) -> bool {
        match method {
            "sendData" => {
                let payload = args.first().cloned().unwrap_or(Value::Null);
                let _ = self
                    .notifications
                    .send(HostNotification::DataReceived(payload));
            }
            "setOutput" => {
                let text = args
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let _ = self
                    .notifications
                    .send(HostNotification::OutputChanged(text));
            }
            "requestInput" => {
                let token = Uuid::new_v4().to_string();
                let _ = self.notifications.send(HostNotification::InputRequested {
                    token: token.clone(),
                });
                if let Some(call_id) = call_id {
                    return self
                        .endpoint
                        .send(ChannelMessage::CallResult {
                            call_id,
                            value: Value::String(token),
                        })
                        .is_ok();
                }
            }
            other => {
                warn!(method = other, "unknown root method");
            }
        }
        true
    }

    fn dispatch_capability(
        &mut self,
        object: &str,
        method: &str,
        args: &[Value],
        call_id: Option<u64>,
    ) -> bool {
        let Some(capability) = self.capabilities.get_mut(object) else {
            warn!(object, method, "call for unknown capability");
            return true;
        };
        let value = match capability.invoke(method, args) {
            Ok(value) => value,
            Err(error) => {
                // The client still gets its reply so the promise settles.
                warn!(object, method, %error, "capability call failed");
                Value::Null
            }
        };
        if let Some(call_id) = call_id {
            return self
                .endpoint
                .send(ChannelMessage::CallResult { call_id, value })
                .is_ok();
        }
        true
    }
}
