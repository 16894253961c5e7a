//! Bridge Runtime
//!
//! Asynchronous host/client runtime for the capability bridge. The host
//! side owns the registered capability objects and serves calls arriving
//! over a message endpoint; the client side performs the handshake, builds
//! typed proxies from the schema carried in the welcome message, and
//! correlates replies back to their callers.
//!
//! Transport is abstracted to a pair of in-process channel endpoints; both
//! sides only ever see [`message::ChannelMessage`] values.

pub mod capability;
pub mod channel;
pub mod client;
pub mod error;
pub mod events;
pub mod host;
pub mod input;
pub mod message;
pub mod proxy;

pub use capability::{CapabilityError, CapabilityObject, SignalEmitter};
pub use channel::{ChannelEndpoint, channel_pair};
pub use client::{BridgeNotification, BridgeRoot, ClientOptions, connect};
pub use error::{BridgeError, HostError};
pub use events::{EventHandler, SignalHandler};
pub use host::{BridgeHost, HostConfig, HostHandle, HostNotification};
pub use message::{CAPABILITY_CHANNEL_PREFIX, ChannelMessage, ROOT_CHANNEL_NAME};
pub use proxy::{CapabilityProxy, DeferredReply};
