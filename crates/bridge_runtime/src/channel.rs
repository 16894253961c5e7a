//! In-process transport
//!
//! A bridge session runs over a pair of connected endpoints. Senders are
//! cheap to clone, so signal emitters and handles can write without going
//! through the owning task.

use tokio::sync::mpsc;

use crate::error::BridgeError;
use crate::message::ChannelMessage;

/// One side of a bidirectional message link.
pub struct ChannelEndpoint {
    tx: mpsc::UnboundedSender<ChannelMessage>,
    rx: mpsc::UnboundedReceiver<ChannelMessage>,
}

impl ChannelEndpoint {
    /// Send a message to the peer.
    pub fn send(&self, message: ChannelMessage) -> Result<(), BridgeError> {
        self.tx
            .send(message)
            .map_err(|_| BridgeError::TransportClosed)
    }

    /// Receive the next message. `None` means the peer hung up.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        self.rx.recv().await
    }

    /// Clone of the outbound sender, for handles that outlive the endpoint.
    pub fn sender(&self) -> mpsc::UnboundedSender<ChannelMessage> {
        self.tx.clone()
    }

    pub fn split(
        self,
    ) -> (
        mpsc::UnboundedSender<ChannelMessage>,
        mpsc::UnboundedReceiver<ChannelMessage>,
    ) {
        (self.tx, self.rx)
    }
}

/// Create two connected endpoints, one for each side of the session.
pub fn channel_pair() -> (ChannelEndpoint, ChannelEndpoint) {
    let (a_tx, b_rx) = mpsc::unbounded_channel();
    let (b_tx, a_rx) = mpsc::unbounded_channel();
    (
        ChannelEndpoint { tx: a_tx, rx: a_rx },
        ChannelEndpoint { tx: b_tx, rx: b_rx },
    )
}
