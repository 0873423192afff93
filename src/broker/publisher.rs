use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::connection::BrokerConnection;
use crate::broker::message::ClientMessage;
use crate::utils::error::PublishError;

/// Topic every validated message is published under.
pub const MESSAGE_TOPIC: &str = "message";

/// Fire-and-forget publishing.
///
/// Implementations must not wait for the broker: `Ok` means the message was
/// handed off, not delivered. Safe to call from many tasks at once.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

impl Publisher for BrokerConnection {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if !self.is_connected() {
            return Err(PublishError::Disconnected);
        }

        let payload = std::str::from_utf8(payload).map_err(|_| PublishError::InvalidPayload)?;
        let message_id = Uuid::new_v4().to_string();
        let frame = ClientMessage::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
            message_id: Some(message_id.clone()),
            qos: Some(0),
        };
        let text = serde_json::to_string(&frame).map_err(|_| PublishError::InvalidPayload)?;

        match self.sender().try_send(WsMessage::text(text)) {
            Ok(()) => {
                debug!(topic, %message_id, "queued publish");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(PublishError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(PublishError::Disconnected),
        }
    }
}
