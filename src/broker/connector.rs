use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::connection::{BrokerConnection, WsStream};
use crate::broker::message::{ClientMessage, ServerMessage};
use crate::config::BrokerSettings;
use crate::utils::error::{AttemptError, ConnectError};

/// Opens the broker connection, retrying with a fixed delay.
///
/// Tries `connect_attempts` times in total (at least once) and sleeps
/// `retry_delay_ms` between failures. Each attempt starts from scratch. The
/// caller decides what exhaustion means; this function never exits the
/// process.
pub async fn connect(settings: &BrokerSettings) -> Result<BrokerConnection, ConnectError> {
    let attempts = settings.connect_attempts.max(1);
    let mut attempt = 1;

    loop {
        match connect_once(settings).await {
            Ok(ws) => {
                info!(uri = %settings.uri, attempt, "connected to broker");
                return Ok(BrokerConnection::spawn(
                    ws,
                    &settings.uri,
                    settings.queue_capacity,
                    settings.publish_timeout(),
                ));
            }
            Err(last) if attempt >= attempts => {
                return Err(ConnectError::Exhausted {
                    uri: settings.uri.clone(),
                    attempts,
                    last,
                });
            }
            Err(e) => {
                warn!(
                    uri = %settings.uri,
                    attempt,
                    attempts,
                    error = %e,
                    "broker not reachable, retrying in {:?}",
                    settings.retry_delay()
                );
                tokio::time::sleep(settings.retry_delay()).await;
                attempt += 1;
            }
        }
    }
}

/// One independent attempt: TCP + WebSocket upgrade, then login when configured.
async fn connect_once(settings: &BrokerSettings) -> Result<WsStream, AttemptError> {
    let (mut ws, _response) = connect_async(settings.uri.as_str()).await?;

    if let Some((username, password)) = settings.credentials() {
        let timeout = settings.publish_timeout();
        match tokio::time::timeout(timeout, authenticate(&mut ws, username, password)).await {
            Ok(result) => result?,
            Err(_) => return Err(AttemptError::HandshakeTimeout(timeout)),
        }
    }

    Ok(ws)
}

/// PopSub order: login -> login_response -> auth -> authenticated.
async fn authenticate(
    ws: &mut WsStream,
    username: &str,
    password: &str,
) -> Result<(), AttemptError> {
    send(
        ws,
        &ClientMessage::Login {
            username: username.to_string(),
            password: password.to_string(),
        },
    )
    .await?;

    let token = match next_reply(ws).await? {
        ServerMessage::LoginResponse { token } => token,
        ServerMessage::Error { message } => return Err(AttemptError::Rejected(message)),
        other => return Err(AttemptError::UnexpectedReply(format!("{other:?}"))),
    };

    send(ws, &ClientMessage::Auth { token }).await?;

    match next_reply(ws).await? {
        ServerMessage::Authenticated {} => Ok(()),
        ServerMessage::Error { message } => Err(AttemptError::Rejected(message)),
        other => Err(AttemptError::UnexpectedReply(format!("{other:?}"))),
    }
}

async fn send(ws: &mut WsStream, msg: &ClientMessage) -> Result<(), AttemptError> {
    let text = serde_json::to_string(msg)?;
    ws.send(WsMessage::text(text)).await?;
    Ok(())
}

async fn next_reply(ws: &mut WsStream) -> Result<ServerMessage, AttemptError> {
    while let Some(frame) = ws.next().await {
        match frame? {
            WsMessage::Text(text) => {
                return serde_json::from_str(text.as_str())
                    .map_err(|_| AttemptError::UnexpectedReply(text.as_str().to_string()));
            }
            WsMessage::Close(_) => return Err(AttemptError::ClosedDuringHandshake),
            _ => {}
        }
    }
    Err(AttemptError::ClosedDuringHandshake)
}
