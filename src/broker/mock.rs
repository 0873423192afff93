//! In-process stand-in for a PopSub broker, used by tests.
//!
//! Accepts WebSocket connections, answers the login/auth handshake and
//! forwards every other text frame it receives onto a channel.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tungstenite::protocol::Message as WsMessage;

pub(crate) const USERNAME: &str = "admin";
pub(crate) const PASSWORD: &str = "password";
const TOKEN: &str = "mock-token";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Behavior {
    /// Drop every connection right after the WebSocket upgrade.
    pub close_after_accept: bool,
    /// Upgrade, then never read again so the client's writes back up.
    pub never_read: bool,
}

pub(crate) struct MockBroker {
    pub url: String,
    pub received: mpsc::UnboundedReceiver<Value>,
}

pub(crate) async fn start(behavior: Behavior) -> MockBroker {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(serve(listener, tx, behavior));
    MockBroker {
        url: format!("ws://{addr}"),
        received: rx,
    }
}

/// Binds `addr` and serves the mock on it. Used for late-starting brokers.
pub(crate) async fn start_on(addr: &str) -> mpsc::UnboundedReceiver<Value> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(serve(listener, tx, Behavior::default()));
    rx
}

/// A `ws://` address nothing is listening on.
pub(crate) async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}")
}

async fn serve(listener: TcpListener, tx: mpsc::UnboundedSender<Value>, behavior: Behavior) {
    while let Ok((stream, _)) = listener.accept().await {
        let tx = tx.clone();
        tokio::spawn(async move {
            let Ok(mut ws) = accept_async(stream).await else {
                return;
            };
            if behavior.close_after_accept {
                let _ = ws.close(None).await;
                return;
            }
            if behavior.never_read {
                let _held = ws;
                std::future::pending::<()>().await;
                return;
            }

            while let Some(Ok(msg)) = ws.next().await {
                let WsMessage::Text(text) = msg else { continue };
                let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                    continue;
                };
                let reply = match value["type"].as_str() {
                    Some("login") => {
                        if value["username"] == USERNAME && value["password"] == PASSWORD {
                            json!({"type": "login_response", "token": TOKEN})
                        } else {
                            json!({"type": "error", "message": "invalid credentials"})
                        }
                    }
                    Some("auth") if value["token"] == TOKEN => json!({"type": "authenticated"}),
                    Some("auth") => json!({"type": "error", "message": "authentication failed"}),
                    _ => {
                        let _ = tx.send(value);
                        continue;
                    }
                };
                if ws.send(WsMessage::text(reply.to_string())).await.is_err() {
                    break;
                }
            }
        });
    }
}
