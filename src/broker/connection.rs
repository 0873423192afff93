//! Long-lived broker connection.
//!
//! The WebSocket sink is not shareable, so a single writer task owns it and
//! request handlers enqueue frames onto a bounded channel. A reader task
//! drains whatever the broker sends back and notices when it goes away.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::message::ServerMessage;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// State shared between the handle and its background tasks.
#[derive(Debug)]
struct Shared {
    uri: String,
    connected: AtomicBool,
    shutdown: Notify,
}

impl Shared {
    fn mark_disconnected(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            warn!(uri = %self.uri, "broker connection lost");
        }
        self.shutdown.notify_one();
    }
}

/// Handle to the single connection the process keeps open to the broker.
///
/// Cheap to share behind an `Arc`; publishing only needs `&self`.
#[derive(Debug)]
pub struct BrokerConnection {
    tx: mpsc::Sender<WsMessage>,
    shared: Arc<Shared>,
    writer: Mutex<Option<JoinHandle<()>>>,
    reader: JoinHandle<()>,
    send_timeout: Duration,
}

impl BrokerConnection {
    /// Splits an established stream and starts the writer and reader tasks.
    pub(crate) fn spawn(
        ws: WsStream,
        uri: &str,
        queue_capacity: usize,
        send_timeout: Duration,
    ) -> Self {
        let (sink, stream) = ws.split();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let shared = Arc::new(Shared {
            uri: uri.to_string(),
            connected: AtomicBool::new(true),
            shutdown: Notify::new(),
        });

        let writer = tokio::spawn(write_loop(sink, rx, shared.clone(), send_timeout));
        let reader = tokio::spawn(read_loop(stream, shared.clone()));

        Self {
            tx,
            shared,
            writer: Mutex::new(Some(writer)),
            reader,
            send_timeout,
        }
    }

    pub fn uri(&self) -> &str {
        &self.shared.uri
    }

    /// False once the broker dropped the connection or `close` was called.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn sender(&self) -> &mpsc::Sender<WsMessage> {
        &self.tx
    }

    /// Flushes queued frames, sends a close frame and stops the background tasks.
    pub async fn close(&self) {
        let writer = match self.writer.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(mut writer) = writer else {
            return;
        };

        self.shared.connected.store(false, Ordering::SeqCst);
        self.shared.shutdown.notify_one();

        // the drain and the close frame share one budget of two send timeouts
        let budget = self.send_timeout.saturating_mul(2);
        if tokio::time::timeout(budget, &mut writer).await.is_err() {
            warn!(uri = %self.shared.uri, ?budget, "broker writer did not stop in time, aborting");
            writer.abort();
        }
        self.reader.abort();
        info!(uri = %self.shared.uri, "broker connection closed");
    }
}

impl Drop for BrokerConnection {
    fn drop(&mut self) {
        self.reader.abort();
        self.shared.shutdown.notify_one();
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, WsMessage>,
    mut rx: mpsc::Receiver<WsMessage>,
    shared: Arc<Shared>,
    send_timeout: Duration,
) {
    loop {
        tokio::select! {
            biased;
            _ = shared.shutdown.notified() => break,
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                if !send_frame(&mut sink, frame, send_timeout, &shared.uri).await {
                    shared.mark_disconnected();
                    return;
                }
            }
        }
    }

    // Drain what handlers already queued before closing.
    rx.close();
    let mut drained = 0usize;
    while let Ok(frame) = rx.try_recv() {
        if !send_frame(&mut sink, frame, send_timeout, &shared.uri).await {
            break;
        }
        drained += 1;
    }
    if drained > 0 {
        debug!(uri = %shared.uri, drained, "flushed queued frames before close");
    }

    if let Ok(Err(e)) = tokio::time::timeout(send_timeout, sink.close()).await {
        debug!(uri = %shared.uri, error = %e, "error closing broker socket");
    }
    shared.connected.store(false, Ordering::SeqCst);
}

async fn send_frame(
    sink: &mut SplitSink<WsStream, WsMessage>,
    frame: WsMessage,
    send_timeout: Duration,
    uri: &str,
) -> bool {
    match tokio::time::timeout(send_timeout, sink.send(frame)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!(uri = %uri, error = %e, "failed to send frame to broker");
            false
        }
        Err(_) => {
            error!(uri = %uri, timeout = ?send_timeout, "sending to broker timed out");
            false
        }
    }
}

async fn read_loop(mut stream: SplitStream<WsStream>, shared: Arc<Shared>) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match serde_json::from_str::<ServerMessage>(text.as_str()) {
                Ok(ServerMessage::Error { message }) => {
                    warn!(uri = %shared.uri, %message, "broker reported an error");
                }
                Ok(other) => debug!(uri = %shared.uri, ?other, "ignoring broker frame"),
                Err(_) => debug!(uri = %shared.uri, "ignoring unrecognised broker frame"),
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(uri = %shared.uri, error = %e, "error reading from broker");
                break;
            }
        }
    }
    shared.mark_disconnected();
}
