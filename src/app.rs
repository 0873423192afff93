//! Process startup, in the order that guarantees the broker connection exists
//! before the first request can arrive: compile the schema, connect to the
//! broker, then bind the listener.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::broker::{self, BrokerConnection};
use crate::config::Settings;
use crate::schema::MessageValidator;
use crate::transport::{AppState, VERSION_BANNER, create_router};
use crate::utils::error::{ConnectError, SchemaError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Broker(#[from] ConnectError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// A bound listener plus everything it serves.
pub struct Server {
    listener: TcpListener,
    router: Router,
    connection: Arc<BrokerConnection>,
}

/// Runs every startup phase; any failure means no listener was ever bound.
pub async fn start(settings: &Settings) -> Result<Server, StartupError> {
    let validator = MessageValidator::new()?;
    let connection = Arc::new(broker::connect(&settings.broker).await?);

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let state = Arc::new(AppState::new(validator, connection.clone()));
    let router = create_router(state, &settings.http);

    Ok(Server {
        listener,
        router,
        connection,
    })
}

impl Server {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until `shutdown` resolves, then closes the broker connection.
    pub async fn serve<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listener.local_addr()?;
        info!(%addr, broker = %self.connection.uri(), "{VERSION_BANNER} listening");

        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        self.connection.close().await;
        result
    }
}
