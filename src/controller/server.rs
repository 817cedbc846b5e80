//! Controller server

use crate::common::{Config, Error, Result};
use crate::controller::http::{create_router, ControllerState};
use crate::controller::snapshot::SnapshotFile;
use crate::controller::store::Store;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Controller {
    config: Config,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the store, loading the snapshot when persistence is enabled.
    pub async fn open_store(&self) -> Store {
        let snapshot = self.config.snapshot_path().map(SnapshotFile::new);
        Store::open(snapshot, self.config.poll_interval()).await
    }

    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.bind_addr;
        TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Pending blocking reads are not drained on shutdown; they may never
    /// complete, and every accepted write is already on disk.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let local_addr: SocketAddr = listener.local_addr()?;
        tracing::info!("Starting controller");
        tracing::info!("  HTTP API: {}", local_addr);
        match self.config.snapshot_path() {
            Some(path) => tracing::info!("  Snapshot: {}", path.display()),
            None => tracing::info!("  Snapshot: disabled (ephemeral)"),
        }
        tracing::info!("  Poll interval: {:?}", self.config.poll_interval());

        let store = Arc::new(self.open_store().await);
        let router = create_router(ControllerState::new(store.clone()));
        let server = axum::serve(listener, router).into_future();

        tracing::info!("✓ Controller ready ({} keys)", store.len().await);

        tokio::select! {
            res = server => {
                if let Err(e) = res {
                    tracing::error!("HTTP server error: {}", e);
                    return Err(e.into());
                }
            }
            _ = shutdown => {
                tracing::info!("Shutting down controller");
            }
        }

        Ok(())
    }
}

/// Resolves on the first SIGINT (Ctrl-C) or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
