//! HTTP server setup and connection handling.
//!
//! # Responsibilities
//! - Run the accept loop on a bounded listener
//! - Spawn one task per connection
//! - Read one request, dispatch it, write the response, close
//! - Drain in-flight connections on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{LimitsConfig, ServerConfig};
use crate::http::reader::{read_request, RequestError};
use crate::http::response::Response;
use crate::net::{ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::routing::Router;

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// HTTP server.
pub struct HttpServer {
    router: Arc<Router>,
    limits: Arc<LimitsConfig>,
    tracker: ConnectionTracker,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let router = Arc::new(Router::from_config(&config.files));
        let limits = Arc::new(config.limits.clone());

        if let Some(dir) = &config.files.serving_directory {
            tracing::info!(directory = %dir.display(), "File routes enabled");
        } else {
            tracing::info!("No serving directory configured; file routes disabled");
        }

        Self {
            router,
            limits,
            tracker: ConnectionTracker::new(),
            config,
        }
    }

    /// Run the server until `shutdown` fires, then drain open connections.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr, permit)) => {
                        let guard = self.tracker.track();
                        let span = tracing::info_span!(
                            "connection",
                            connection_id = %guard.id(),
                            peer_addr = %peer_addr
                        );
                        let router = Arc::clone(&self.router);
                        let limits = Arc::clone(&self.limits);

                        tokio::spawn(
                            async move {
                                let _permit = permit;
                                let _guard = guard;
                                if let Err(e) = handle_connection(stream, &router, &limits).await {
                                    tracing::warn!(error = %e, "Connection dropped");
                                }
                            }
                            .instrument(span),
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        let grace = Duration::from_secs(self.config.shutdown.grace_period_secs);
        if !self.tracker.wait_for_idle(grace).await {
            tracing::warn!(
                active_connections = self.tracker.active_count(),
                "Grace period elapsed with connections still open"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve a single request on `stream`, then close it.
pub async fn handle_connection<S>(
    mut stream: S,
    router: &Router,
    limits: &LimitsConfig,
) -> Result<(), std::io::Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let started = Instant::now();

    let response = match read_request(&mut stream, limits).await {
        Ok(Some(request)) => {
            let request_id = Uuid::new_v4();
            tracing::info!(
                request_id = %request_id,
                method = %request.method,
                path = %request.path,
                body_len = request.body.len(),
                "Request received"
            );

            let response = router.dispatch(&request).await;
            metrics::record_request(&request.method, response.status.code(), started);
            tracing::info!(
                request_id = %request_id,
                status = response.status.code(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Response ready"
            );
            response
        }
        Ok(None) => {
            tracing::debug!("Peer closed before sending a request");
            return Ok(());
        }
        Err(RequestError::Io(e)) => return Err(e),
        Err(e) => {
            let response = Response::new(e.status().unwrap_or_default());
            tracing::warn!(
                error = %e,
                status = response.status.code(),
                "Rejecting unreadable request"
            );
            metrics::record_rejected(e.reason());
            response
        }
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}
