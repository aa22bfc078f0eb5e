//! HTTP server for the dashboard UI
//!
//! Serves the browser-facing API: the reconciled company grid, evidence
//! lookups, corrections, PDF uploads, exports, and the archive drawer. The
//! UI itself is the React frontend; CORS is open for local development.

pub mod handlers;

use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Batch uploads carry several multi-megabyte PDFs
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Dashboard API server manager
pub struct DashboardServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl DashboardServer {
    /// Create a new server
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
        }
    }

    /// Bind and start serving; returns the bound address
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", self.state.config.host, self.state.config.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))?;

        // Allow all origins for the local React dev server
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            // Health check
            .route("/health", get(handlers::health_check))
            .route("/", get(handlers::health_check))
            // Company grid
            .route("/app/rows", get(handlers::get_rows))
            .route("/app/refresh", post(handlers::refresh))
            .route("/app/evidence/:symbol", get(handlers::get_evidence))
            .route("/app/corrections", post(handlers::submit_correction))
            .route("/app/export", get(handlers::export_dashboard))
            // PDF-extraction table
            .route("/app/extractions", get(handlers::get_extractions))
            .route("/app/extractions/upload", post(handlers::upload_extractions))
            .route(
                "/app/extractions/corrections",
                post(handlers::submit_extraction_correction),
            )
            .route("/app/extractions/clear", post(handlers::clear_extractions))
            .route("/app/extractions/export", get(handlers::export_extractions))
            .route(
                "/app/extractions/:filename",
                delete(handlers::delete_extraction),
            )
            // Archive drawer
            .route("/app/archive/snapshots", get(handlers::get_snapshots))
            .route("/app/archive/exports", get(handlers::get_user_exports))
            .route(
                "/app/archive/exports/:filename",
                delete(handlers::delete_user_export),
            )
            .with_state(self.state.clone())
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .layer(cors)
            .layer(TraceLayer::new_for_http());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Dashboard API shutting down");
            });

            if let Err(e) = server.await {
                error!("Dashboard API error: {}", e);
            }
        });

        info!("Dashboard API listening on http://{}", bound);
        Ok(bound)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Dashboard API stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for DashboardServer {
    fn drop(&mut self) {
        self.stop();
    }
}
