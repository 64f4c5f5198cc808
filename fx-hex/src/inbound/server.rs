//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use fx_types::FxRepository;

use super::handlers::{self, AppState};
use crate::FxService;

/// HTTP Server for the FX API.
pub struct HttpServer<R: FxRepository> {
    state: Arc<AppState<R>>,
}

impl<R: FxRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: FxService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/currencies", get(handlers::list_currencies))
            .route(
                "/api/quotes",
                post(handlers::create_quote::<R>).get(handlers::list_quotes::<R>),
            )
            .route("/api/payments", post(handlers::pay::<R>))
            .route("/api/transactions", get(handlers::list_transactions::<R>))
            .route(
                "/api/transactions/{id}",
                get(handlers::get_transaction::<R>),
            );

        #[cfg(feature = "admin-api")]
        let router = router.route(
            "/api/admin/transactions/{id}/status",
            axum::routing::put(handlers::set_transaction_status::<R>),
        );

        router
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
