//! Liveness endpoint.
//!
//! Free-tier hosts idle the process out unless something answers HTTP, so
//! the bot exposes a trivial "alive" probe. Unrelated to scheduler
//! correctness.

use axum::Router;
use axum::routing::get;
use tracing::info;

/// Builds the probe router.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/health", get(alive))
}

async fn alive() -> &'static str {
    "alive"
}

/// Serves the probe until the process exits.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server dies.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Liveness endpoint listening on port {}", port);
    axum::serve(listener, router()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_body() {
        assert_eq!(alive().await, "alive");
    }
}
