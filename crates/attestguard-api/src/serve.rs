// crates/attestguard-api/src/serve.rs
// ============================================================================
// Module: HTTP Server Bootstrap
// Description: Binds and serves the C10 router over plain TCP.
// Purpose: Give the CLI one `serve` call instead of hand-rolling the listener.
// Dependencies: axum, axum-server, tokio
// Grounded on: decision-gate-mcp::server::serve_http's
//              bind-listener/axum::serve shape (TLS branch dropped: C10's
//              HTTP surface sits behind a reverse proxy, per spec.md §6).
// ============================================================================

use std::net::SocketAddr;

use axum::Router;

use crate::error::ApiError;

/// Binds `addr` and serves `router` until the process is signalled to stop.
///
/// # Errors
///
/// Returns [`ApiError::Unavailable`] when the address cannot be bound or the
/// server loop exits with an I/O error.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<(), ApiError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Unavailable(format!("http bind failed: {err}")))?;
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|err| ApiError::Unavailable(format!("http server failed: {err}")))
}
