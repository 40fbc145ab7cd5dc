use std::future::Future;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::commands;
use crate::session::SerialSession;

/// All HTTP endpoints of the control panel
pub fn router(session: Arc<SerialSession>) -> Router {
    Router::new()
        .route("/", get(commands::index))
        .route("/index.html", get(commands::index))
        .route("/status", get(commands::status))
        .route("/send", get(commands::send))
        .route("/ports", get(commands::ports))
        .route("/connect", get(commands::connect))
        .route("/disconnect", get(commands::disconnect))
        .fallback(not_found)
        .with_state(session)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Serve requests on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, session: Arc<SerialSession>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(session))
        .with_graceful_shutdown(shutdown)
        .await
}
