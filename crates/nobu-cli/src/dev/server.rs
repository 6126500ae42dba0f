//! HTTP adapter around [`nobu::DevHandler`].
//!
//! Every request goes through one fallback route. The handler's result is
//! mapped to a status and body here; no request failure stops the server.

use crate::dev::DevConfig;
use crate::error::{CliError, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use nobu::{DevHandler, RequestDescriptor};
use std::future::Future;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Content type of error bodies.
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Development server.
pub struct DevServer {
    /// Server configuration
    config: DevConfig,
    /// Request handler shared by all connections
    handler: Arc<DevHandler>,
}

impl DevServer {
    /// Create a server answering requests with a handler built from `config`.
    pub fn new(config: DevConfig) -> Self {
        let handler = Arc::new(DevHandler::new(config.base.to_handler_options()));
        Self { config, handler }
    }

    /// Start the development server and run until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns error if server cannot bind to configured address
    pub async fn start<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.addr;
        let server_url = self.config.server_url();

        let app = build_router(self.handler);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        crate::ui::success(&format!("Development server running at {}", server_url));

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Build the axum router.
///
/// Routing happens inside [`DevHandler`], so the router is a single
/// fallback with permissive CORS and request tracing. Only `GET` and
/// `HEAD` are served.
pub fn build_router(handler: Arc<DevHandler>) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn handle_request(
    State(handler): State<Arc<DevHandler>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [
                (header::ALLOW, "GET, HEAD"),
                (header::CONTENT_TYPE, PLAIN_TEXT),
            ],
            format!("Method {} not allowed", method),
        )
            .into_response();
    }

    let request = RequestDescriptor::from_uri_parts(uri.path(), uri.query());

    match handler.handle(&request).await {
        Ok(response) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, response.content_type),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from(response.body),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

/// Map a request failure to its status with the message as body.
fn error_response(err: &nobu::Error) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [
            (header::CONTENT_TYPE, PLAIN_TEXT),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        err.to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let response = error_response(&nobu::Error::UnroutableRequest("/x.txt".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], PLAIN_TEXT);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let response = error_response(&nobu::Error::UnknownSectionType("script".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
