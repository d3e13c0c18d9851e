//! HTTP server implementation using Axum.

use crate::handlers::{dashboard, handle_health, handle_root, instruments};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use irrbb_core::IrrbbApi;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers.
pub struct AppState {
    pub api: IrrbbApi,
}

/// CORS for the dashboard frontends.
///
/// Credentials are allowed, so origins are listed explicitly and request
/// headers are mirrored rather than wildcarded. A `*` entry cannot be
/// combined with credentials and is skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter_map(|origin| {
            if origin == "*" {
                warn!("Ignoring wildcard CORS origin; list origins explicitly");
                return None;
            }
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the REST router.
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let api_v1 = Router::new()
        .route(
            "/loans",
            get(instruments::list_loans).post(instruments::create_loan),
        )
        .route("/loans/:id", get(instruments::get_loan))
        .route(
            "/deposits",
            get(instruments::list_deposits).post(instruments::create_deposit),
        )
        .route("/deposits/:id", get(instruments::get_deposit))
        .route("/dashboard/live-data", get(dashboard::live_data))
        .route(
            "/dashboard/portfolio-composition",
            get(dashboard::portfolio_composition),
        )
        .route("/dashboard/snapshots", post(dashboard::record_snapshot))
        .route("/dashboard/metrics", get(dashboard::list_metrics));

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .nest("/api/v1", api_v1)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
///
/// Returns the bound address (useful when port=0) and the serving task.
pub async fn start_server<F>(
    api: IrrbbApi,
    host: &str,
    port: u16,
    allowed_origins: &[String],
    shutdown: F,
) -> anyhow::Result<(SocketAddr, JoinHandle<std::io::Result<()>>)>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState { api });
    let app = build_router(state, allowed_origins);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    });

    Ok((actual_addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_server_starts_and_stops() {
        let api = IrrbbApi::connect("sqlite::memory:").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let (addr, handle) = start_server(api, "127.0.0.1", 0, &[], async move {
            let _ = rx.await;
        })
        .await
        .unwrap();
        assert!(addr.port() > 0);

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_port_in_use_fails() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let api = IrrbbApi::connect("sqlite::memory:").await.unwrap();

        let result = start_server(api, "127.0.0.1", port, &[], std::future::pending()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wildcard_origin_is_skipped() {
        let api = IrrbbApi::connect("sqlite::memory:").await.unwrap();
        let origins = vec!["*".to_string(), "http://localhost:3000".to_string()];
        let router = build_router(Arc::new(AppState { api }), &origins);

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/v1/loans")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
    }
}
