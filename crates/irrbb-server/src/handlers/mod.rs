//! REST request handlers, split by domain.

pub mod dashboard;
pub mod instruments;

use crate::server::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use irrbb_core::IrrbbError;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

// ============================================================================
// Error responses
// ============================================================================

/// Error returned by handlers, rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<IrrbbError> for ApiError {
    fn from(err: IrrbbError) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", err);
        }
        Self {
            status,
            detail: err.detail(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ============================================================================
// Service endpoints
// ============================================================================

/// Root endpoint, doubles as the platform health check.
pub async fn handle_root() -> impl IntoResponse {
    Json(json!({
        "message": "IRRBB Backend is running! Access /api/v1 for the REST API."
    }))
}

/// Readiness check; runs a trivial query against the store.
pub async fn handle_health(State(state): State<Arc<AppState>>) -> Response {
    let backend = state.api.store().backend_name();
    match state.api.check_database().await {
        Ok(()) => Json(json!({"status": "ok", "database": backend})).into_response(),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "database": backend, "detail": e.detail()})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::server::{build_router, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use irrbb_core::IrrbbApi;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    pub async fn test_router() -> Router {
        let api = IrrbbApi::connect("sqlite::memory:").await.unwrap();
        build_router(
            Arc::new(AppState { api }),
            &["http://localhost:3000".to_string()],
        )
    }

    pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
        send(router, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(router, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{get, send, test_router};
    use super::*;
    use crate::server::build_router;
    use axum::body::Body;
    use axum::http::Request;
    use irrbb_core::models::{DashboardMetric, NewDashboardMetric, SnapshotRecords};
    use irrbb_core::{Deposit, DepositTerms, InstrumentStore, IrrbbApi, Loan, LoanTerms};

    #[tokio::test]
    async fn test_root_and_health() {
        let router = test_router().await;

        let (status, body) = get(&router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("running"));

        let (status, body) = get(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "sqlite");
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let not_found = ApiError::from(IrrbbError::NotFound { kind: "Loan", id: 3 });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = ApiError::from(IrrbbError::Conflict {
            message: "dup".into(),
        });
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let internal = ApiError::from(IrrbbError::Other("boom".into()));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let router = test_router().await;
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/v1/loans")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = tower::ServiceExt::oneshot(router, request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            headers.get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    /// Store whose database is unreachable.
    struct DownStore;

    fn down<T>() -> irrbb_core::Result<T> {
        Err(IrrbbError::Other("connection closed".into()))
    }

    #[async_trait::async_trait]
    impl InstrumentStore for DownStore {
        fn backend_name(&self) -> &'static str {
            "postgres"
        }
        async fn ping(&self) -> irrbb_core::Result<()> {
            down()
        }
        async fn count_loans(&self) -> irrbb_core::Result<usize> {
            down()
        }
        async fn get_loan(&self, _id: i64) -> irrbb_core::Result<Option<Loan>> {
            down()
        }
        async fn list_loans(&self, _skip: u32, _limit: u32) -> irrbb_core::Result<Vec<Loan>> {
            down()
        }
        async fn all_loans(&self) -> irrbb_core::Result<Vec<Loan>> {
            down()
        }
        async fn create_loan(&self, _terms: &LoanTerms) -> irrbb_core::Result<Loan> {
            down()
        }
        async fn insert_loans(&self, _loans: &[LoanTerms]) -> irrbb_core::Result<usize> {
            down()
        }
        async fn count_deposits(&self) -> irrbb_core::Result<usize> {
            down()
        }
        async fn get_deposit(&self, _id: i64) -> irrbb_core::Result<Option<Deposit>> {
            down()
        }
        async fn list_deposits(
            &self,
            _skip: u32,
            _limit: u32,
        ) -> irrbb_core::Result<Vec<Deposit>> {
            down()
        }
        async fn all_deposits(&self) -> irrbb_core::Result<Vec<Deposit>> {
            down()
        }
        async fn create_deposit(&self, _terms: &DepositTerms) -> irrbb_core::Result<Deposit> {
            down()
        }
        async fn insert_deposits(&self, _deposits: &[DepositTerms]) -> irrbb_core::Result<usize> {
            down()
        }
        async fn scale_deposit_balances(&self, _factor: f64) -> irrbb_core::Result<usize> {
            down()
        }
        async fn list_dashboard_metrics(
            &self,
            _limit: u32,
        ) -> irrbb_core::Result<Vec<DashboardMetric>> {
            down()
        }
        async fn save_snapshot(
            &self,
            _metric: &NewDashboardMetric,
            _records: &SnapshotRecords,
        ) -> irrbb_core::Result<DashboardMetric> {
            down()
        }
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_database() {
        let api = IrrbbApi::new(Arc::new(DownStore));
        let router = build_router(Arc::new(AppState { api }), &[]);

        let (status, body) = get(&router, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");

        // Liveness stays up so the platform can still reach the process
        let (status, _) = get(&router, "/").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(&router, "/api/v1/loans").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "connection closed");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let router = test_router().await;
        let (status, _) = send(
            &router,
            Request::get("/api/v1/nope").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
