//! Lookup API Server
//!
//! HTTP API exposing single and batched IP geolocation lookups.

use crate::application::{BatchResolver, ResolutionService};
use crate::domain::entities::GeoRecord;
use crate::domain::errors::LookupError;
use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Path, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{Level, Span};

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "geoip-api";

/// Batch lookup request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchRequest {
    pub ips: Vec<String>,
}

/// Health response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
}

/// Error body for request-level failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn bad_request(message: impl Into<String>) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.into(),
            }),
        )
            .into_response()
    }
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub resolver: Arc<ResolutionService>,
    pub batch: Arc<BatchResolver>,
}

impl ApiState {
    pub fn new(resolver: Arc<ResolutionService>) -> Self {
        let batch = Arc::new(BatchResolver::new(resolver.clone()));
        Self { resolver, batch }
    }
}

/// Build the API router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/lookup", get(missing_ip_handler))
        .route("/lookup/", get(missing_ip_handler))
        .route("/lookup/:ip", get(lookup_handler))
        .route("/batch", post(batch_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

/// One INFO span per request; the response event inside it adds status and latency.
fn request_span(request: &Request<Body>) -> Span {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        remote_addr = %remote_addr,
        user_agent = %user_agent,
    )
}

/// API Server for geolocation lookups.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, resolver: Arc<ResolutionService>) -> Self {
        Self {
            listen_addr,
            state: ApiState::new(resolver),
        }
    }

    /// Run the API server until `shutdown` completes.
    pub async fn run<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("GeoIP API listening on {}", self.listen_addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("GeoIP API stopped");
        Ok(())
    }
}

// Handler functions

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.to_string(),
    })
}

async fn missing_ip_handler() -> Response {
    ErrorResponse::bad_request("Missing IP address")
}

async fn lookup_handler(State(state): State<ApiState>, Path(ip): Path<String>) -> Response {
    if ip.is_empty() {
        return ErrorResponse::bad_request("Missing IP address");
    }

    match state.resolver.resolve(&ip).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => {
            let status = match e {
                LookupError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                LookupError::NotFound | LookupError::Dataset(_) => StatusCode::NOT_FOUND,
            };
            (status, Json(GeoRecord::failed(&ip, &e))).into_response()
        }
    }
}

async fn batch_handler(State(state): State<ApiState>, body: Bytes) -> Response {
    // Parsed by hand so every malformed body maps to 400, whatever its content type
    let request: BatchRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("rejected batch body: {}", e);
            return ErrorResponse::bad_request("Invalid JSON");
        }
    };

    match state.batch.resolve_batch(&request.ips).await {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => ErrorResponse::bad_request(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LocationData;
    use crate::domain::errors::{CacheError, DatasetError};
    use crate::domain::ports::{CacheBackend, GeoDataset};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use std::collections::{BTreeMap, HashMap};
    use std::net::IpAddr;
    use std::time::Duration;
    use tower::ServiceExt;

    // ===== Mock Implementations =====

    struct StaticDataset;

    impl GeoDataset for StaticDataset {
        fn lookup(&self, ip: IpAddr) -> Result<LocationData, DatasetError> {
            match ip.to_string().as_str() {
                "8.8.8.8" => Ok(LocationData {
                    country_names: BTreeMap::from([(
                        "en".to_string(),
                        "United States".to_string(),
                    )]),
                    country_iso_code: Some("US".to_string()),
                    time_zone: Some("America/Chicago".to_string()),
                    latitude: Some(37.751),
                    longitude: Some(-97.822),
                    accuracy_radius: Some(1000),
                    ..Default::default()
                }),
                "198.51.100.1" => Err(DatasetError::Read("bad pointer".to_string())),
                _ => Err(DatasetError::NotFound),
            }
        }
    }

    struct NoCache;

    #[async_trait]
    impl CacheBackend for NoCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "none"
        }
    }

    // ===== Test Helpers =====

    fn create_test_app() -> Router {
        let resolver = Arc::new(ResolutionService::new(Arc::new(StaticDataset), Arc::new(NoCache)));
        router(ApiState::new(resolver))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn batch_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/batch")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    // ===== Health Tests =====

    #[tokio::test]
    async fn test_health_handler() {
        let (status, body) = send(create_test_app(), get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "geoip-api");
        assert!(body["timestamp"].is_string());
    }

    // ===== Lookup Tests =====

    #[tokio::test]
    async fn test_lookup_success() {
        let (status, body) = send(create_test_app(), get_request("/lookup/8.8.8.8")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ip"], "8.8.8.8");
        assert_eq!(body["country"], "United States");
        assert_eq!(body["country_iso"], "US");
        assert_eq!(body["accuracy_radius"], 1000);
        assert!(body.get("city").is_none());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let (status, body) = send(create_test_app(), get_request("/lookup/10.0.0.1")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ip"], "10.0.0.1");
        assert_eq!(body["error"], "IP address not found in database");
    }

    #[tokio::test]
    async fn test_lookup_dataset_error_is_not_found() {
        let (status, body) = send(create_test_app(), get_request("/lookup/198.51.100.1")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ip"], "198.51.100.1");
        assert!(body["error"].as_str().unwrap().contains("bad pointer"));
    }

    #[tokio::test]
    async fn test_lookup_invalid_ip() {
        let (status, body) = send(create_test_app(), get_request("/lookup/not-an-ip")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ip"], "not-an-ip");
        assert_eq!(body["error"], "invalid IP address: not-an-ip");
    }

    #[tokio::test]
    async fn test_lookup_missing_ip() {
        for uri in ["/lookup", "/lookup/"] {
            let (status, body) = send(create_test_app(), get_request(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
            assert_eq!(body["error"], "Missing IP address");
        }
    }

    #[tokio::test]
    async fn test_lookup_ipv6() {
        let (status, body) = send(create_test_app(), get_request("/lookup/2001:db8::1")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ip"], "2001:db8::1");
    }

    // ===== Batch Tests =====

    #[tokio::test]
    async fn test_batch_mixed() {
        let body = serde_json::json!({ "ips": ["8.8.8.8", "10.0.0.1", "bogus"] });
        let (status, body) = send(create_test_app(), batch_request(body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        let results: HashMap<String, GeoRecord> = serde_json::from_value(body).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results["8.8.8.8"].country_iso.as_deref(), Some("US"));
        assert!(results["10.0.0.1"].is_error());
        assert!(results["bogus"].is_error());
    }

    #[tokio::test]
    async fn test_batch_invalid_json() {
        let (status, body) = send(create_test_app(), batch_request("{\"ips\": [")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON");
    }

    #[tokio::test]
    async fn test_batch_wrong_shape() {
        let (status, body) = send(create_test_app(), batch_request("{\"ips\": \"8.8.8.8\"}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON");
    }

    #[tokio::test]
    async fn test_batch_without_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/batch")
            .body(Body::from("{\"ips\": [\"8.8.8.8\"]}"))
            .unwrap();

        let (status, body) = send(create_test_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["8.8.8.8"]["country_iso"], "US");
    }

    #[tokio::test]
    async fn test_batch_empty_list() {
        let (status, body) = send(create_test_app(), batch_request("{\"ips\": []}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No IP addresses provided");
    }

    #[tokio::test]
    async fn test_batch_too_large() {
        let ips: Vec<String> = (0..101).map(|i| format!("10.0.0.{}", i)).collect();
        let body = serde_json::to_string(&BatchRequest { ips }).unwrap();

        let (status, body) = send(create_test_app(), batch_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Batch size too large (max 100 IPs)");
    }

    #[tokio::test]
    async fn test_batch_wrong_method() {
        let response = create_test_app()
            .oneshot(get_request("/batch"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    // ===== Server Tests =====

    #[test]
    fn test_api_server_new() {
        let resolver = Arc::new(ResolutionService::new(Arc::new(StaticDataset), Arc::new(NoCache)));
        let server = ApiServer::new("0.0.0.0:8080".to_string(), resolver);
        assert_eq!(server.listen_addr, "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_api_server_run_and_shutdown() {
        let resolver = Arc::new(ResolutionService::new(Arc::new(StaticDataset), Arc::new(NoCache)));
        let server = ApiServer::new("127.0.0.1:0".to_string(), resolver);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server.run(async {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }

    // ===== Request Logging Tests =====

    #[test]
    fn test_request_span_is_info_with_request_fields() {
        let request = Request::builder()
            .uri("/lookup/8.8.8.8")
            .header("user-agent", "curl/8.5.0")
            .body(Body::empty())
            .unwrap();

        let span = tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            request_span(&request)
        });
        let meta = span.metadata().unwrap();

        assert_eq!(meta.name(), "request");
        assert_eq!(*meta.level(), Level::INFO);
        for field in ["method", "path", "remote_addr", "user_agent"] {
            assert!(meta.fields().field(field).is_some(), "missing field {}", field);
        }
    }
}
