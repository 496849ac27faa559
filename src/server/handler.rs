// src/server/handler.rs
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tower::Service;
use tracing::{debug, error};

use crate::config::ListenPrefix;
use crate::health::HealthCheckService;
use crate::server::response::HealthResponse;
use crate::shutdown::ShutdownSignal;

/// Turns one request into one JSON health response.
pub struct HealthResponder<S> {
    service: Arc<S>,
    prefix: Arc<ListenPrefix>,
    api_name: Arc<str>,
    api_version: Arc<str>,
    shutdown: ShutdownSignal,
}

// Manual impl so `S` itself need not be Clone.
impl<S> Clone for HealthResponder<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            prefix: self.prefix.clone(),
            api_name: self.api_name.clone(),
            api_version: self.api_version.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S: HealthCheckService> HealthResponder<S> {
    pub fn new(
        service: Arc<S>,
        prefix: ListenPrefix,
        api_name: &str,
        api_version: &str,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            service,
            prefix: Arc::new(prefix),
            api_name: Arc::from(api_name),
            api_version: Arc::from(api_version),
            shutdown,
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let path = req.uri().path();
        if !self.prefix.matches(path) {
            debug!(method = %req.method(), path, "request outside probe prefix");
            return empty(StatusCode::NOT_FOUND);
        }

        let start = Instant::now();
        let (status, payload) = match self.service.check_health(&self.shutdown).await {
            Ok(report) => (
                StatusCode::OK,
                HealthResponse::from_report(&report, &self.api_name, &self.api_version),
            ),
            Err(e) => {
                error!("Health evaluation failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    HealthResponse::failed(start.elapsed()),
                )
            }
        };

        match serde_json::to_vec(&payload) {
            Ok(bytes) => json(status, bytes),
            Err(e) => {
                error!("Failed to serialize health response: {}", e);
                empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn json(status: StatusCode, bytes: Vec<u8>) -> Response<Body> {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, no-cache"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    response
}

fn empty(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

impl<S> Service<Request<Body>> for HealthResponder<S>
where
    S: HealthCheckService + 'static,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let responder = self.clone();
        Box::pin(async move { Ok(responder.handle(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::error::HealthError;
    use crate::health::{HealthReport, HealthReportEntry, HealthStatus};
    use crate::shutdown;
    use async_trait::async_trait;
    use std::time::Duration;
    use tower::ServiceExt;

    struct StaticService(Result<HealthReport, HealthError>);

    #[async_trait]
    impl HealthCheckService for StaticService {
        async fn check_health(&self, _: &ShutdownSignal) -> Result<HealthReport, HealthError> {
            self.0.clone()
        }
    }

    fn responder(result: Result<HealthReport, HealthError>) -> HealthResponder<StaticService> {
        let (_trigger, signal) = shutdown::channel();
        let prefix = ProbeConfig::default().listen_prefix().unwrap();
        HealthResponder::new(
            Arc::new(StaticService(result)),
            prefix,
            "Sample API",
            "1.0.0",
            signal,
        )
    }

    fn request(method: &str, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthy_response_headers() {
        let report = HealthReport::from_entries(Vec::new(), Duration::ZERO);
        let response = responder(Ok(report)).handle(request("GET", "/health/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store, no-cache");

        let body = body_json(response).await;
        assert_eq!(body["Status"], "Healthy");
        assert_eq!(body["HealthChecks"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_any_method_under_prefix() {
        let report = HealthReport::from_entries(
            vec![(
                "db".to_string(),
                HealthReportEntry::new(HealthStatus::Unhealthy, Some("no connection".into())),
            )],
            Duration::ZERO,
        );
        let responder = responder(Ok(report));

        for (method, path) in [("POST", "/health/deep"), ("DELETE", "/health"), ("HEAD", "/health/")] {
            let response = responder.handle(request(method, path)).await;
            assert_eq!(response.status(), StatusCode::OK, "{} {}", method, path);
        }

        let body = body_json(responder.handle(request("PUT", "/health/x")).await).await;
        assert_eq!(body["Status"], "Unhealthy");
        assert_eq!(body["HealthChecks"][0]["Components"], "db");
        assert_eq!(body["HealthChecks"][0]["Description"], "no connection");
    }

    #[tokio::test]
    async fn test_outside_prefix_is_not_found() {
        let report = HealthReport::from_entries(Vec::new(), Duration::ZERO);
        let response = responder(Ok(report)).handle(request("GET", "/metrics")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_collaborator_failure_degrades_to_503() {
        let response = responder(Err(HealthError::Failed("boom".into())))
            .handle(request("GET", "/health/"))
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body = body_json(response).await;
        assert_eq!(body["Status"], "Unhealthy");
        assert_eq!(body["HealthChecks"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_tower_service_call() {
        let report = HealthReport::from_entries(Vec::new(), Duration::ZERO);
        let response = responder(Ok(report))
            .oneshot(request("GET", "/health/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
