//! Liveness and admin command endpoint.
//!
//! Runs as its own task next to the scheduler; polling does not depend on it.

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use commitwatch_core::error::CoreError;
use commitwatch_core::ports::NotificationTarget;
use commitwatch_core::tracking::{AddOutcome, RemoveOutcome};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::services::AppService;

pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,
            CoreError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.0.to_string())
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct AddRepositoryRequest {
    pub repository: String,
}

#[derive(Debug, Deserialize)]
pub struct SetTargetRequest {
    pub url: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn status(State(service): State<Arc<AppService>>) -> impl IntoResponse {
    Json(service.status().await)
}

async fn list_repositories(State(service): State<Arc<AppService>>) -> impl IntoResponse {
    Json(service.list_repositories().await)
}

async fn add_repository(
    State(service): State<Arc<AppService>>,
    Json(req): Json<AddRepositoryRequest>,
) -> Result<Response, ApiError> {
    let (id, outcome) = service.add_repository(&req.repository).await?;
    let response = match outcome {
        AddOutcome::Added => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "repository": id, "outcome": outcome })),
        )
            .into_response(),
        AddOutcome::AlreadyPresent => {
            error_response(StatusCode::CONFLICT, format!("{id} is already monitored"))
        }
    };
    Ok(response)
}

async fn remove_repository(
    State(service): State<Arc<AppService>>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (id, outcome) = service.remove_repository(&format!("{owner}/{name}")).await?;
    let response = match outcome {
        RemoveOutcome::Removed => {
            Json(serde_json::json!({ "repository": id, "outcome": outcome })).into_response()
        }
        RemoveOutcome::NotPresent => {
            error_response(StatusCode::NOT_FOUND, format!("{id} is not monitored"))
        }
        RemoveOutcome::Locked => error_response(
            StatusCode::FORBIDDEN,
            format!("{id} is a locked repository and cannot be removed"),
        ),
    };
    Ok(response)
}

async fn set_target(
    State(service): State<Arc<AppService>>,
    Json(req): Json<SetTargetRequest>,
) -> Response {
    if req.url.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "url must not be empty".to_string());
    }
    service
        .set_notification_target(NotificationTarget(req.url))
        .await;
    StatusCode::NO_CONTENT.into_response()
}

pub fn build_router(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/repos", get(list_repositories).post(add_repository))
        .route("/repos/{owner}/{name}", delete(remove_repository))
        .route("/target", put(set_target))
        .with_state(service)
}

/// Bind and serve until the listener fails.
pub async fn serve(bind: &str, service: Arc<AppService>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind HTTP endpoint on {bind}"))?;

    info!(addr = %bind, "http endpoint listening");
    axum::serve(listener, build_router(service))
        .await
        .context("HTTP endpoint failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::webhook::WebhookNotifier;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use commitwatch_core::domain::RepositoryId;
    use commitwatch_core::ports::{MemoryStateStore, Notifier, SystemClock};
    use commitwatch_core::tracking::Tracker;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        notifier: Arc<WebhookNotifier>,
    }

    fn harness() -> Harness {
        let locked = [RepositoryId::parse("org/core").unwrap()];
        let tracker = Tracker::open(Arc::new(MemoryStateStore::new()), &locked).unwrap();
        let notifier = Arc::new(WebhookNotifier::new(None, 5).unwrap());
        let service = AppService::new(
            Arc::new(Mutex::new(tracker)),
            notifier.clone(),
            Arc::new(SystemClock),
        );
        Harness {
            router: build_router(Arc::new(service)),
            notifier,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let h = harness();
        let (status, body) = send(&h.router, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_add_list_and_remove_repository() {
        let h = harness();

        let (status, body) = send(
            &h.router,
            json_request("POST", "/repos", serde_json::json!({ "repository": "me/tool" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["outcome"], "added");

        let (status, _) = send(
            &h.router,
            json_request("POST", "/repos", serde_json::json!({ "repository": "me/tool" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&h.router, Request::get("/repos").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "org/core");
        assert_eq!(body[0]["locked"], true);
        assert_eq!(body[1]["id"], "me/tool");
        assert_eq!(body[1]["locked"], false);

        let (status, body) = send(
            &h.router,
            Request::delete("/repos/me/tool").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "removed");

        let (status, _) = send(
            &h.router,
            Request::delete("/repos/me/tool").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_repository_is_bad_request() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            json_request("POST", "/repos", serde_json::json!({ "repository": "a/b/c" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("a/b/c"));
    }

    #[tokio::test]
    async fn test_locked_repository_cannot_be_removed() {
        let h = harness();
        let (status, _) = send(
            &h.router,
            Request::delete("/repos/org/core").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_set_target_makes_notifier_ready() {
        let h = harness();
        assert!(!h.notifier.destination_ready().await);

        let (status, _) = send(
            &h.router,
            json_request("PUT", "/target", serde_json::json!({ "url": "https://hooks.example/abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(h.notifier.destination_ready().await);
    }

    #[tokio::test]
    async fn test_status_reports_counts() {
        let h = harness();
        let (status, body) = send(&h.router, Request::get("/status").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["monitored"], 1);
        assert_eq!(body["locked"], 1);
        assert!(body["uptime"].as_str().unwrap().ends_with('s'));
    }
}
