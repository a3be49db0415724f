use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use scheduling_cell::{scheduling_routes, SchedulingState};

pub fn create_router(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/scheduling", scheduling_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use shared_utils::test_utils::{TestClock, TestConfig};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = SchedulingState::new(
            &TestConfig::default().to_app_config(),
            TestClock::morning_of(2024, 1, 8),
        )
        .unwrap();
        create_router(Arc::new(state))
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Clinic scheduling API is running!");
    }

    #[tokio::test]
    async fn test_scheduling_routes_are_nested() {
        let request = Request::builder()
            .method("POST")
            .uri("/scheduling/slots")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "date": "2024-01-15" }).to_string()))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert!(value["total"].as_u64().unwrap() > 0);
    }
}
