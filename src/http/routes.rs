/// HTTP routes exposing the latest air quality summary
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::aggregator::SummaryHandle;
use crate::models::Summary;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Build the router serving summaries from `handle`
pub fn router(handle: SummaryHandle) -> Router {
    Router::new()
        .route("/", get(current_summary))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(handle)
}

/// Latest published summary, or the zero sentinel before the first window
pub async fn current_summary(State(handle): State<SummaryHandle>) -> Json<Summary> {
    Json(handle.current())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::models::{Reading, FIELD_COUNT};
    use time::macros::offset;

    #[tokio::test]
    async fn serves_sentinel_before_first_window() {
        let (_aggregator, handle) = Aggregator::new(2, offset!(+2));

        let Json(summary) = current_summary(State(handle)).await;
        let json = serde_json::to_value(summary).unwrap();

        assert_eq!(json["PM2.5 (standard)"], 0);
        assert!(json["last_updated"].is_null());
    }

    #[tokio::test]
    async fn serves_published_summary() {
        let (mut aggregator, handle) = Aggregator::new(1, offset!(+2));
        aggregator.ingest(Reading::from_words([17; FIELD_COUNT]));

        let Json(summary) = current_summary(State(handle)).await;
        let json = serde_json::to_value(summary).unwrap();

        assert_eq!(json["PM10 (environmental)"], 17);
        assert_eq!(json["5.0μm particles"], 17);
        let stamp = json["last_updated"].as_str().unwrap();
        assert_eq!(stamp.len(), "YYYY-MM-DD HH:MM".len());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(serde_json::to_value(body).unwrap()["status"], "ok");
    }

    #[test]
    fn router_builds() {
        let (_aggregator, handle) = Aggregator::new(1, offset!(UTC));
        let _app = router(handle);
    }
}
