//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. Layers: CORS (outermost) then request
//! tracing.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router with all endpoints under `/api/`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/hospitals", get(endpoints::hospitals::list))
        .route(
            "/queue",
            get(endpoints::queue::list).post(endpoints::queue::register),
        )
        .route("/queue/status", get(endpoints::queue::status))
        .route(
            "/queue/position/:patient_id",
            get(endpoints::queue::position),
        )
        .route("/queue/:id/status", post(endpoints::queue::update_status))
        .route("/predict-wait-time", post(endpoints::predictions::predict))
        .route(
            "/emergency-triage",
            get(endpoints::triage::overview).post(endpoints::triage::assess),
        )
        .route(
            "/emergency-recommendations",
            get(endpoints::triage::recommendations),
        )
        .route(
            "/optimize-allocation",
            post(endpoints::allocation::optimize),
        )
        .route(
            "/realtime/queue-updates",
            get(endpoints::realtime::queue_updates),
        )
        .route(
            "/realtime/emergency-alerts",
            get(endpoints::realtime::emergency_alerts),
        )
        .with_state(ctx);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::api::types::local_now;
    use crate::db::seed::{demo_store, CITY_GENERAL, GENERAL_MEDICINE, METRO_EMERGENCY};
    use crate::models::{PriorityLevel, QueueFilter};
    use crate::service::QueueService;

    fn test_core_state() -> Arc<CoreState> {
        let store = demo_store(local_now()).unwrap();
        Arc::new(CoreState::new(QueueService::new(Arc::new(store))))
    }

    fn entry_id(core: &CoreState, priority: PriorityLevel) -> Uuid {
        core.service()
            .queue(&QueueFilter::hospital(CITY_GENERAL))
            .unwrap()
            .into_iter()
            .find(|v| v.entry.priority_level == priority)
            .unwrap()
            .entry
            .id
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_enrichment_disabled() {
        let app = api_router(test_core_state());
        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["enrichment"], "disabled");
        assert_eq!(json["monitor_running"], false);
    }

    #[tokio::test]
    async fn hospitals_include_departments() {
        let app = api_router(test_core_state());
        let response = app.oneshot(get("/api/hospitals")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let hospitals = json["hospitals"].as_array().unwrap();
        assert_eq!(hospitals.len(), 2);
        let city = hospitals
            .iter()
            .find(|h| h["id"] == CITY_GENERAL.to_string())
            .unwrap();
        assert_eq!(city["departments"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn queue_lists_waiting_entries_in_service_order() {
        let app = api_router(test_core_state());
        let uri = format!("/api/queue?hospital_id={CITY_GENERAL}");
        let response = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total"], 3);
        assert_eq!(json["queue"][0]["priority_level"], 1);
        assert_eq!(json["queue"][0]["patient"]["name"], "John Smith");
    }

    #[tokio::test]
    async fn register_then_look_up_position() {
        let core = test_core_state();
        let body = serde_json::json!({
            "name": "Ana Lima",
            "age": 29,
            "symptoms": "persistent cough",
            "priority_level": 3,
            "hospital_id": CITY_GENERAL,
            "department_id": GENERAL_MEDICINE,
        });
        let response = api_router(core.clone())
            .oneshot(post_json("/api/queue", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        let patient_id = json["patient"]["id"].as_str().unwrap().to_string();
        assert!(json["prediction"]["estimated_wait_time"].as_u64().is_some());

        let response = api_router(core)
            .oneshot(get(&format!("/api/queue/position/{patient_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        // Maria Garcia (same priority, earlier) is ahead.
        assert_eq!(json["position"], 2);
    }

    #[tokio::test]
    async fn register_rejects_blank_name_and_bad_priority() {
        let core = test_core_state();
        let blank = serde_json::json!({
            "name": " ",
            "symptoms": "cough",
            "priority_level": 3,
            "hospital_id": CITY_GENERAL,
            "department_id": GENERAL_MEDICINE,
        });
        let response = api_router(core.clone())
            .oneshot(post_json("/api/queue", blank))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let bad_priority = serde_json::json!({
            "name": "Ana",
            "symptoms": "cough",
            "priority_level": 7,
            "hospital_id": CITY_GENERAL,
            "department_id": GENERAL_MEDICINE,
        });
        let response = api_router(core)
            .oneshot(post_json("/api/queue", bad_priority))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn register_in_unknown_department_is_404() {
        let body = serde_json::json!({
            "name": "Ana",
            "symptoms": "cough",
            "priority_level": 3,
            "hospital_id": METRO_EMERGENCY,
            "department_id": GENERAL_MEDICINE,
        });
        let response = api_router(test_core_state())
            .oneshot(post_json("/api/queue", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn predict_known_and_unknown_entries() {
        let core = test_core_state();
        let id = entry_id(&core, PriorityLevel::Urgent);

        let response = api_router(core.clone())
            .oneshot(post_json(
                "/api/predict-wait-time",
                serde_json::json!({ "queue_entry_id": id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prediction"]["queue_entry_id"], id.to_string());
        assert_eq!(json["prediction"]["factors"]["doctor_availability"], 1);

        let response = api_router(core)
            .oneshot(post_json(
                "/api/predict-wait-time",
                serde_json::json!({ "queue_entry_id": Uuid::new_v4() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn triage_assessment_revises_priority() {
        let core = test_core_state();
        let id = entry_id(&core, PriorityLevel::Routine);
        let body = serde_json::json!({
            "queue_entry_id": id,
            "vital_signs": { "heart_rate": 135, "oxygen_saturation": 91.0 },
            "pain_level": 8,
            "consciousness": "confused",
        });
        let response = api_router(core)
            .oneshot(post_json("/api/emergency-triage", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        // 1 + 2 + 3 + 2 + 2 = 10
        assert_eq!(json["triage_score"]["score"], 10);
        assert_eq!(json["triage_score"]["category"], "resuscitation");
        assert_eq!(json["priority_updated"], true);
        assert_eq!(json["new_priority_level"], 1);
    }

    #[tokio::test]
    async fn triage_rejects_pain_above_ten() {
        let core = test_core_state();
        let id = entry_id(&core, PriorityLevel::Routine);
        let response = api_router(core)
            .oneshot(post_json(
                "/api/emergency-triage",
                serde_json::json!({ "queue_entry_id": id, "pain_level": 12 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn emergency_overview_and_recommendations() {
        let core = test_core_state();
        let response = api_router(core.clone())
            .oneshot(get(&format!("/api/emergency-triage?hospital_id={CITY_GENERAL}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_emergencies"], 2);
        assert_eq!(json["prioritized_patients"][0]["queue_position"], 1);

        let response = api_router(core)
            .oneshot(get(&format!(
                "/api/emergency-recommendations?hospital_id={CITY_GENERAL}"
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_emergencies"], 1);
        assert_eq!(json["recommendations"][0]["urgency_level"], "critical");
    }

    #[tokio::test]
    async fn optimize_allocation_plan() {
        let response = api_router(test_core_state())
            .oneshot(post_json(
                "/api/optimize-allocation",
                serde_json::json!({ "hospital_id": CITY_GENERAL }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_patients"], 3);
        assert_eq!(json["available_doctors"], 4);
        assert_eq!(json["allocations"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn status_lifecycle_and_conflict() {
        let core = test_core_state();
        let id = entry_id(&core, PriorityLevel::Emergency);
        let uri = format!("/api/queue/{id}/status");

        let response = api_router(core.clone())
            .oneshot(post_json(&uri, serde_json::json!({ "status": "in_consultation" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "in_consultation");
        assert!(json["consultation_start_time"].is_string());

        let response = api_router(core)
            .oneshot(post_json(&uri, serde_json::json!({ "status": "waiting" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn queue_status_requires_hospital() {
        let core = test_core_state();
        let response = api_router(core.clone())
            .oneshot(get("/api/queue/status"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = api_router(core)
            .oneshot(get(&format!("/api/queue/status?hospital_id={CITY_GENERAL}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_patients"], 3);
        assert_eq!(json["critical_count"], 1);
    }

    #[tokio::test]
    async fn queue_updates_stream() {
        let core = test_core_state();
        let response = api_router(core.clone())
            .oneshot(get("/api/realtime/queue-updates"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = api_router(core)
            .oneshot(get(&format!(
                "/api/realtime/queue-updates?hospital_id={CITY_GENERAL}"
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let response = api_router(test_core_state())
            .oneshot(get("/api/nonexistent"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
