use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::mapping::{MappingError, MappingService};
use crate::models::MappingRecord;

#[derive(Deserialize)]
pub struct GetIdRequest {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct GetIdResponse {
    pub uuid: String,
}

/// Error body returned by every endpoint except health.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<MappingError> for ApiError {
    fn from(e: MappingError) -> Self {
        let status = match e {
            MappingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MappingError::Persistence(_) | MappingError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!("Mapping request failed: {}", e);
        }
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

/// POST /api/get-id
pub async fn get_id(
    State(service): State<MappingService>,
    body: Result<Json<GetIdRequest>, JsonRejection>,
) -> Result<Json<GetIdResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        warn!("Rejected get-id body: {}", e);
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: e.body_text(),
        }
    })?;

    let slug = request.slug.unwrap_or_default();
    let kind = request.kind.unwrap_or_default();
    info!("get-id {} ({})", slug, kind);

    let uuid = service.get_or_create_id(&slug, &kind).await?;
    Ok(Json(GetIdResponse { uuid }))
}

/// GET /api/get-slug/:uuid
pub async fn get_slug(
    State(service): State<MappingService>,
    Path(uuid): Path<String>,
) -> Result<Json<MappingRecord>, ApiError> {
    match service.resolve(&uuid).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("uuid {} is not mapped", uuid),
        }),
    }
}

/// GET /api/health
pub async fn health(State(service): State<MappingService>) -> Response {
    match service.health().await {
        Ok(()) => Json(json!({ "status": "OK", "database": "Connected" })).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "Error", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::mapping::DatabaseLocation;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use std::path::PathBuf;
    use tower::ServiceExt;

    async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/api/get-id")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_id_then_get_slug() {
        let app = router(MappingService::new(DatabaseLocation::Memory));

        let (status, body) = call(
            app.clone(),
            post_json(r#"{"slug":"one-piece","type":"series"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let uuid = body["uuid"].as_str().unwrap().to_string();

        let (_, again) = call(
            app.clone(),
            post_json(r#"{"slug":"one-piece","type":"series"}"#),
        )
        .await;
        assert_eq!(again["uuid"], uuid.as_str());

        let (status, body) = call(
            app,
            Request::get(format!("/api/get-slug/{}", uuid))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"uuid": uuid, "slug": "one-piece", "type": "series"})
        );
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let app = router(MappingService::new(DatabaseLocation::Memory));

        for body in [r#"{"slug":"one-piece"}"#, r#"{"type":"series"}"#, "not json"] {
            let (status, json) = call(app.clone(), post_json(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn unknown_uuid_is_not_found() {
        let app = router(MappingService::new(DatabaseLocation::Memory));
        let (status, body) = call(
            app,
            Request::get("/api/get-slug/not-a-real-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn health_reports_database_state() {
        let healthy = router(MappingService::new(DatabaseLocation::Memory));
        let (status, body) = call(
            healthy,
            Request::get("/api/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "OK", "database": "Connected"}));

        let broken = router(MappingService::new(DatabaseLocation::File(
            PathBuf::from("Cargo.toml").join("mappings.db"),
        )));
        let (status, body) = call(
            broken.clone(),
            Request::get("/api/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "Error");

        let (status, _) = call(broken, post_json(r#"{"slug":"a","type":"series"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
