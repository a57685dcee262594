//! HTTP surface of the mapping service.
//!
//! - `POST /api/get-id` issues or looks up the id for a slug
//! - `GET /api/get-slug/:uuid` resolves an id back to its slug
//! - `GET /api/health` checks the database connection

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use log::info;
use tower_http::cors::{Any, CorsLayer};

use crate::mapping::MappingService;

/// Build the API router.
pub fn router(service: MappingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/get-id", post(handlers::get_id))
        .route("/api/get-slug/:uuid", get(handlers::get_slug))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .with_state(service)
}

/// Bind and serve until the process exits.
pub async fn serve(service: MappingService, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    info!("Mapping service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
