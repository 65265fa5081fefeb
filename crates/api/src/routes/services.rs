use axum::{
    Router,
    routing::{get, patch},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/services", get(handlers::services::list_services))
        .route(
            "/api/admin/services",
            get(handlers::services::admin_list_services).post(handlers::services::create_service),
        )
        .route(
            "/api/admin/services/:id",
            patch(handlers::services::update_service),
        )
}
