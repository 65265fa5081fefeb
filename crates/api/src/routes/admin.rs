use axum::{
    Router,
    routing::{delete, get, patch},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/admin/appointments",
            get(handlers::admin::list_appointments).patch(handlers::admin::update_appointment_status),
        )
        .route(
            "/api/admin/appointments/:id",
            delete(handlers::admin::delete_appointment),
        )
        .route(
            "/api/admin/slots",
            get(handlers::admin::list_slots).post(handlers::admin::create_slot),
        )
        .route(
            "/api/admin/slots/:id",
            patch(handlers::admin::update_slot).delete(handlers::admin::delete_slot),
        )
}
