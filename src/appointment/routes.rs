use axum::{
    Router,
    routing::{delete, get},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route(
            "/appointments",
            get(handlers::get_appointments).post(handlers::create_appointment),
        )
        .route("/appointments/{id}", delete(handlers::delete_appointment))
}
