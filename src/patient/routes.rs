use axum::{
    Router,
    routing::{delete, get},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route(
            "/patients",
            get(handlers::get_patients).post(handlers::upsert_patient),
        )
        .route("/patients/{id}", delete(handlers::delete_patient))
}
