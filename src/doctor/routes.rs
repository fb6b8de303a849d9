use axum::{
    Router,
    routing::{delete, get},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route(
            "/doctors",
            get(handlers::get_doctors).post(handlers::upsert_doctor),
        )
        .route("/doctors/{id}", delete(handlers::delete_doctor))
}
