use axum::{Router, routing::get};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new().route(
        "/clinics",
        get(handlers::get_clinics).post(handlers::create_clinic),
    )
}
