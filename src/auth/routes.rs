use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route("/users", post(handlers::create_user))
        .route("/users/me", get(handlers::get_current_user))
        .route("/auth/login", post(handlers::login_user))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/refresh", post(handlers::refresh_token))
}
