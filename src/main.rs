mod appointment;
mod auth;
mod clinic;
mod doctor;
mod patient;
mod utils;

use axum::Router;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use listenfd::ListenFd;
use std::env;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::utils::types::Pool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    tokio::task::spawn_blocking(|| {
        let mut conn = clinic_agenda::establish_connection();
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .expect("failed to run migrations");
    })
    .await
    .expect("migration task failed");

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    let pool: Pool = bb8::Pool::builder().build(manager).await.unwrap();

    let routes = Router::new()
        .merge(auth::routes::get_routes())
        .merge(clinic::routes::get_routes())
        .merge(doctor::routes::get_routes())
        .merge(patient::routes::get_routes())
        .merge(appointment::routes::get_routes())
        .with_state(pool);

    let app = Router::new().nest("/api", routes);
    let app = app.fallback(utils::handler_404);

    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0).unwrap() {
        // if we are given a tcp listener on listen fd 0, we use that one
        Some(listener) => {
            listener.set_nonblocking(true).unwrap();
            TcpListener::from_std(listener).unwrap()
        }
        // otherwise fall back to local listening
        None => TcpListener::bind("127.0.0.1:3000").await.unwrap(),
    };
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
