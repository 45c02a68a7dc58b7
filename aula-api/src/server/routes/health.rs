use crate::server::{Result, ServerError, ServerRouter};
use aula_db::client::DbClient;
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(health)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/health", rejection(ServerError))]
struct HealthPath();

async fn health(
    HealthPath(): HealthPath,
    State(db): State<Arc<DbClient>>,
) -> Result<StatusCode> {
    db.health_check().await?;
    Ok(StatusCode::OK)
}
