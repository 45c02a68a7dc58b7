use crate::server::{Result, ServerError, ServerRouter, extract::Json, identity::Identity};
use aula_common::model::{
    Id,
    career::{Career, CareerMarker},
    post::{EnrichedPost, PostMarker},
};
use aula_db::client::DbClient;
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_saved_careers)
        .typed_put(save_career)
        .typed_delete(unsave_career)
        .typed_get(list_saved_posts)
        .typed_put(save_post)
        .typed_delete(unsave_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/saved/careers", rejection(ServerError))]
struct SavedCareersPath();

async fn list_saved_careers(
    SavedCareersPath(): SavedCareersPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
) -> Result<Json<Vec<Career>>> {
    let careers = db.list_saved_careers(identity.user_id()).await?;
    Ok(Json(careers))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/saved/careers/{career_id}", rejection(ServerError))]
struct SavedCareerPath {
    career_id: Id<CareerMarker>,
}

async fn save_career(
    SavedCareerPath { career_id }: SavedCareerPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
) -> Result<StatusCode> {
    db.save_career(identity.user_id(), career_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unsave_career(
    SavedCareerPath { career_id }: SavedCareerPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
) -> Result<StatusCode> {
    db.unsave_career(identity.user_id(), career_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/saved/posts", rejection(ServerError))]
struct SavedPostsPath();

async fn list_saved_posts(
    SavedPostsPath(): SavedPostsPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
) -> Result<Json<Vec<EnrichedPost>>> {
    let posts = db.list_saved_posts(identity.user_id()).await?;
    Ok(Json(posts))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/saved/posts/{post_id}", rejection(ServerError))]
struct SavedPostPath {
    post_id: Id<PostMarker>,
}

async fn save_post(
    SavedPostPath { post_id }: SavedPostPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
) -> Result<StatusCode> {
    db.save_post(identity.user_id(), post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unsave_post(
    SavedPostPath { post_id }: SavedPostPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
) -> Result<StatusCode> {
    db.unsave_post(identity.user_id(), post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
