use super::posts::FeedQuery;
use crate::server::{
    Result, ServerError, ServerRouter,
    extract::{Json, Query},
};
use aula_common::model::{
    Id,
    post::EnrichedPost,
    profile::UserProfile,
    user::{UserMarker, Username},
};
use aula_db::client::{DbClient, PostFilter};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_user)
        .typed_get(get_user_by_username)
        .typed_get(get_user_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}", rejection(ServerError))]
struct GetUserPath {
    id: Id<UserMarker>,
}

async fn get_user(
    GetUserPath { id }: GetUserPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<UserProfile>> {
    let profile = db
        .resolve_profile(id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(profile))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/by-username/{username}", rejection(ServerError))]
struct GetUserByUsernamePath {
    username: Username,
}

async fn get_user_by_username(
    GetUserByUsernamePath { username }: GetUserByUsernamePath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<UserProfile>> {
    let profile = db
        .resolve_profile_by_username(&username)
        .await?
        .ok_or(ServerError::UserByUsernameNotFound(username))?;

    Ok(Json(profile))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/posts", rejection(ServerError))]
struct GetUserPostsPath {
    id: Id<UserMarker>,
}

async fn get_user_posts(
    GetUserPostsPath { id }: GetUserPostsPath,
    State(db): State<Arc<DbClient>>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<EnrichedPost>>> {
    let page = query.page()?;

    if db.fetch_user(id).await?.is_none() {
        return Err(ServerError::UserByIdNotFound(id));
    }

    let filter = PostFilter {
        kind: query.kind,
        author: Some(id),
        ..PostFilter::default()
    };

    let posts = db.list_posts(&filter, page).await?;
    Ok(Json(posts))
}
