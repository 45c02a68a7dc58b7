use super::posts::FeedQuery;
use crate::server::{
    Result, ServerError, ServerRouter,
    extract::{Json, Query},
    identity::Identity,
};
use aula_common::model::{
    career::{Career, CareerSlug},
    post::{CreatePost, EnrichedPost},
};
use aula_db::client::{DbClient, PostFilter};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_careers)
        .typed_get(get_career)
        .typed_get(get_career_posts)
        .typed_post(create_career_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/careers", rejection(ServerError))]
struct ListCareersPath();

async fn list_careers(
    ListCareersPath(): ListCareersPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<Career>>> {
    let careers = db.list_careers().await?;
    Ok(Json(careers))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/careers/{slug}", rejection(ServerError))]
struct GetCareerPath {
    slug: CareerSlug,
}

async fn get_career(
    GetCareerPath { slug }: GetCareerPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Career>> {
    let career = db
        .fetch_career_by_slug(&slug)
        .await?
        .ok_or(ServerError::CareerBySlugNotFound(slug))?;

    Ok(Json(career))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/careers/{slug}/posts", rejection(ServerError))]
struct CareerPostsPath {
    slug: CareerSlug,
}

async fn get_career_posts(
    CareerPostsPath { slug }: CareerPostsPath,
    State(db): State<Arc<DbClient>>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<EnrichedPost>>> {
    let page = query.page()?;
    let career = db
        .fetch_career_by_slug(&slug)
        .await?
        .ok_or(ServerError::CareerBySlugNotFound(slug))?;

    let filter = PostFilter {
        kind: query.kind,
        career: Some(career.id),
        ..PostFilter::default()
    };

    let posts = db.list_posts(&filter, page).await?;
    Ok(Json(posts))
}

async fn create_career_post(
    CareerPostsPath { slug }: CareerPostsPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
    Json(post): Json<CreatePost>,
) -> Result<Json<EnrichedPost>> {
    let career = db
        .fetch_career_by_slug(&slug)
        .await?
        .ok_or(ServerError::CareerBySlugNotFound(slug))?;

    let post = db.create_post(identity.user_id(), career.id, &post).await?;

    Ok(Json(post))
}
