use crate::server::{
    Result, ServerError, ServerRouter,
    extract::{Json, Query},
};
use aula_common::model::{
    Id,
    post::{EnrichedPost, PostKind, PostMarker},
};
use aula_common::page::Page;
use aula_db::client::{DbClient, PostFilter};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(list_posts).typed_get(get_post)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct FeedQuery {
    pub take: u32,
    #[serde(default)]
    pub skip: u32,
    pub kind: Option<PostKind>,
}

impl FeedQuery {
    pub fn page(self) -> Result<Page> {
        let page = Page::new(self.take, self.skip)?;
        Ok(page)
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct ListPostsPath();

async fn list_posts(
    ListPostsPath(): ListPostsPath,
    State(db): State<Arc<DbClient>>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<EnrichedPost>>> {
    let page = query.page()?;
    let filter = PostFilter {
        kind: query.kind,
        ..PostFilter::default()
    };

    let posts = db.list_posts(&filter, page).await?;
    Ok(Json(posts))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct GetPostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    GetPostPath { id }: GetPostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<EnrichedPost>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}
