use aula_common::model::{
    Id,
    career::CareerSlug,
    post::PostMarker,
    user::{UserMarker, Username},
};
use aula_common::page::PageSizeError;
use aula_db::client::{DbClient, DbError};
use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use extract::Json;
use identity::IdentityError;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod extract;
mod identity;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("The caller identity could not be established: {0}")]
    InvalidIdentity(#[from] IdentityError),
    #[error("Requested page is not acceptable: {0}")]
    PageSize(#[from] PageSizeError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("User with id {0} was not found.")]
    UserByIdNotFound(Id<UserMarker>),
    #[error("User with username {0} was not found.")]
    UserByUsernameNotFound(Username),
    #[error("Career with slug {0} was not found.")]
    CareerBySlugNotFound(CareerSlug),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::UserByIdNotFound(_)
            | ServerError::UserByUsernameNotFound(_)
            | ServerError::CareerBySlugNotFound(_)
            | ServerError::Database(
                DbError::UserMissing | DbError::PostMissing | DbError::CareerMissing,
            ) => StatusCode::NOT_FOUND,
            ServerError::InvalidIdentity(_) => StatusCode::UNAUTHORIZED,
            ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::PageSize(_) => StatusCode::BAD_REQUEST,
            ServerError::Database(DbError::Sqlx(_) | DbError::Migrate(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServerError::JsonResponse(_) | ServerError::Database(DbError::Data(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::UserByIdNotFound(_)
            | ServerError::UserByUsernameNotFound(_)
            | ServerError::CareerBySlugNotFound(_)
            | ServerError::Database(
                DbError::UserMissing | DbError::PostMissing | DbError::CareerMissing,
            ) => "not_found",
            ServerError::InvalidIdentity(_) => "unauthorized",
            ServerError::JsonRejection(_) => "bad_request",
            ServerError::QueryRejection(_) | ServerError::PageSize(_) => "validation",
            ServerError::Database(DbError::Sqlx(_) | DbError::Migrate(_)) => "store_unavailable",
            ServerError::JsonResponse(_) | ServerError::Database(DbError::Data(_)) => "internal",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
struct ErrorResponse {
    status: u16,
    kind: &'static str,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        error!(error = %self, %status, kind, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            kind,
        };
        (status, Json(error_response)).into_response()
    }
}
