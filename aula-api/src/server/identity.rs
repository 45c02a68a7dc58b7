use crate::server::ServerError;
use aula_common::model::{Id, user::UserMarker};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use thiserror::Error;

pub const IDENTITY_HEADER: &str = "x-user-id";

/// The caller as forwarded by the fronting session service. This service
/// performs no authentication itself; it trusts the header.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct Identity {
    id: Id<UserMarker>,
}

impl Identity {
    #[must_use]
    pub fn user_id(self) -> Id<UserMarker> {
        self.id
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("The {IDENTITY_HEADER} header is missing")]
    Missing,
    #[error("The {IDENTITY_HEADER} header is not valid UTF-8")]
    NotUtf8,
    #[error("The {IDENTITY_HEADER} header is not a user id: {0}")]
    Parse(#[from] uuid::Error),
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = identity_from_headers(&parts.headers)?;
        Ok(Self { id })
    }
}

fn identity_from_headers(headers: &HeaderMap) -> Result<Id<UserMarker>, IdentityError> {
    let value = headers.get(IDENTITY_HEADER).ok_or(IdentityError::Missing)?;
    let value = value.to_str().map_err(|_| IdentityError::NotUtf8)?;
    let id = value.parse()?;

    Ok(id)
}
