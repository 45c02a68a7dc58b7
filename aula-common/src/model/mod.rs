pub mod career;
pub mod post;
pub mod profile;
pub mod user;

use crate::model::{
    career::InvalidCareerSlugError,
    post::{InvalidCounterError, InvalidPostBodyError, InvalidPostKindError},
    user::{InvalidRoleError, InvalidSemesterError, InvalidUsernameError},
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Username(#[from] InvalidUsernameError),
    #[error(transparent)]
    Role(#[from] InvalidRoleError),
    #[error(transparent)]
    Semester(#[from] InvalidSemesterError),
    #[error(transparent)]
    CareerSlug(#[from] InvalidCareerSlugError),
    #[error(transparent)]
    PostKind(#[from] InvalidPostKindError),
    #[error(transparent)]
    PostBody(#[from] InvalidPostBodyError),
    #[error(transparent)]
    Counter(#[from] InvalidCounterError),
}

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id<Marker>(Uuid, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> Uuid {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<Uuid> for Id<Marker> {
    fn from(value: Uuid) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for Uuid {
    fn from(value: Id<Marker>) -> Self {
        value.0
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self::new)
    }
}
