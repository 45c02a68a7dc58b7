use crate::model::{Id, career::CareerMarker};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;
use time::UtcDateTime;

pub const USERNAME_MAX_LEN: usize = 30;
pub const SEMESTER_MAX: i32 = 14;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub username: Username,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub career_id: Option<Id<CareerMarker>>,
    pub semester: Option<Semester>,
    pub created_at: UtcDateTime,
}

impl User {
    /// The career reference gated by role. Aspirant rows may carry a stale
    /// `career_id`; it must never be resolved.
    #[must_use]
    pub fn career_ref(&self) -> Option<Id<CareerMarker>> {
        match self.role {
            Role::Student => self.career_id,
            Role::Aspirant => None,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Aspirant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Aspirant => "ASPIRANT",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The user role is invalid: {0}")]
pub struct InvalidRoleError(String);

impl FromStr for Role {
    type Err = InvalidRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Role::Student),
            "ASPIRANT" => Ok(Role::Aspirant),
            other => Err(InvalidRoleError(other.to_owned())),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        if !username.is_empty() && username.chars().count() <= USERNAME_MAX_LEN {
            Ok(Username(username))
        } else {
            Err(InvalidUsernameError(username))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Semester(i32);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The semester is out of range: {0}")]
pub struct InvalidSemesterError(i32);

impl Semester {
    pub fn new(semester: i32) -> Result<Self, InvalidSemesterError> {
        if (1..=SEMESTER_MAX).contains(&semester) {
            Ok(Semester(semester))
        } else {
            Err(InvalidSemesterError(semester))
        }
    }

    #[must_use]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Semester {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = i32::deserialize(deserializer)?;
        Semester::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Signed(err.0.into()), &"Semester"))
    }
}
