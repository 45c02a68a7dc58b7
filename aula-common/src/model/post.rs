use crate::model::{Id, user::Username};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::str::FromStr;
use thiserror::Error;
use time::UtcDateTime;

pub const POST_BODY_MAX_LEN: usize = 5000;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostKind {
    Testimony,
    Question,
}

impl PostKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::Testimony => "TESTIMONY",
            PostKind::Question => "QUESTION",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post kind is invalid: {0}")]
pub struct InvalidPostKindError(String);

impl FromStr for PostKind {
    type Err = InvalidPostKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TESTIMONY" => Ok(PostKind::Testimony),
            "QUESTION" => Ok(PostKind::Question),
            other => Err(InvalidPostKindError(other.to_owned())),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct PostBody(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post body is empty or over {POST_BODY_MAX_LEN} characters")]
pub struct InvalidPostBodyError;

impl PostBody {
    pub fn new(body: String) -> Result<Self, InvalidPostBodyError> {
        if !body.trim().is_empty() && body.chars().count() <= POST_BODY_MAX_LEN {
            Ok(PostBody(body))
        } else {
            Err(InvalidPostBodyError)
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

impl<'de> Deserialize<'de> for PostBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        PostBody::new(inner.clone())
            .map_err(|_| Error::invalid_value(Unexpected::Str(&inner), &"PostBody"))
    }
}

/// A post joined with its author summary, career summary and the social
/// counters computed from the relation tables.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct EnrichedPost {
    pub id: Id<PostMarker>,
    pub kind: PostKind,
    pub body: PostBody,
    pub created_at: UtcDateTime,
    pub author: PostAuthor,
    pub career: Option<PostCareer>,
    pub counters: PostCounters,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PostAuthor {
    pub username: Username,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PostCareer {
    pub name: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostCounters {
    pub comments: u64,
    pub likes: u64,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The counter value is negative: {0}")]
pub struct InvalidCounterError(i64);

impl PostCounters {
    pub fn new(comments: i64, likes: i64) -> Result<Self, InvalidCounterError> {
        let comments = u64::try_from(comments).map_err(|_| InvalidCounterError(comments))?;
        let likes = u64::try_from(likes).map_err(|_| InvalidCounterError(likes))?;
        Ok(Self { comments, likes })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct CreatePost {
    pub kind: PostKind,
    pub body: PostBody,
}
