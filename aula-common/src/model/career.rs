use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::Display;
use thiserror::Error;

pub const CAREER_SLUG_MAX_LEN: usize = 60;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CareerMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct FacultyMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Career {
    pub id: Id<CareerMarker>,
    pub name: String,
    pub slug: CareerSlug,
    pub faculty: Faculty,
    pub tags: Vec<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Faculty {
    pub id: Id<FacultyMarker>,
    pub name: String,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct CareerSlug(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The career slug is invalid: {0}")]
pub struct InvalidCareerSlugError(String);

impl CareerSlug {
    pub fn new(slug: String) -> Result<Self, InvalidCareerSlugError> {
        let well_formed = !slug.is_empty()
            && slug.chars().count() <= CAREER_SLUG_MAX_LEN
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if well_formed {
            Ok(CareerSlug(slug))
        } else {
            Err(InvalidCareerSlugError(slug))
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

impl Display for CareerSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<'de> Deserialize<'de> for CareerSlug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        CareerSlug::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"CareerSlug"))
    }
}
