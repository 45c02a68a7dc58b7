use crate::model::{
    Id,
    career::{Career, CareerMarker},
    post::EnrichedPost,
    user::User,
};
use serde::{Deserialize, Serialize};

pub const ASPIRANT_LABEL: &str = "Aspirant";
pub const NO_CAREER_LABEL: &str = "No career specified";
pub const CAREER_UNAVAILABLE_LABEL: &str = "Career unavailable";

/// Denormalized view of a user for display surfaces: the user row plus the
/// outcome of resolving their career reference.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub career: CareerView,
}

impl UserProfile {
    #[must_use]
    pub fn career_label(&self) -> &str {
        self.career.label()
    }
}

/// Every way a career slot can resolve. A dangling reference degrades into
/// `Orphaned` with the user payload untouched; it never fails the profile.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CareerView {
    Enrolled { career: Career },
    Aspirant,
    Unset,
    Orphaned { career_id: Id<CareerMarker> },
}

impl CareerView {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            CareerView::Enrolled { career } => &career.name,
            CareerView::Aspirant => ASPIRANT_LABEL,
            CareerView::Unset => NO_CAREER_LABEL,
            CareerView::Orphaned { .. } => CAREER_UNAVAILABLE_LABEL,
        }
    }
}

/// Combined state for the user menu: career label plus both saved lists.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct MenuContext {
    pub career_label: String,
    pub saved_careers: Vec<Career>,
    pub saved_posts: Vec<EnrichedPost>,
}
