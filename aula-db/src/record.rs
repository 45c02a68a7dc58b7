use aula_common::model::{
    ModelValidationError,
    career::{Career, CareerSlug, Faculty},
    post::{EnrichedPost, PostAuthor, PostBody, PostCareer, PostCounters},
    user::{Semester, User, Username},
};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub career_id: Option<Uuid>,
    pub semester: Option<i32>,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct CareerRecord {
    pub career_id: Uuid,
    pub name: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub faculty_id: Uuid,
    pub faculty_name: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct EnrichedPostRecord {
    pub post_id: Uuid,
    pub kind: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
    pub career_name: Option<String>,
    pub comment_count: i64,
    pub like_count: i64,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            username: Username::new(value.username)?,
            display_name: value.display_name,
            avatar_url: value.avatar_url,
            role: value.role.parse()?,
            career_id: value.career_id.map(Into::into),
            semester: value.semester.map(Semester::new).transpose()?,
            created_at: value.created_at.to_utc(),
        })
    }
}

impl TryFrom<CareerRecord> for Career {
    type Error = ModelValidationError;

    fn try_from(value: CareerRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.career_id.into(),
            name: value.name,
            slug: CareerSlug::new(value.slug)?,
            faculty: Faculty {
                id: value.faculty_id.into(),
                name: value.faculty_name,
            },
            tags: value.tags,
        })
    }
}

impl TryFrom<EnrichedPostRecord> for EnrichedPost {
    type Error = ModelValidationError;

    fn try_from(value: EnrichedPostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_id.into(),
            kind: value.kind.parse()?,
            body: PostBody::new(value.body)?,
            created_at: value.created_at.to_utc(),
            author: PostAuthor {
                username: Username::new(value.author_username)?,
                avatar_url: value.author_avatar_url,
            },
            career: value.career_name.map(|name| PostCareer { name }),
            counters: PostCounters::new(value.comment_count, value.like_count)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_common::model::user::Role;

    fn user_record() -> UserRecord {
        UserRecord {
            user_id: Uuid::new_v4(),
            username: "lcervantes".to_owned(),
            display_name: "Lucia Cervantes".to_owned(),
            avatar_url: None,
            role: "STUDENT".to_owned(),
            career_id: Some(Uuid::new_v4()),
            semester: Some(4),
            created_at: OffsetDateTime::from_unix_timestamp(1_725_000_000).unwrap(),
        }
    }

    fn post_record() -> EnrichedPostRecord {
        EnrichedPostRecord {
            post_id: Uuid::new_v4(),
            kind: "TESTIMONY".to_owned(),
            body: "First week of the program.".to_owned(),
            created_at: OffsetDateTime::from_unix_timestamp(1_725_000_000).unwrap(),
            author_username: "lcervantes".to_owned(),
            author_avatar_url: None,
            career_name: Some("Software Engineering".to_owned()),
            comment_count: 3,
            like_count: 7,
        }
    }

    #[test]
    fn user_record_converts() {
        let record = user_record();
        let user = User::try_from(record.clone()).unwrap();

        assert_eq!(user.id.get(), record.user_id);
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.semester.unwrap().get(), 4);
    }

    #[test]
    fn user_record_with_unknown_role_is_rejected() {
        let mut record = user_record();
        record.role = "PROFESSOR".to_owned();

        assert!(User::try_from(record).is_err());
    }

    #[test]
    fn user_record_with_out_of_range_semester_is_rejected() {
        let mut record = user_record();
        record.semester = Some(0);

        assert!(User::try_from(record).is_err());
    }

    #[test]
    fn post_record_converts_with_counters() {
        let record = post_record();
        let post = EnrichedPost::try_from(record.clone()).unwrap();

        assert_eq!(post.id.get(), record.post_id);
        assert_eq!(post.counters.comments, 3);
        assert_eq!(post.counters.likes, 7);
        assert_eq!(post.career.unwrap().name, "Software Engineering");
    }

    #[test]
    fn post_record_without_career_converts() {
        let mut record = post_record();
        record.career_name = None;

        let post = EnrichedPost::try_from(record).unwrap();
        assert!(post.career.is_none());
    }

    #[test]
    fn post_record_with_negative_counter_is_rejected() {
        let mut record = post_record();
        record.like_count = -1;

        assert!(EnrichedPost::try_from(record).is_err());
    }
}
