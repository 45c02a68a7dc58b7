use crate::record::{CareerRecord, EnrichedPostRecord, UserRecord};
use aula_common::model::career::{Career, CareerMarker, CareerSlug};
use aula_common::model::post::{CreatePost, EnrichedPost, PostKind, PostMarker};
use aula_common::model::profile::{CareerView, UserProfile};
use aula_common::model::user::{Role, User, UserMarker, Username};
use aula_common::model::{Id, ModelValidationError};
use aula_common::page::Page;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, query, query_as, query_scalar};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("The referenced user does not exist")]
    UserMissing,
    #[error("The referenced post does not exist")]
    PostMissing,
    #[error("The referenced career does not exist")]
    CareerMissing,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

/// Feed filters. All of them are applied in the `WHERE` clause, before
/// `LIMIT`/`OFFSET`, so page windows are stable under a fixed filter.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostFilter {
    pub kind: Option<PostKind>,
    pub career: Option<Id<CareerMarker>>,
    pub author: Option<Id<UserMarker>>,
}

const USER_COLUMNS: &str = "
    users.user_id,
    users.username,
    users.display_name,
    users.avatar_url,
    users.role,
    users.career_id,
    users.semester,
    users.created_at
";

const CAREER_COLUMNS: &str = "
    careers.career_id,
    careers.name,
    careers.slug,
    careers.tags,
    faculties.faculty_id,
    faculties.name AS faculty_name
";

const CAREER_JOINS: &str = "
    careers
    JOIN faculties ON faculties.faculty_id = careers.faculty_id
";

// Counters are computed from the relation tables in exactly one place; every
// post read goes through this projection.
const ENRICHED_POST_COLUMNS: &str = "
    posts.post_id,
    posts.kind,
    posts.body,
    posts.created_at,
    users.username AS author_username,
    users.avatar_url AS author_avatar_url,
    careers.name AS career_name,
    (SELECT COUNT(*) FROM comments WHERE comments.post_id = posts.post_id) AS comment_count,
    (SELECT COUNT(*) FROM post_likes WHERE post_likes.post_id = posts.post_id) AS like_count
";

const ENRICHED_POST_JOINS: &str = "
    posts
    JOIN users ON users.user_id = posts.author_id
    LEFT JOIN careers ON careers.career_id = posts.career_id
";

#[derive(Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(&format!(
            "
            SELECT {USER_COLUMNS}
            FROM users
            WHERE users.user_id = $1
            "
        ))
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    pub async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(&format!(
            "
            SELECT {USER_COLUMNS}
            FROM users
            WHERE users.username = $1
            "
        ))
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    /// Resolves a user's career slot into a [`CareerView`]. A dangling career
    /// reference degrades into [`CareerView::Orphaned`] with the user payload
    /// intact; aspirant rows never resolve their reference at all.
    pub async fn resolve_profile(&self, user_id: Id<UserMarker>) -> Result<Option<UserProfile>> {
        let Some(user) = self.fetch_user(user_id).await? else {
            return Ok(None);
        };

        let career = self.resolve_career_view(&user).await?;
        Ok(Some(UserProfile { user, career }))
    }

    pub async fn resolve_profile_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserProfile>> {
        let Some(user) = self.fetch_user_by_username(username).await? else {
            return Ok(None);
        };

        let career = self.resolve_career_view(&user).await?;
        Ok(Some(UserProfile { user, career }))
    }

    async fn resolve_career_view(&self, user: &User) -> Result<CareerView> {
        match user.career_ref() {
            Some(career_id) => match self.fetch_career(career_id).await? {
                Some(career) => Ok(CareerView::Enrolled { career }),
                None => {
                    warn!(user_id = %user.id, %career_id, "User references a missing career");
                    Ok(CareerView::Orphaned { career_id })
                }
            },
            None => match user.role {
                Role::Aspirant => Ok(CareerView::Aspirant),
                Role::Student => Ok(CareerView::Unset),
            },
        }
    }

    pub async fn fetch_career(&self, career_id: Id<CareerMarker>) -> Result<Option<Career>> {
        let record = query_as::<_, CareerRecord>(&format!(
            "
            SELECT {CAREER_COLUMNS}
            FROM {CAREER_JOINS}
            WHERE careers.career_id = $1
            "
        ))
        .bind(career_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let career = record.map(Career::try_from).transpose()?;
        Ok(career)
    }

    pub async fn fetch_career_by_slug(&self, slug: &CareerSlug) -> Result<Option<Career>> {
        let record = query_as::<_, CareerRecord>(&format!(
            "
            SELECT {CAREER_COLUMNS}
            FROM {CAREER_JOINS}
            WHERE careers.slug = $1
            "
        ))
        .bind(slug.get())
        .fetch_optional(&self.pool)
        .await?;

        let career = record.map(Career::try_from).transpose()?;
        Ok(career)
    }

    pub async fn list_careers(&self) -> Result<Vec<Career>> {
        let records = query_as::<_, CareerRecord>(&format!(
            "
            SELECT {CAREER_COLUMNS}
            FROM {CAREER_JOINS}
            ORDER BY careers.name, careers.career_id
            "
        ))
        .fetch_all(&self.pool)
        .await?;

        let careers = records
            .into_iter()
            .map(Career::try_from)
            .collect::<Result<_, _>>()?;
        Ok(careers)
    }

    pub async fn list_posts(&self, filter: &PostFilter, page: Page) -> Result<Vec<EnrichedPost>> {
        let records = query_as::<_, EnrichedPostRecord>(&format!(
            "
            SELECT {ENRICHED_POST_COLUMNS}
            FROM {ENRICHED_POST_JOINS}
            WHERE
                ($1::TEXT IS NULL OR posts.kind = $1)
                AND ($2::UUID IS NULL OR posts.career_id = $2)
                AND ($3::UUID IS NULL OR posts.author_id = $3)
            ORDER BY
                posts.created_at DESC,
                posts.post_id DESC
            LIMIT $4
            OFFSET $5
            "
        ))
        .bind(filter.kind.map(PostKind::as_str))
        .bind(filter.career.map(Id::get))
        .bind(filter.author.map(Id::get))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(EnrichedPost::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<EnrichedPost>> {
        let record = query_as::<_, EnrichedPostRecord>(&format!(
            "
            SELECT {ENRICHED_POST_COLUMNS}
            FROM {ENRICHED_POST_JOINS}
            WHERE posts.post_id = $1
            "
        ))
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(EnrichedPost::try_from).transpose()?;
        Ok(post)
    }

    /// Inserts the post, then re-reads it through the shared enrichment
    /// projection so counter semantics stay identical to every other read.
    pub async fn create_post(
        &self,
        author: Id<UserMarker>,
        career_id: Id<CareerMarker>,
        post: &CreatePost,
    ) -> Result<EnrichedPost> {
        let post_id: Uuid = query_scalar(
            "
            INSERT INTO posts (author_id, career_id, kind, body)
            VALUES ($1, $2, $3, $4)
            RETURNING posts.post_id
            ",
        )
        .bind(author.get())
        .bind(career_id.get())
        .bind(post.kind.as_str())
        .bind(post.body.get())
        .fetch_one(&self.pool)
        .await
        .map_err(map_reference_violation)?;

        self.fetch_post(post_id.into())
            .await?
            .ok_or(DbError::PostMissing)
    }

    pub async fn list_saved_careers(&self, user_id: Id<UserMarker>) -> Result<Vec<Career>> {
        let records = query_as::<_, CareerRecord>(&format!(
            "
            SELECT {CAREER_COLUMNS}
            FROM saved_careers
            JOIN ({CAREER_JOINS}) ON careers.career_id = saved_careers.career_id
            WHERE saved_careers.user_id = $1
            ORDER BY
                saved_careers.saved_at DESC,
                careers.career_id DESC
            "
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        let careers = records
            .into_iter()
            .map(Career::try_from)
            .collect::<Result<_, _>>()?;
        Ok(careers)
    }

    pub async fn save_career(
        &self,
        user_id: Id<UserMarker>,
        career_id: Id<CareerMarker>,
    ) -> Result<()> {
        query(
            "
            INSERT INTO saved_careers (user_id, career_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, career_id) DO NOTHING
            ",
        )
        .bind(user_id.get())
        .bind(career_id.get())
        .execute(&self.pool)
        .await
        .map_err(map_reference_violation)?;

        Ok(())
    }

    pub async fn unsave_career(
        &self,
        user_id: Id<UserMarker>,
        career_id: Id<CareerMarker>,
    ) -> Result<()> {
        query(
            "
            DELETE FROM saved_careers
            WHERE user_id = $1 AND career_id = $2
            ",
        )
        .bind(user_id.get())
        .bind(career_id.get())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Saved posts are ordered by bookmark recency, not post recency. Rows
    /// whose post has disappeared are excluded by the inner join.
    pub async fn list_saved_posts(&self, user_id: Id<UserMarker>) -> Result<Vec<EnrichedPost>> {
        let records = query_as::<_, EnrichedPostRecord>(&format!(
            "
            SELECT {ENRICHED_POST_COLUMNS}
            FROM saved_posts
            JOIN ({ENRICHED_POST_JOINS}) ON posts.post_id = saved_posts.post_id
            WHERE saved_posts.user_id = $1
            ORDER BY
                saved_posts.saved_at DESC,
                posts.post_id DESC
            "
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(EnrichedPost::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn save_post(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> Result<()> {
        query(
            "
            INSERT INTO saved_posts (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO NOTHING
            ",
        )
        .bind(user_id.get())
        .bind(post_id.get())
        .execute(&self.pool)
        .await
        .map_err(map_reference_violation)?;

        Ok(())
    }

    pub async fn unsave_post(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> Result<()> {
        query(
            "
            DELETE FROM saved_posts
            WHERE user_id = $1 AND post_id = $2
            ",
        )
        .bind(user_id.get())
        .bind(post_id.get())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn map_reference_violation(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_foreign_key_violation()
    {
        match db_err.constraint() {
            Some("posts_author_fk" | "saved_posts_user_fk" | "saved_careers_user_fk") => {
                return DbError::UserMissing;
            }
            Some("posts_career_fk" | "saved_careers_career_fk") => {
                return DbError::CareerMissing;
            }
            Some("saved_posts_post_fk") => return DbError::PostMissing,
            _ => {}
        }
    }

    DbError::Sqlx(err)
}
