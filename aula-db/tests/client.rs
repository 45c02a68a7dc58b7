use aula_common::model::Id;
use aula_common::model::career::CareerMarker;
use aula_common::model::post::{CreatePost, PostBody, PostKind, PostMarker};
use aula_common::model::profile::CareerView;
use aula_common::model::user::{Role, UserMarker, Username};
use aula_common::page::Page;
use aula_db::client::{DbClient, DbError, PostFilter};
use sqlx::PgPool;
use std::env;
use uuid::Uuid;

async fn connect() -> (DbClient, PgPool) {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let client = DbClient::new(pool.clone());
    client
        .run_migrations()
        .await
        .expect("Failed to run migrations");

    (client, pool)
}

fn unique_username() -> String {
    format!("u{}", &Uuid::new_v4().simple().to_string()[..12])
}

async fn seed_career(pool: &PgPool, name: &str) -> Id<CareerMarker> {
    let faculty_id: Uuid =
        sqlx::query_scalar("INSERT INTO faculties (name) VALUES ($1) RETURNING faculty_id")
            .bind("Engineering")
            .fetch_one(pool)
            .await
            .expect("Failed to insert faculty");

    let career_id: Uuid = sqlx::query_scalar(
        "
        INSERT INTO careers (name, slug, faculty_id, tags)
        VALUES ($1, $2, $3, $4)
        RETURNING career_id
        ",
    )
    .bind(name)
    .bind(format!("c-{}", Uuid::new_v4()))
    .bind(faculty_id)
    .bind(vec!["stem".to_owned()])
    .fetch_one(pool)
    .await
    .expect("Failed to insert career");

    career_id.into()
}

async fn seed_named_user(
    pool: &PgPool,
    username: &str,
    role: Role,
    career_id: Option<Id<CareerMarker>>,
) -> Id<UserMarker> {
    let user_id: Uuid = sqlx::query_scalar(
        "
        INSERT INTO users (username, display_name, role, career_id)
        VALUES ($1, $2, $3, $4)
        RETURNING user_id
        ",
    )
    .bind(username)
    .bind("Test User")
    .bind(role.as_str())
    .bind(career_id.map(Id::get))
    .fetch_one(pool)
    .await
    .expect("Failed to insert user");

    user_id.into()
}

async fn seed_user(
    pool: &PgPool,
    role: Role,
    career_id: Option<Id<CareerMarker>>,
) -> Id<UserMarker> {
    seed_named_user(pool, &unique_username(), role, career_id).await
}

async fn seed_post(
    client: &DbClient,
    author: Id<UserMarker>,
    career: Id<CareerMarker>,
    kind: PostKind,
) -> Id<PostMarker> {
    let post = CreatePost {
        kind,
        body: PostBody::new("Posted for the integration suite.".to_owned()).unwrap(),
    };

    client
        .create_post(author, career, &post)
        .await
        .expect("Failed to create post")
        .id
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn health_check_succeeds() {
    let (client, _pool) = connect().await;
    client.health_check().await.expect("Health check failed");
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn feed_windows_concatenate() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;

    for _ in 0..5 {
        seed_post(&client, author, career, PostKind::Testimony).await;
    }

    let filter = PostFilter {
        author: Some(author),
        ..PostFilter::default()
    };

    let mut concatenated = Vec::new();
    for skip in [0, 2, 4] {
        let window = client
            .list_posts(&filter, Page::new(2, skip).unwrap())
            .await
            .expect("Failed to list posts");
        concatenated.extend(window);
    }

    let all = client
        .list_posts(&filter, Page::new(100, 0).unwrap())
        .await
        .expect("Failed to list posts");

    assert_eq!(all.len(), 5);
    assert_eq!(concatenated, all);
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn feed_filter_applies_before_pagination() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;

    let mut questions = Vec::new();
    for n in 0..6 {
        let kind = if n % 2 == 0 {
            PostKind::Question
        } else {
            PostKind::Testimony
        };
        let post_id = seed_post(&client, author, career, kind).await;
        if kind == PostKind::Question {
            questions.push(post_id);
        }
    }

    let filter = PostFilter {
        kind: Some(PostKind::Question),
        author: Some(author),
        ..PostFilter::default()
    };

    let mut seen = Vec::new();
    for skip in [0, 2] {
        let window = client
            .list_posts(&filter, Page::new(2, skip).unwrap())
            .await
            .expect("Failed to list posts");
        for post in window {
            assert_eq!(post.kind, PostKind::Question);
            seen.push(post.id);
        }
    }

    seen.sort();
    questions.sort();
    assert_eq!(seen, questions);
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn feed_tolerates_a_deleted_career() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, None).await;
    seed_post(&client, author, career, PostKind::Testimony).await;

    sqlx::query("DELETE FROM careers WHERE career_id = $1")
        .bind(career.get())
        .execute(&pool)
        .await
        .expect("Failed to delete career");

    let filter = PostFilter {
        author: Some(author),
        ..PostFilter::default()
    };
    let posts = client
        .list_posts(&filter, Page::new(10, 0).unwrap())
        .await
        .expect("Failed to list posts");

    assert_eq!(posts.len(), 1);
    assert!(posts[0].career.is_none());
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn feed_windows_past_the_end_are_empty() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;
    seed_post(&client, author, career, PostKind::Testimony).await;

    let filter = PostFilter {
        author: Some(author),
        ..PostFilter::default()
    };

    let past_the_end = client
        .list_posts(&filter, Page::new(10, 50).unwrap())
        .await
        .expect("Failed to list posts");
    assert!(past_the_end.is_empty());

    let zero_take = client
        .list_posts(&filter, Page::new(0, 0).unwrap())
        .await
        .expect("Failed to list posts");
    assert!(zero_take.is_empty());
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn counters_reflect_relation_rows() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;
    let post_id = seed_post(&client, author, career, PostKind::Question).await;

    let fan_one = seed_user(&pool, Role::Student, Some(career)).await;
    let fan_two = seed_user(&pool, Role::Aspirant, None).await;
    for fan in [fan_one, fan_two] {
        sqlx::query("INSERT INTO post_likes (user_id, post_id) VALUES ($1, $2)")
            .bind(fan.get())
            .bind(post_id.get())
            .execute(&pool)
            .await
            .expect("Failed to insert like");
    }
    sqlx::query("INSERT INTO comments (post_id, author_id, body) VALUES ($1, $2, $3)")
        .bind(post_id.get())
        .bind(fan_one.get())
        .bind("Good to know.")
        .execute(&pool)
        .await
        .expect("Failed to insert comment");

    let post = client
        .fetch_post(post_id)
        .await
        .expect("Failed to fetch post")
        .expect("Post should exist");

    assert_eq!(post.counters.likes, 2);
    assert_eq!(post.counters.comments, 1);
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn repeated_save_lists_the_post_once() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;
    let reader = seed_user(&pool, Role::Aspirant, None).await;
    let post_id = seed_post(&client, author, career, PostKind::Testimony).await;

    client
        .save_post(reader, post_id)
        .await
        .expect("Failed to save post");
    client
        .save_post(reader, post_id)
        .await
        .expect("Failed to save post");

    let saved = client
        .list_saved_posts(reader)
        .await
        .expect("Failed to list saved posts");

    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, post_id);
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn unsave_is_idempotent_and_scoped_to_the_pair() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;
    let reader = seed_user(&pool, Role::Student, Some(career)).await;
    let first = seed_post(&client, author, career, PostKind::Testimony).await;
    let second = seed_post(&client, author, career, PostKind::Question).await;

    client
        .unsave_post(reader, first)
        .await
        .expect("Failed to unsave post");
    let saved = client
        .list_saved_posts(reader)
        .await
        .expect("Failed to list saved posts");
    assert!(saved.is_empty());

    client
        .save_post(reader, first)
        .await
        .expect("Failed to save post");
    client
        .save_post(reader, second)
        .await
        .expect("Failed to save post");
    client
        .unsave_post(reader, first)
        .await
        .expect("Failed to unsave post");
    client
        .unsave_post(reader, first)
        .await
        .expect("Failed to unsave post");

    let saved = client
        .list_saved_posts(reader)
        .await
        .expect("Failed to list saved posts");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, second);
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn saved_posts_are_ordered_by_save_recency() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;
    let reader = seed_user(&pool, Role::Aspirant, None).await;
    let first = seed_post(&client, author, career, PostKind::Testimony).await;
    let second = seed_post(&client, author, career, PostKind::Question).await;

    client
        .save_post(reader, first)
        .await
        .expect("Failed to save post");
    sqlx::query(
        "
        UPDATE saved_posts
        SET saved_at = saved_at - INTERVAL '1 hour'
        WHERE user_id = $1 AND post_id = $2
        ",
    )
    .bind(reader.get())
    .bind(first.get())
    .execute(&pool)
    .await
    .expect("Failed to backdate save");
    client
        .save_post(reader, second)
        .await
        .expect("Failed to save post");

    let saved = client
        .list_saved_posts(reader)
        .await
        .expect("Failed to list saved posts");

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].id, second);
    assert_eq!(saved[1].id, first);
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn saving_a_missing_post_fails() {
    let (client, pool) = connect().await;
    let reader = seed_user(&pool, Role::Aspirant, None).await;

    let err = client
        .save_post(reader, Id::new(Uuid::new_v4()))
        .await
        .expect_err("Save against a missing post should fail");

    assert!(matches!(err, DbError::PostMissing));
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn saving_under_a_missing_user_fails() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;

    let err = client
        .save_career(Id::new(Uuid::new_v4()), career)
        .await
        .expect_err("Save under a missing user should fail");

    assert!(matches!(err, DbError::UserMissing));
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn saved_careers_round_trip() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Industrial Design").await;
    let reader = seed_user(&pool, Role::Aspirant, None).await;

    client
        .save_career(reader, career)
        .await
        .expect("Failed to save career");
    client
        .save_career(reader, career)
        .await
        .expect("Failed to save career");

    let saved = client
        .list_saved_careers(reader)
        .await
        .expect("Failed to list saved careers");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, career);
    assert_eq!(saved[0].name, "Industrial Design");
    assert_eq!(saved[0].faculty.name, "Engineering");
    assert_eq!(saved[0].tags, ["stem"]);

    client
        .unsave_career(reader, career)
        .await
        .expect("Failed to unsave career");
    let saved = client
        .list_saved_careers(reader)
        .await
        .expect("Failed to list saved careers");
    assert!(saved.is_empty());
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn profile_resolves_an_enrolled_student() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let student = seed_user(&pool, Role::Student, Some(career)).await;

    let profile = client
        .resolve_profile(student)
        .await
        .expect("Failed to resolve profile")
        .expect("Profile should exist");

    assert!(matches!(profile.career, CareerView::Enrolled { .. }));
    assert_eq!(profile.career_label(), "Software Engineering");
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn profile_degrades_an_orphaned_career_reference() {
    let (client, pool) = connect().await;
    let dangling = Id::new(Uuid::new_v4());
    let student = seed_user(&pool, Role::Student, Some(dangling)).await;

    let profile = client
        .resolve_profile(student)
        .await
        .expect("Failed to resolve profile")
        .expect("Profile should exist");

    assert_eq!(profile.user.id, student);
    assert!(matches!(profile.career, CareerView::Orphaned { career_id } if career_id == dangling));
    assert_eq!(profile.career_label(), "Career unavailable");
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn profile_ignores_an_aspirant_career_reference() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let aspirant = seed_user(&pool, Role::Aspirant, Some(career)).await;

    let profile = client
        .resolve_profile(aspirant)
        .await
        .expect("Failed to resolve profile")
        .expect("Profile should exist");

    assert!(matches!(profile.career, CareerView::Aspirant));
    assert_eq!(profile.career_label(), "Aspirant");
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn profile_without_a_career_reference_is_unset() {
    let (client, pool) = connect().await;
    let student = seed_user(&pool, Role::Student, None).await;

    let profile = client
        .resolve_profile(student)
        .await
        .expect("Failed to resolve profile")
        .expect("Profile should exist");

    assert!(matches!(profile.career, CareerView::Unset));
    assert_eq!(profile.career_label(), "No career specified");
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn profile_for_a_missing_user_is_none() {
    let (client, _pool) = connect().await;

    let profile = client
        .resolve_profile(Id::new(Uuid::new_v4()))
        .await
        .expect("Failed to resolve profile");

    assert!(profile.is_none());
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn users_are_found_by_username() {
    let (client, pool) = connect().await;
    let username = unique_username();
    let user_id = seed_named_user(&pool, &username, Role::Aspirant, None).await;

    let username = Username::new(username).unwrap();
    let user = client
        .fetch_user_by_username(&username)
        .await
        .expect("Failed to fetch user")
        .expect("User should exist");

    assert_eq!(user.id, user_id);
    assert_eq!(user.username, username);

    let profile = client
        .resolve_profile_by_username(&username)
        .await
        .expect("Failed to resolve profile")
        .expect("Profile should exist");

    assert_eq!(profile.user.id, user_id);
    assert!(matches!(profile.career, CareerView::Aspirant));
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn careers_are_found_by_slug_and_listed() {
    let (client, pool) = connect().await;
    let career_id = seed_career(&pool, "Architecture").await;

    let career = client
        .fetch_career(career_id)
        .await
        .expect("Failed to fetch career")
        .expect("Career should exist");

    let by_slug = client
        .fetch_career_by_slug(&career.slug)
        .await
        .expect("Failed to fetch career by slug")
        .expect("Career should exist");
    assert_eq!(by_slug.id, career_id);

    let all = client.list_careers().await.expect("Failed to list careers");
    assert!(all.iter().any(|career| career.id == career_id));
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn created_posts_come_back_enriched() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;

    let post = client
        .create_post(
            author,
            career,
            &CreatePost {
                kind: PostKind::Question,
                body: PostBody::new("Is the second year harder?".to_owned()).unwrap(),
            },
        )
        .await
        .expect("Failed to create post");

    assert_eq!(post.kind, PostKind::Question);
    assert_eq!(post.body.get(), "Is the second year harder?");
    assert_eq!(
        post.career.as_ref().map(|career| career.name.as_str()),
        Some("Software Engineering")
    );
    assert_eq!(post.counters.comments, 0);
    assert_eq!(post.counters.likes, 0);
}

#[ignore = "Requires PostgreSQL database"]
#[tokio::test]
async fn creating_a_post_against_missing_references_fails() {
    let (client, pool) = connect().await;
    let career = seed_career(&pool, "Software Engineering").await;
    let author = seed_user(&pool, Role::Student, Some(career)).await;
    let post = CreatePost {
        kind: PostKind::Testimony,
        body: PostBody::new("Posted for the integration suite.".to_owned()).unwrap(),
    };

    let err = client
        .create_post(Id::new(Uuid::new_v4()), career, &post)
        .await
        .expect_err("Create with a missing author should fail");
    assert!(matches!(err, DbError::UserMissing));

    let err = client
        .create_post(author, Id::new(Uuid::new_v4()), &post)
        .await
        .expect_err("Create with a missing career should fail");
    assert!(matches!(err, DbError::CareerMissing));
}
