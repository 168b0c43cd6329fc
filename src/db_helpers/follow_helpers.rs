use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Follow, FollowInfo, User},
};

use super::get_user_by_username;

const FOLLOWERS_QUERY: &str = r#"
    SELECT users.username      AS "username",
           follows.created_at  AS "followed_at"
    FROM   follows
           JOIN users ON users.id = follows.follower_id
    WHERE  follows.followed_id = $1
    ORDER  BY follows.created_at DESC, follows.follower_id ASC
    LIMIT  $2 OFFSET $3
"#;

const FOLLOWING_QUERY: &str = r#"
    SELECT users.username      AS "username",
           follows.created_at  AS "followed_at"
    FROM   follows
           JOIN users ON users.id = follows.followed_id
    WHERE  follows.follower_id = $1
    ORDER  BY follows.created_at DESC, follows.followed_id ASC
    LIMIT  $2 OFFSET $3
"#;

/// Inserts the edge follower -> followed. Calling it twice, or losing a
/// race against a concurrent duplicate insert, is a no-op: the primary
/// key on (follower_id, followed_id) absorbs the conflict.
pub async fn follow_user_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    username: &str,
) -> Result<User, RequestError> {
    let followed = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };
    sqlx::query(
        r#"
        INSERT INTO follows (follower_id, followed_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(follower_id)
    .bind(followed.id)
    .execute(pool)
    .await?;
    Ok(followed)
}

/// Deletes the edge follower -> followed if present; deleting a missing
/// edge is a no-op. The self-edge is only ever re-created at
/// registration, so unfollowing oneself sticks.
pub async fn unfollow_user_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    username: &str,
) -> Result<User, RequestError> {
    let followed = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };
    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
        .bind(follower_id)
        .bind(followed.id)
        .execute(pool)
        .await?;
    Ok(followed)
}

pub async fn get_follow_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    followed_id: i64,
) -> Result<Option<Follow>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Follow>(
        "SELECT * FROM follows WHERE follower_id = $1 AND followed_id = $2",
    )
    .bind(follower_id)
    .bind(followed_id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn is_following_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    followed_id: i64,
) -> Result<bool, RequestError> {
    Ok(get_follow_in_db(pool, follower_id, followed_id)
        .await?
        .is_some())
}

/// Same edge set as [`is_following_in_db`], direction swapped.
pub async fn is_followed_by_in_db(
    pool: &SqlitePool,
    user_id: i64,
    other_id: i64,
) -> Result<bool, RequestError> {
    is_following_in_db(pool, other_id, user_id).await
}

pub async fn list_followers_in_db(
    pool: &SqlitePool,
    user_id: i64,
    limit: u32,
    offset: u32,
) -> Result<Vec<FollowInfo>, RequestError> {
    let result = sqlx::query_as::<Sqlite, FollowInfo>(FOLLOWERS_QUERY)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn list_following_in_db(
    pool: &SqlitePool,
    user_id: i64,
    limit: u32,
    offset: u32,
) -> Result<Vec<FollowInfo>, RequestError> {
    let result = sqlx::query_as::<Sqlite, FollowInfo>(FOLLOWING_QUERY)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(result)
}
