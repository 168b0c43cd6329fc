use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Comment};

const COMMENT_COLUMNS: &str = r#"
    SELECT comments.id          AS "id",
           body                 AS "body",
           disabled             AS "disabled",
           recipe_id            AS "recipe_id",
           author_id            AS "author_id",
           comments.created_at  AS "created_at",
           users.username       AS "author_username"
    FROM   comments
           JOIN users ON users.id = comments.author_id
"#;

pub async fn add_comment_to_recipe_in_db(
    pool: &SqlitePool,
    author_id: i64,
    recipe_id: i64,
    body: &str,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;

    let recipe = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .fetch_optional(&mut tx)
        .await?;
    if recipe.is_none() {
        return Err(RequestError::NotFound("Recipe not found"));
    }

    let comment_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO comments (body, recipe_id, author_id)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(body)
    .bind(recipe_id)
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;

    tx.commit().await?;

    match get_comment_by_id_in_db(pool, comment_id).await? {
        Some(comment) => Ok(comment),
        None => Err(RequestError::ServerError),
    }
}

pub async fn get_comment_by_id_in_db(
    pool: &SqlitePool,
    comment_id: i64,
) -> Result<Option<Comment>, RequestError> {
    let query = format!("{COMMENT_COLUMNS} WHERE comments.id = $1");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Comments on a recipe, oldest first so a thread reads top to bottom.
pub async fn list_comments_for_recipe_in_db(
    pool: &SqlitePool,
    recipe_id: i64,
    limit: u32,
    offset: u32,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_COLUMNS} WHERE recipe_id = $1 \
         ORDER BY comments.created_at ASC, comments.id ASC LIMIT $2 OFFSET $3"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(recipe_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

/// Moderation queue: every comment, newest first.
pub async fn list_all_comments_in_db(
    pool: &SqlitePool,
    limit: u32,
    offset: u32,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_COLUMNS} ORDER BY comments.created_at DESC, comments.id DESC \
         LIMIT $1 OFFSET $2"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn set_comment_disabled_in_db(
    pool: &SqlitePool,
    comment_id: i64,
    disabled: bool,
) -> Result<Comment, RequestError> {
    let result = sqlx::query("UPDATE comments SET disabled = $1 WHERE id = $2")
        .bind(disabled)
        .bind(comment_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    match get_comment_by_id_in_db(pool, comment_id).await? {
        Some(comment) => Ok(comment),
        None => Err(RequestError::NotFound("Comment not found")),
    }
}
