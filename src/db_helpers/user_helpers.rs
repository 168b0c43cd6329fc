use sqlx::{Sqlite, SqlitePool};

use crate::{
    authentication::hash_password_argon2,
    data_formats::{AdminUpdateUserRequest, RegisterRequest, UpdateUserRequest},
    errors::RequestError,
    models::{Role, User},
};

use super::{get_user_by_id, get_user_by_username, QueryBuilder};

/// Inserts the user and its self-follow edge in one transaction, so the
/// feed invariant holds from the instant the account exists. The caller
/// supplies an already-hashed password. Registration picks the default
/// role unless the email matches `STOCKPOT_ADMIN`, which gets the
/// administrator role.
pub async fn insert_user(pool: &SqlitePool, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;

    let admin_email = std::env::var("STOCKPOT_ADMIN").ok();
    let role_query = if admin_email.as_deref() == Some(user.email.as_str()) {
        "SELECT id FROM roles WHERE permissions = 255"
    } else {
        "SELECT id FROM roles WHERE is_default = TRUE"
    };
    let role_id = sqlx::query_scalar::<Sqlite, i64>(role_query)
        .fetch_one(&mut tx)
        .await?;

    let user = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (email, username, password, role_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password)
    .bind(role_id)
    .fetch_one(&mut tx)
    .await?;

    sqlx::query("INSERT INTO follows (follower_id, followed_id) VALUES ($1, $1)")
        .bind(user.id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(user)
}

pub async fn update_user_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateUserRequest {
        name,
        location,
        about_me,
        password,
    }: UpdateUserRequest,
) -> Result<User, RequestError> {
    let password = match password {
        Some(password) => Some(
            hash_password_argon2(password)
                .await
                .map_err(|_| RequestError::ServerError)?,
        ),
        None => None,
    };

    let builder = QueryBuilder::new("UPDATE users SET ")
        .add_param("name", name)
        .add_param("location", location)
        .add_param("about_me", about_me)
        .add_param("password", password);

    if !builder.is_empty() {
        let (query, params) = builder.build(" WHERE id = ?");
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(id).execute(pool).await?;
    }

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

/// Administrator edit of an arbitrary profile, including reassigning
/// the role by name.
pub async fn admin_update_user_in_db(
    pool: &SqlitePool,
    username: &str,
    AdminUpdateUserRequest {
        email,
        username: new_username,
        name,
        location,
        about_me,
        role,
    }: AdminUpdateUserRequest,
) -> Result<User, RequestError> {
    let target = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };

    let role_id = match role {
        Some(role_name) => match get_role_by_name(pool, &role_name).await? {
            Some(role) => Some(role.id.to_string()),
            None => return Err(RequestError::RunTimeError("Unknown role")),
        },
        None => None,
    };

    let builder = QueryBuilder::new("UPDATE users SET ")
        .add_param("email", email)
        .add_param("username", new_username)
        .add_param("name", name)
        .add_param("location", location)
        .add_param("about_me", about_me)
        .add_param("role_id", role_id);

    if !builder.is_empty() {
        let (query, params) = builder.build(" WHERE id = ?");
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(target.id).execute(pool).await?;
    }

    match get_user_by_id(pool, target.id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

pub async fn get_role_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<Role>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Role>("SELECT * FROM roles WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// True when the user's role grants every bit in `permissions`.
pub async fn user_can_in_db(
    pool: &SqlitePool,
    id: i64,
    permissions: i64,
) -> Result<bool, RequestError> {
    let granted = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT roles.permissions
        FROM users JOIN roles ON roles.id = users.role_id
        WHERE users.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(matches!(granted, Some(bits) if bits & permissions == permissions))
}

/// Refreshes the user's last-seen timestamp.
pub async fn ping_user_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    sqlx::query("UPDATE users SET last_seen = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes the account. Follow edges in both directions, recipes and
/// comments go with it through the schema's cascading deletes.
pub async fn delete_user_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    Ok(())
}
