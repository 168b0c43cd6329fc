use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

mod comment_helpers;
mod follow_helpers;
mod recipe_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use follow_helpers::*;
pub use recipe_helpers::*;
pub use user_helpers::*;

/// Builds `UPDATE … SET` statements from optional fields, keeping the
/// bind parameters in the order the placeholders were emitted.
struct QueryBuilder {
    query: String,
    params: Vec<String>,
    started: bool,
}

impl QueryBuilder {
    fn new(initial: &str) -> Self {
        Self {
            query: initial.to_owned(),
            params: Vec::new(),
            started: false,
        }
    }

    fn add_param(mut self, column: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            if self.started {
                self.query.push_str(", ");
            }
            self.query.push_str(column);
            self.query.push_str(" = ?");
            self.params.push(value);
            self.started = true;
        }
        self
    }

    fn is_empty(&self) -> bool {
        !self.started
    }

    fn build(mut self, suffix: &str) -> (String, Vec<String>) {
        self.query.push_str(suffix);
        (self.query, self.params)
    }
}

// ----------------- Shared User Lookups -----------------

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}
