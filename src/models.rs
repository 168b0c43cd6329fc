use chrono::NaiveDateTime;

/// Permission bits carried by a role. A role's `permissions` column is
/// the bitwise OR of whatever it grants; `0xff` marks the administrator
/// role.
pub mod permission {
    pub const FOLLOW: i64 = 0x01;
    pub const COMMENT: i64 = 0x02;
    pub const WRITE_RECIPES: i64 = 0x04;
    pub const MODERATE_COMMENTS: i64 = 0x08;
    pub const ADMINISTER: i64 = 0x80;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role_id: i64,
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_me: Option<String>,
    pub member_since: NaiveDateTime,
    pub last_seen: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub is_default: bool,
    pub permissions: i64,
}

/// A directed follow edge. The pair is unique; every user gets a
/// self-edge at registration so the feed query needs no own-content
/// special case.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Follow {
    pub follower_id: i64,
    pub followed_id: i64,
    pub created_at: NaiveDateTime,
}

/// One entry of a follower/following listing: the far endpoint's
/// username plus the edge timestamp.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FollowInfo {
    pub username: String,
    pub followed_at: NaiveDateTime,
}

/// Recipe row as selected by the recipe queries, which always join the
/// author for display. Prep and cook times are stored as whole seconds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub img_filename: Option<String>,
    pub prep_time: i64,
    pub cook_time: i64,
    pub author_id: i64,
    pub created_at: NaiveDateTime,
    pub author_username: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeIngredient {
    pub id: i64,
    pub amount: f64,
    pub units: String,
    pub name: String,
    pub recipe_id: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeStep {
    pub id: i64,
    pub body: String,
    pub recipe_id: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub disabled: bool,
    pub recipe_id: i64,
    pub author_id: i64,
    pub created_at: NaiveDateTime,
    pub author_username: String,
}
