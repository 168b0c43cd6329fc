use serde::{Deserialize, Serialize};

use crate::duration::{format_duration, Duration};
use crate::models::{Comment, FollowInfo, Recipe, RecipeIngredient, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub token: String,
    pub username: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_me: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct ProfileResponse {
    pub username: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_me: String,
    #[serde(rename = "memberSince")]
    pub member_since: String,
    #[serde(rename = "lastSeen")]
    pub last_seen: String,
    pub following: bool,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct FollowResponse {
    pub username: String,
    #[serde(rename = "followedAt")]
    pub followed_at: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeIngredientResponse {
    pub amount: f64,
    pub units: String,
    pub name: String,
}

/// Prep and cook times go out in the canonical `"0d 1h 30m 0s"` form.
/// Listings leave `ingredients` and `steps` empty; the single-recipe
/// endpoint fills them in.
#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "imgFilename")]
    pub img_filename: Option<String>,
    #[serde(rename = "prepTime")]
    pub prep_time: String,
    #[serde(rename = "cookTime")]
    pub cook_time: String,
    pub author: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub steps: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub body: String,
    pub disabled: bool,
    pub author: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl UserResponse {
    pub fn new(
        User {
            email,
            username,
            name,
            location,
            about_me,
            ..
        }: User,
        token: String,
    ) -> Self {
        UserResponse {
            email,
            token,
            username,
            name,
            location,
            about_me: about_me.unwrap_or_default(),
        }
    }
}

impl ProfileResponse {
    pub fn new(
        User {
            username,
            name,
            location,
            about_me,
            member_since,
            last_seen,
            ..
        }: User,
        following: bool,
    ) -> Self {
        ProfileResponse {
            username,
            name,
            location,
            about_me: about_me.unwrap_or_default(),
            member_since: member_since.to_string(),
            last_seen: last_seen.to_string(),
            following,
        }
    }
}

impl FollowResponse {
    pub fn new(FollowInfo { username, followed_at }: FollowInfo) -> Self {
        FollowResponse {
            username,
            followed_at: followed_at.to_string(),
        }
    }
}

impl RecipeResponse {
    pub fn new(
        Recipe {
            id,
            title,
            description,
            img_filename,
            prep_time,
            cook_time,
            created_at,
            author_username,
            ..
        }: Recipe,
    ) -> Self {
        RecipeResponse {
            id,
            title,
            description: description.unwrap_or_default(),
            img_filename,
            prep_time: format_duration(Some(Duration::from_seconds(prep_time))),
            cook_time: format_duration(Some(Duration::from_seconds(cook_time))),
            author: author_username,
            created_at: created_at.to_string(),
            ingredients: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_details(
        mut self,
        ingredients: Vec<RecipeIngredient>,
        steps: Vec<crate::models::RecipeStep>,
    ) -> Self {
        self.ingredients = ingredients
            .into_iter()
            .map(
                |RecipeIngredient {
                     amount, units, name, ..
                 }| RecipeIngredientResponse { amount, units, name },
            )
            .collect();
        self.steps = steps.into_iter().map(|step| step.body).collect();
        self
    }
}

impl CommentResponse {
    pub fn new(
        Comment {
            id,
            body,
            disabled,
            created_at,
            author_username,
            ..
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            body,
            disabled,
            author: author_username,
            created_at: created_at.to_string(),
        }
    }
}
