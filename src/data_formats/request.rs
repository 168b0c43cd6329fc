use serde::{Deserialize, Serialize};

// ----------------- User Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_me: Option<String>,
    pub password: Option<String>,
}

/// Administrator-only profile edit: may also reassign email, username
/// and role (by role name).
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct AdminUpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_me: Option<String>,
    pub role: Option<String>,
}

// ----------------- Recipe Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeIngredientRequest {
    pub amount: f64,
    pub units: String,
    pub name: String,
}

/// Prep and cook times arrive as free text ("1h 30m") and are run
/// through the duration parser before anything touches the database.
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateRecipeRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub img_filename: Option<String>,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientRequest>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub img_filename: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub ingredients: Option<Vec<RecipeIngredientRequest>>,
    pub steps: Option<Vec<String>>,
}

// ----------------- Comment Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub body: String,
}
