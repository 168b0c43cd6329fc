use serde::{Deserialize, Serialize};

use super::response::{CommentResponse, FollowResponse, ProfileResponse, RecipeResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfileWrapper {
    pub profile: ProfileResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RecipeWrapper<T> {
    pub recipe: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentWrapper<T> {
    pub comment: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleRecipesWrapper {
    pub recipes: Vec<RecipeResponse>,
    /// Total matching rows, not the size of the returned page.
    #[serde(rename = "recipesCount")]
    pub recipes_count: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleCommentsWrapper {
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleFollowsWrapper {
    pub follows: Vec<FollowResponse>,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}
