use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
    },
    db_helpers::{
        add_comment_to_recipe_in_db, admin_update_user_in_db, count_feed_in_db,
        count_recipes_in_db, create_recipe_in_db, delete_recipe_in_db, delete_user_in_db,
        follow_user_in_db, get_recipe_by_id_in_db, get_recipe_ingredients_in_db,
        get_recipe_steps_in_db, get_user_by_email, get_user_by_id,
        get_user_by_username, is_following_in_db, list_all_comments_in_db,
        list_comments_for_recipe_in_db, list_feed_in_db, list_followers_in_db,
        list_following_in_db, list_recipes_in_db, ping_user_in_db, set_comment_disabled_in_db,
        unfollow_user_in_db, update_recipe_in_db, update_user_in_db, user_can_in_db,
    },
    duration::{parse_duration, Duration},
    errors::{RequestError, RequestErrorJsonWrapper},
    models::{permission, Recipe},
    AdminUpdateUserRequest, CommentRequest, CommentResponse, CommentWrapper, CreateRecipeRequest,
    FollowResponse, ListQueryParams, LoginRequest, MultipleCommentsWrapper, MultipleFollowsWrapper,
    MultipleRecipesWrapper, ProfileResponse, ProfileWrapper, RecipeListQueryParams, RecipeResponse,
    RecipeWrapper, RegisterRequest, UpdateRecipeRequest, UpdateUserRequest, UserResponse, UserWrapper,
};

type UserJson = UserWrapper<UserResponse>;
type ProfileJson = ProfileWrapper;
type RecipeJson = RecipeWrapper<RecipeResponse>;
type CommentJson = CommentWrapper<CommentResponse>;

type JsonResult<T> = Result<Json<T>, (StatusCode, Json<RequestErrorJsonWrapper>)>;
type JsonError = (StatusCode, Json<RequestErrorJsonWrapper>);

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

fn require_auth(MaybeUser(maybe_user): MaybeUser) -> Result<AuthUser, JsonError> {
    match maybe_user {
        Some(user) => Ok(user),
        None => Err(RequestError::NotAuthorized("Need to be authorized").to_json_response()),
    }
}

async fn require_permission(
    pool: &SqlitePool,
    id: i64,
    permissions: i64,
) -> Result<(), JsonError> {
    let allowed = user_can_in_db(pool, id, permissions)
        .await
        .map_err(|e| e.to_json_response())?;
    if allowed {
        Ok(())
    } else {
        Err(RequestError::Forbidden.to_json_response())
    }
}

/// Authors may touch their own recipes; administrators may touch any.
async fn require_recipe_ownership(
    pool: &SqlitePool,
    user_id: i64,
    recipe: &Recipe,
) -> Result<(), JsonError> {
    if recipe.author_id == user_id {
        return Ok(());
    }
    require_permission(pool, user_id, permission::ADMINISTER).await
}

// ----------------- User Handlers -----------------
pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> JsonResult<UserJson> {
    let user = get_user_by_email(&pool, &request.email)
        .await
        .map_err(|e| e.to_json_response())?;
    let user = match user {
        Some(user) => user,
        None => {
            return Err(RequestError::RunTimeError("Email not found").to_json_response());
        }
    };
    let is_password_correct = verify_password_argon2(request.password, user.password.clone())
        .await
        .map_err(|_| {
            RequestError::RunTimeError("Could not login user\nPlease Try again").to_json_response()
        })?;

    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password").to_json_response());
    }
    let token = get_jwt_token(user.id).map_err(|_| RequestError::ServerError.to_json_response())?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { mut user }): Json<UserWrapper<RegisterRequest>>,
) -> JsonResult<UserJson> {
    user.password = hash_password_argon2(user.password).await.map_err(|_| {
        RequestError::RunTimeError("Could not register user\nPlease Try again").to_json_response()
    })?;

    let user = crate::db_helpers::insert_user(&pool, &user)
        .await
        .map_err(|e| {
            if let RequestError::DatabaseError(sqlx::Error::Database(e)) = &e {
                if e.message().contains("UNIQUE constraint failed") {
                    return RequestError::RunTimeError("Email or username already exists")
                        .to_json_response();
                }
            }
            e.to_json_response()
        })?;

    let token = get_jwt_token(user.id).map_err(|_| {
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
            .to_json_response()
    })?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<UserJson> {
    let AuthUser { id, token } = require_auth(maybe_user)?;
    ping_user_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    let user = get_user_by_id(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    let user = match user {
        Some(user) => user,
        None => {
            return Err(RequestError::NotFound("User not found").to_json_response());
        }
    };
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn update_user(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { user }): Json<UserWrapper<UpdateUserRequest>>,
) -> JsonResult<UserJson> {
    let AuthUser { id, token } = require_auth(maybe_user)?;
    let user = update_user_in_db(&pool, id, user)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn delete_current_user(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<StatusCode, JsonError> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    delete_user_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Profile Handlers -----------------
pub async fn get_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(username): Path<String>,
) -> JsonResult<ProfileJson> {
    let profile = get_user_by_username(&pool, &username)
        .await
        .map_err(|e| e.to_json_response())?;
    let profile = match profile {
        Some(profile) => profile,
        None => return Err(RequestError::NotFound("User not found").to_json_response()),
    };
    let following = match maybe_user.get_id() {
        Some(viewer_id) => is_following_in_db(&pool, viewer_id, profile.id)
            .await
            .map_err(|e| e.to_json_response())?,
        None => false,
    };
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(profile, following),
    }))
}

pub async fn follow_profile(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
) -> JsonResult<ProfileJson> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    require_permission(&pool, id, permission::FOLLOW).await?;
    let profile = follow_user_in_db(&pool, id, &username)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(profile, true),
    }))
}

pub async fn unfollow_profile(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
) -> JsonResult<ProfileJson> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    require_permission(&pool, id, permission::FOLLOW).await?;
    let profile = unfollow_user_in_db(&pool, id, &username)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(profile, false),
    }))
}

pub async fn list_followers(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
    Query(params): Query<ListQueryParams>,
) -> JsonResult<MultipleFollowsWrapper> {
    let user = match get_user_by_username(&pool, &username)
        .await
        .map_err(|e| e.to_json_response())?
    {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found").to_json_response()),
    };
    let follows = list_followers_in_db(&pool, user.id, params.capped_limit(), params.offset)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(MultipleFollowsWrapper {
        follows: follows.into_iter().map(FollowResponse::new).collect(),
    }))
}

pub async fn list_following(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
    Query(params): Query<ListQueryParams>,
) -> JsonResult<MultipleFollowsWrapper> {
    let user = match get_user_by_username(&pool, &username)
        .await
        .map_err(|e| e.to_json_response())?
    {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found").to_json_response()),
    };
    let follows = list_following_in_db(&pool, user.id, params.capped_limit(), params.offset)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(MultipleFollowsWrapper {
        follows: follows.into_iter().map(FollowResponse::new).collect(),
    }))
}

// ----------------- Admin Handlers -----------------
pub async fn update_user_admin(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
    Json(UserWrapper { user: request }): Json<UserWrapper<AdminUpdateUserRequest>>,
) -> JsonResult<ProfileJson> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    require_permission(&pool, id, permission::ADMINISTER).await?;
    let updated = admin_update_user_in_db(&pool, &username, request)
        .await
        .map_err(|e| e.to_json_response())?;
    let following = is_following_in_db(&pool, id, updated.id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(updated, following),
    }))
}

// ----------------- Recipe Handlers -----------------
pub async fn list_recipes(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<RecipeListQueryParams>,
) -> JsonResult<MultipleRecipesWrapper> {
    let author = params.author.as_deref();
    let recipes = list_recipes_in_db(&pool, author, params.capped_limit(), params.offset)
        .await
        .map_err(|e| e.to_json_response())?;
    let recipes_count = count_recipes_in_db(&pool, author)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(MultipleRecipesWrapper {
        recipes: recipes.into_iter().map(RecipeResponse::new).collect(),
        recipes_count,
    }))
}

pub async fn feed_recipes(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<ListQueryParams>,
) -> JsonResult<MultipleRecipesWrapper> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    let recipes = list_feed_in_db(&pool, id, params.capped_limit(), params.offset)
        .await
        .map_err(|e| e.to_json_response())?;
    let recipes_count = count_feed_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(MultipleRecipesWrapper {
        recipes: recipes.into_iter().map(RecipeResponse::new).collect(),
        recipes_count,
    }))
}

fn parse_required_duration(input: &str, message: &'static str) -> Result<Duration, JsonError> {
    match parse_duration(input) {
        Some(duration) => Ok(duration),
        None => Err(RequestError::RunTimeError(message).to_json_response()),
    }
}

pub async fn create_recipe(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(RecipeWrapper { recipe: request }): Json<RecipeWrapper<CreateRecipeRequest>>,
) -> JsonResult<RecipeJson> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    require_permission(&pool, id, permission::WRITE_RECIPES).await?;

    let prep_time = parse_required_duration(&request.prep_time, "Enter a valid prep time")?;
    let cook_time = parse_required_duration(&request.cook_time, "Enter a valid cook time")?;

    let recipe = create_recipe_in_db(&pool, id, &request, prep_time, cook_time)
        .await
        .map_err(|e| e.to_json_response())?;
    recipe_with_details(&pool, recipe).await
}

pub async fn get_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> JsonResult<RecipeJson> {
    let recipe = get_recipe_by_id_in_db(&pool, id)
        .await
        .map_err(|e| e.to_json_response())?;
    let recipe = match recipe {
        Some(recipe) => recipe,
        None => return Err(RequestError::NotFound("Recipe not found").to_json_response()),
    };
    recipe_with_details(&pool, recipe).await
}

pub async fn update_recipe(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(recipe_id): Path<i64>,
    Json(RecipeWrapper { recipe: request }): Json<RecipeWrapper<UpdateRecipeRequest>>,
) -> JsonResult<RecipeJson> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    let recipe = match get_recipe_by_id_in_db(&pool, recipe_id)
        .await
        .map_err(|e| e.to_json_response())?
    {
        Some(recipe) => recipe,
        None => return Err(RequestError::NotFound("Recipe not found").to_json_response()),
    };
    require_recipe_ownership(&pool, id, &recipe).await?;

    let prep_time = match request.prep_time.as_deref() {
        Some(input) => Some(parse_required_duration(input, "Enter a valid prep time")?),
        None => None,
    };
    let cook_time = match request.cook_time.as_deref() {
        Some(input) => Some(parse_required_duration(input, "Enter a valid cook time")?),
        None => None,
    };

    let recipe = update_recipe_in_db(&pool, recipe_id, request, prep_time, cook_time)
        .await
        .map_err(|e| e.to_json_response())?;
    recipe_with_details(&pool, recipe).await
}

pub async fn delete_recipe(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(recipe_id): Path<i64>,
) -> Result<StatusCode, JsonError> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    let recipe = match get_recipe_by_id_in_db(&pool, recipe_id)
        .await
        .map_err(|e| e.to_json_response())?
    {
        Some(recipe) => recipe,
        None => return Err(RequestError::NotFound("Recipe not found").to_json_response()),
    };
    require_recipe_ownership(&pool, id, &recipe).await?;
    delete_recipe_in_db(&pool, recipe_id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::NO_CONTENT)
}

async fn recipe_with_details(pool: &SqlitePool, recipe: Recipe) -> JsonResult<RecipeJson> {
    let ingredients = get_recipe_ingredients_in_db(pool, recipe.id)
        .await
        .map_err(|e| e.to_json_response())?;
    let steps = get_recipe_steps_in_db(pool, recipe.id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(RecipeWrapper {
        recipe: RecipeResponse::new(recipe).with_details(ingredients, steps),
    }))
}

// ----------------- Comment Handlers -----------------
pub async fn list_comments(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(recipe_id): Path<i64>,
    Query(params): Query<ListQueryParams>,
) -> JsonResult<MultipleCommentsWrapper> {
    let comments =
        list_comments_for_recipe_in_db(&pool, recipe_id, params.capped_limit(), params.offset)
            .await
            .map_err(|e| e.to_json_response())?;
    Ok(Json(MultipleCommentsWrapper {
        comments: comments.into_iter().map(CommentResponse::new).collect(),
    }))
}

pub async fn add_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(recipe_id): Path<i64>,
    Json(CommentWrapper { comment: request }): Json<CommentWrapper<CommentRequest>>,
) -> JsonResult<CommentJson> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    require_permission(&pool, id, permission::COMMENT).await?;
    let comment = add_comment_to_recipe_in_db(&pool, id, recipe_id, &request.body)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(CommentWrapper {
        comment: CommentResponse::new(comment),
    }))
}

pub async fn list_all_comments(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<ListQueryParams>,
) -> JsonResult<MultipleCommentsWrapper> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    require_permission(&pool, id, permission::MODERATE_COMMENTS).await?;
    let comments = list_all_comments_in_db(&pool, params.capped_limit(), params.offset)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(MultipleCommentsWrapper {
        comments: comments.into_iter().map(CommentResponse::new).collect(),
    }))
}

pub async fn enable_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(comment_id): Path<i64>,
) -> JsonResult<CommentJson> {
    set_comment_disabled(maybe_user, pool, comment_id, false).await
}

pub async fn disable_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(comment_id): Path<i64>,
) -> JsonResult<CommentJson> {
    set_comment_disabled(maybe_user, pool, comment_id, true).await
}

async fn set_comment_disabled(
    maybe_user: MaybeUser,
    pool: Arc<SqlitePool>,
    comment_id: i64,
    disabled: bool,
) -> JsonResult<CommentJson> {
    let AuthUser { id, .. } = require_auth(maybe_user)?;
    require_permission(&pool, id, permission::MODERATE_COMMENTS).await?;
    let comment = set_comment_disabled_in_db(&pool, comment_id, disabled)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(CommentWrapper {
        comment: CommentResponse::new(comment),
    }))
}
