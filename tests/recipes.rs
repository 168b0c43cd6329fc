use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use stockpot::db_helpers::{
    add_comment_to_recipe_in_db, count_recipes_in_db, create_recipe_in_db, delete_recipe_in_db,
    get_recipe_ingredients_in_db, get_recipe_steps_in_db, insert_user,
    list_comments_for_recipe_in_db, list_recipes_in_db, set_comment_disabled_in_db,
    update_recipe_in_db, user_can_in_db,
};
use stockpot::duration::{parse_duration, Duration};
use stockpot::errors::RequestError;
use stockpot::models::{permission, User};
use stockpot::{CreateRecipeRequest, RecipeIngredientRequest, RegisterRequest, UpdateRecipeRequest};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

async fn register(pool: &SqlitePool, username: &str) -> User {
    insert_user(
        pool,
        &RegisterRequest {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            password: "not-a-real-hash".to_string(),
        },
    )
    .await
    .expect("failed to insert user")
}

fn pancake_request() -> CreateRecipeRequest {
    CreateRecipeRequest {
        title: "Pancakes".to_string(),
        description: Some("Weekend breakfast".to_string()),
        img_filename: None,
        prep_time: "15m".to_string(),
        cook_time: "20m".to_string(),
        ingredients: vec![
            RecipeIngredientRequest {
                amount: 200.0,
                units: "g".to_string(),
                name: "flour".to_string(),
            },
            RecipeIngredientRequest {
                amount: 2.0,
                units: "unit".to_string(),
                name: "eggs".to_string(),
            },
        ],
        steps: vec!["Mix everything".to_string(), "Fry in batches".to_string()],
    }
}

#[tokio::test]
async fn create_stores_ingredients_and_steps() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let request = pancake_request();
    let prep = parse_duration(&request.prep_time).unwrap();
    let cook = parse_duration(&request.cook_time).unwrap();

    let recipe = create_recipe_in_db(&pool, alice.id, &request, prep, cook)
        .await
        .unwrap();
    assert_eq!(recipe.author_username, "alice");
    assert_eq!(recipe.prep_time, 15 * 60);

    let ingredients = get_recipe_ingredients_in_db(&pool, recipe.id).await.unwrap();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0].name, "flour");

    let steps = get_recipe_steps_in_db(&pool, recipe.id).await.unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].body, "Mix everything");
}

#[tokio::test]
async fn ingredient_names_are_deduplicated_across_recipes() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let request = pancake_request();
    let zero = Duration::default();

    create_recipe_in_db(&pool, alice.id, &request, zero, zero)
        .await
        .unwrap();
    create_recipe_in_db(&pool, alice.id, &request, zero, zero)
        .await
        .unwrap();

    let flour_rows = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM ingredients WHERE name = 'flour'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(flour_rows, 1);
}

#[tokio::test]
async fn update_replaces_step_list_and_patches_durations() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let request = pancake_request();
    let zero = Duration::default();
    let recipe = create_recipe_in_db(&pool, alice.id, &request, zero, zero)
        .await
        .unwrap();

    let update = UpdateRecipeRequest {
        steps: Some(vec!["One single step".to_string()]),
        ..Default::default()
    };
    let updated = update_recipe_in_db(
        &pool,
        recipe.id,
        update,
        Some(parse_duration("1h 30m").unwrap()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(updated.prep_time, 90 * 60);
    assert_eq!(updated.cook_time, 0);
    let steps = get_recipe_steps_in_db(&pool, recipe.id).await.unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].body, "One single step");
}

#[tokio::test]
async fn listing_filters_by_author_username() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let bob = register(&pool, "bob").await;
    let zero = Duration::default();
    create_recipe_in_db(&pool, alice.id, &pancake_request(), zero, zero)
        .await
        .unwrap();
    create_recipe_in_db(&pool, alice.id, &pancake_request(), zero, zero)
        .await
        .unwrap();
    create_recipe_in_db(&pool, bob.id, &pancake_request(), zero, zero)
        .await
        .unwrap();

    let alices = list_recipes_in_db(&pool, Some("alice"), 20, 0).await.unwrap();
    assert_eq!(alices.len(), 2);
    assert!(alices.iter().all(|r| r.author_username == "alice"));

    let everyones = list_recipes_in_db(&pool, None, 20, 0).await.unwrap();
    assert_eq!(everyones.len(), 3);

    let nobodys = list_recipes_in_db(&pool, Some("carol"), 20, 0).await.unwrap();
    assert!(nobodys.is_empty());
}

#[tokio::test]
async fn count_covers_all_matching_rows_not_just_one_page() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let bob = register(&pool, "bob").await;
    let zero = Duration::default();
    for _ in 0..3 {
        create_recipe_in_db(&pool, alice.id, &pancake_request(), zero, zero)
            .await
            .unwrap();
    }
    create_recipe_in_db(&pool, bob.id, &pancake_request(), zero, zero)
        .await
        .unwrap();

    let page = list_recipes_in_db(&pool, None, 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(count_recipes_in_db(&pool, None).await.unwrap(), 4);
    assert_eq!(count_recipes_in_db(&pool, Some("alice")).await.unwrap(), 3);
}

#[tokio::test]
async fn delete_cascades_recipe_children() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let request = pancake_request();
    let zero = Duration::default();
    let recipe = create_recipe_in_db(&pool, alice.id, &request, zero, zero)
        .await
        .unwrap();
    add_comment_to_recipe_in_db(&pool, alice.id, recipe.id, "Looks great")
        .await
        .unwrap();

    delete_recipe_in_db(&pool, recipe.id).await.unwrap();

    let orphans = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT (SELECT COUNT(*) FROM recipe_ingredients WHERE recipe_id = $1)
              + (SELECT COUNT(*) FROM recipe_steps WHERE recipe_id = $1)
              + (SELECT COUNT(*) FROM comments WHERE recipe_id = $1)",
    )
    .bind(recipe.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn commenting_on_a_missing_recipe_is_not_found() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let result = add_comment_to_recipe_in_db(&pool, alice.id, 999, "hello").await;
    assert!(matches!(result, Err(RequestError::NotFound(_))));
}

#[tokio::test]
async fn moderation_toggles_the_disabled_flag() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let zero = Duration::default();
    let recipe = create_recipe_in_db(&pool, alice.id, &pancake_request(), zero, zero)
        .await
        .unwrap();
    let comment = add_comment_to_recipe_in_db(&pool, alice.id, recipe.id, "Too salty")
        .await
        .unwrap();
    assert!(!comment.disabled);

    let disabled = set_comment_disabled_in_db(&pool, comment.id, true)
        .await
        .unwrap();
    assert!(disabled.disabled);

    let listed = list_comments_for_recipe_in_db(&pool, recipe.id, 20, 0)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].disabled);
}

#[tokio::test]
async fn default_role_lacks_moderation_and_admin_bits() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    assert!(user_can_in_db(&pool, alice.id, permission::FOLLOW)
        .await
        .unwrap());
    assert!(user_can_in_db(&pool, alice.id, permission::WRITE_RECIPES)
        .await
        .unwrap());
    assert!(!user_can_in_db(&pool, alice.id, permission::MODERATE_COMMENTS)
        .await
        .unwrap());
    assert!(!user_can_in_db(&pool, alice.id, permission::ADMINISTER)
        .await
        .unwrap());
}
