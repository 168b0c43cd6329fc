use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::{CreateRecipeRequest, RecipeIngredientRequest, UpdateRecipeRequest};
use crate::duration::Duration;
use crate::errors::RequestError;
use crate::models::{Recipe, RecipeIngredient, RecipeStep};

use super::QueryBuilder;

const RECIPE_QUERY: &str = r#"
    SELECT recipes.id          AS "id",
           title               AS "title",
           description         AS "description",
           img_filename        AS "img_filename",
           prep_time           AS "prep_time",
           cook_time           AS "cook_time",
           author_id           AS "author_id",
           recipes.created_at  AS "created_at",
           users.username      AS "author_username"
    FROM   recipes
           JOIN users ON users.id = recipes.author_id
    ORDER  BY recipes.created_at DESC, recipes.id DESC
    LIMIT  $1 OFFSET $2
"#;

const AUTHOR_RECIPE_QUERY: &str = r#"
    SELECT recipes.id          AS "id",
           title               AS "title",
           description         AS "description",
           img_filename        AS "img_filename",
           prep_time           AS "prep_time",
           cook_time           AS "cook_time",
           author_id           AS "author_id",
           recipes.created_at  AS "created_at",
           users.username      AS "author_username"
    FROM   recipes
           JOIN users ON users.id = recipes.author_id
    WHERE  users.username = $1
    ORDER  BY recipes.created_at DESC, recipes.id DESC
    LIMIT  $2 OFFSET $3
"#;

/// Feed of recipes authored by anyone the viewer follows. The self-edge
/// created at registration makes the viewer's own recipes part of the
/// result without a special case.
const FEED_QUERY: &str = r#"
    SELECT recipes.id          AS "id",
           title               AS "title",
           description         AS "description",
           img_filename        AS "img_filename",
           prep_time           AS "prep_time",
           cook_time           AS "cook_time",
           author_id           AS "author_id",
           recipes.created_at  AS "created_at",
           users.username      AS "author_username"
    FROM   recipes
           JOIN users ON users.id = recipes.author_id
           JOIN follows ON follows.followed_id = recipes.author_id
    WHERE  follows.follower_id = $1
    ORDER  BY recipes.created_at DESC, recipes.id DESC
    LIMIT  $2 OFFSET $3
"#;

const SINGLE_RECIPE_QUERY: &str = r#"
    SELECT recipes.id          AS "id",
           title               AS "title",
           description         AS "description",
           img_filename        AS "img_filename",
           prep_time           AS "prep_time",
           cook_time           AS "cook_time",
           author_id           AS "author_id",
           recipes.created_at  AS "created_at",
           users.username      AS "author_username"
    FROM   recipes
           JOIN users ON users.id = recipes.author_id
    WHERE  recipes.id = $1
"#;

const INGREDIENTS_QUERY: &str = r#"
    SELECT recipe_ingredients.id  AS "id",
           amount                 AS "amount",
           units                  AS "units",
           ingredients.name       AS "name",
           recipe_id              AS "recipe_id"
    FROM   recipe_ingredients
           JOIN ingredients ON ingredients.id = recipe_ingredients.ingredient_id
    WHERE  recipe_id = $1
    ORDER  BY recipe_ingredients.id ASC
"#;

/// Lists recipes newest first, optionally restricted to one author's
/// username. An unknown author simply matches nothing.
pub async fn list_recipes_in_db(
    pool: &SqlitePool,
    author: Option<&str>,
    limit: u32,
    offset: u32,
) -> Result<Vec<Recipe>, RequestError> {
    let result = match author {
        Some(author) => {
            sqlx::query_as::<Sqlite, Recipe>(AUTHOR_RECIPE_QUERY)
                .bind(author)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as::<Sqlite, Recipe>(RECIPE_QUERY)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(result)
}

/// Total number of recipes matching the listing filter, independent of
/// pagination.
pub async fn count_recipes_in_db(
    pool: &SqlitePool,
    author: Option<&str>,
) -> Result<i64, RequestError> {
    let result = match author {
        Some(author) => {
            sqlx::query_scalar::<Sqlite, i64>(
                r#"
                SELECT COUNT(*)
                FROM   recipes
                       JOIN users ON users.id = recipes.author_id
                WHERE  users.username = $1
                "#,
            )
            .bind(author)
            .fetch_one(pool)
            .await?
        }
        None => {
            sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM recipes")
                .fetch_one(pool)
                .await?
        }
    };
    Ok(result)
}

pub async fn count_feed_in_db(pool: &SqlitePool, user_id: i64) -> Result<i64, RequestError> {
    let result = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT COUNT(*)
        FROM   recipes
               JOIN follows ON follows.followed_id = recipes.author_id
        WHERE  follows.follower_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(result)
}

pub async fn list_feed_in_db(
    pool: &SqlitePool,
    user_id: i64,
    limit: u32,
    offset: u32,
) -> Result<Vec<Recipe>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Recipe>(FEED_QUERY)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn get_recipe_by_id_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Recipe>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Recipe>(SINGLE_RECIPE_QUERY)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_recipe_ingredients_in_db(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredient>, RequestError> {
    let result = sqlx::query_as::<Sqlite, RecipeIngredient>(INGREDIENTS_QUERY)
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn get_recipe_steps_in_db(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<RecipeStep>, RequestError> {
    let result = sqlx::query_as::<Sqlite, RecipeStep>(
        "SELECT * FROM recipe_steps WHERE recipe_id = $1 ORDER BY id ASC",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}

/// Durations arrive already parsed; the handler owns the free-text
/// validation.
pub async fn create_recipe_in_db(
    pool: &SqlitePool,
    author_id: i64,
    request: &CreateRecipeRequest,
    prep_time: Duration,
    cook_time: Duration,
) -> Result<Recipe, RequestError> {
    let mut tx = pool.begin().await?;

    let recipe_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO recipes (title, description, img_filename, prep_time, cook_time, author_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&request.title)
    .bind(request.description.as_deref())
    .bind(request.img_filename.as_deref())
    .bind(prep_time.as_seconds())
    .bind(cook_time.as_seconds())
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;

    insert_ingredient_rows(&mut tx, recipe_id, &request.ingredients).await?;
    insert_step_rows(&mut tx, recipe_id, &request.steps).await?;

    tx.commit().await?;

    match get_recipe_by_id_in_db(pool, recipe_id).await? {
        Some(recipe) => Ok(recipe),
        None => Err(RequestError::ServerError),
    }
}

/// Scalar fields are patched in place; a provided ingredient or step
/// list replaces the stored one wholesale.
pub async fn update_recipe_in_db(
    pool: &SqlitePool,
    recipe_id: i64,
    UpdateRecipeRequest {
        title,
        description,
        img_filename,
        ingredients,
        steps,
        ..
    }: UpdateRecipeRequest,
    prep_time: Option<Duration>,
    cook_time: Option<Duration>,
) -> Result<Recipe, RequestError> {
    let mut tx = pool.begin().await?;

    let builder = QueryBuilder::new("UPDATE recipes SET ")
        .add_param("title", title)
        .add_param("description", description)
        .add_param("img_filename", img_filename)
        .add_param("prep_time", prep_time.map(|d| d.as_seconds().to_string()))
        .add_param("cook_time", cook_time.map(|d| d.as_seconds().to_string()));

    if !builder.is_empty() {
        let (query, params) = builder.build(" WHERE id = ?");
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(recipe_id).execute(&mut tx).await?;
    }

    if let Some(ingredients) = ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut tx)
            .await?;
        insert_ingredient_rows(&mut tx, recipe_id, &ingredients).await?;
    }

    if let Some(steps) = steps {
        sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut tx)
            .await?;
        insert_step_rows(&mut tx, recipe_id, &steps).await?;
    }

    tx.commit().await?;

    match get_recipe_by_id_in_db(pool, recipe_id).await? {
        Some(recipe) => Ok(recipe),
        None => Err(RequestError::NotFound("Recipe not found")),
    }
}

pub async fn delete_recipe_in_db(pool: &SqlitePool, recipe_id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Recipe not found"));
    }
    Ok(())
}

/// Ingredient names are de-duplicated into the `ingredients` table via
/// upsert before the per-recipe rows point at them.
async fn insert_ingredient_rows(
    tx: &mut Transaction<'_, Sqlite>,
    recipe_id: i64,
    ingredients: &[RecipeIngredientRequest],
) -> Result<(), RequestError> {
    for ingredient in ingredients {
        let ingredient_id = sqlx::query_scalar::<Sqlite, i64>(
            r#"
            INSERT INTO ingredients (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = $1
            RETURNING id
            "#,
        )
        .bind(&ingredient.name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (amount, units, ingredient_id, recipe_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(ingredient.amount)
        .bind(&ingredient.units)
        .bind(ingredient_id)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}

async fn insert_step_rows(
    tx: &mut Transaction<'_, Sqlite>,
    recipe_id: i64,
    steps: &[String],
) -> Result<(), RequestError> {
    for step in steps {
        sqlx::query("INSERT INTO recipe_steps (body, recipe_id) VALUES ($1, $2)")
            .bind(step)
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
    }
    Ok(())
}
