pub mod authentication;
pub mod data_formats;
pub mod db_helpers;
pub mod duration;
pub mod errors;
pub mod handlers;
pub mod models;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use data_formats::*;
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr) -> Result<()> {
    let db = init_db().await?;
    serve_app(app, address, db).await
}

/// Serves the router over the given pool. Split out of [`run_app`] so
/// tests can bring their own migrated in-memory database.
pub async fn serve_app(app: Router, address: SocketAddr, db: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(db)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db() -> Result<SqlitePool> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
        tracing::info!("creating database {}", db_url);
        Sqlite::create_database(&db_url)
            .await
            .context("Failed to create database")?;
    }
    let pool = SqlitePool::connect(&db_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/users/login", post(login_user))
        .route("/users", post(register_user))
        .route(
            "/user",
            get(get_current_user)
                .put(update_user)
                .delete(delete_current_user),
        )
        .route("/profiles/:username", get(get_profile))
        .route(
            "/profiles/:username/follow",
            post(follow_profile).delete(unfollow_profile),
        )
        .route("/profiles/:username/followers", get(list_followers))
        .route("/profiles/:username/following", get(list_following))
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/feed", get(feed_recipes))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route(
            "/recipes/:id/comments",
            get(list_comments).post(add_comment),
        )
        .route("/comments", get(list_all_comments))
        .route("/comments/:id/enable", put(enable_comment))
        .route("/comments/:id/disable", put(disable_comment))
        .route("/admin/users/:username", put(update_user_admin))
        .fallback(not_found)
}
