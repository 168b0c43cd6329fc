use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use stockpot::db_helpers::{
    count_feed_in_db, delete_user_in_db, follow_user_in_db, insert_user, is_followed_by_in_db,
    is_following_in_db, list_feed_in_db, list_followers_in_db, unfollow_user_in_db,
};
use stockpot::duration::{parse_duration, Duration};
use stockpot::models::User;
use stockpot::{db_helpers::create_recipe_in_db, CreateRecipeRequest, RegisterRequest};

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

async fn publish(pool: &SqlitePool, author: &User, title: &str) {
    let request = CreateRecipeRequest {
        title: title.to_string(),
        description: None,
        img_filename: None,
        prep_time: String::new(),
        cook_time: String::new(),
        ingredients: Vec::new(),
        steps: Vec::new(),
    };
    create_recipe_in_db(
        pool,
        author.id,
        &request,
        Duration::default(),
        Duration::default(),
    )
    .await
    .expect("failed to create recipe");
}

async fn edge_count(pool: &SqlitePool, follower: i64, followed: i64) -> i64 {
    sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM follows WHERE follower_id = $1 AND followed_id = $2",
    )
    .bind(follower)
    .bind(followed)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn edges_touching(pool: &SqlitePool, user_id: i64) -> i64 {
    sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM follows WHERE follower_id = $1 OR followed_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn self_edge_exists_at_registration() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    assert!(is_following_in_db(&pool, alice.id, alice.id).await.unwrap());
    assert!(is_followed_by_in_db(&pool, alice.id, alice.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn follow_is_idempotent() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let bob = register(&pool, "bob").await;

    follow_user_in_db(&pool, alice.id, "bob").await.unwrap();
    follow_user_in_db(&pool, alice.id, "bob").await.unwrap();

    assert_eq!(edge_count(&pool, alice.id, bob.id).await, 1);
    assert!(is_following_in_db(&pool, alice.id, bob.id).await.unwrap());
    assert!(is_followed_by_in_db(&pool, bob.id, alice.id).await.unwrap());
    assert!(!is_following_in_db(&pool, bob.id, alice.id).await.unwrap());
}

#[tokio::test]
async fn unfollow_is_idempotent() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let bob = register(&pool, "bob").await;

    follow_user_in_db(&pool, alice.id, "bob").await.unwrap();
    unfollow_user_in_db(&pool, alice.id, "bob").await.unwrap();
    unfollow_user_in_db(&pool, alice.id, "bob").await.unwrap();

    assert_eq!(edge_count(&pool, alice.id, bob.id).await, 0);
}

#[tokio::test]
async fn self_unfollow_is_not_recreated() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    unfollow_user_in_db(&pool, alice.id, "alice").await.unwrap();
    assert!(!is_following_in_db(&pool, alice.id, alice.id).await.unwrap());
}

#[tokio::test]
async fn feed_covers_own_and_followed_content_only() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let bob = register(&pool, "bob").await;
    let carol = register(&pool, "carol").await;

    follow_user_in_db(&pool, alice.id, "bob").await.unwrap();
    publish(&pool, &alice, "Alice's stew").await;
    publish(&pool, &bob, "Bob's bread").await;
    publish(&pool, &carol, "Carol's cake").await;

    let feed = list_feed_in_db(&pool, alice.id, 20, 0).await.unwrap();
    let titles: Vec<_> = feed.iter().map(|recipe| recipe.title.as_str()).collect();
    assert!(titles.contains(&"Alice's stew"));
    assert!(titles.contains(&"Bob's bread"));
    assert!(!titles.contains(&"Carol's cake"));
    assert_eq!(feed.len(), 2);
    assert_eq!(count_feed_in_db(&pool, alice.id).await.unwrap(), 2);
}

#[tokio::test]
async fn deleting_a_user_cascades_all_incident_edges() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let bob = register(&pool, "bob").await;

    follow_user_in_db(&pool, alice.id, "bob").await.unwrap();
    follow_user_in_db(&pool, bob.id, "alice").await.unwrap();
    assert_eq!(edges_touching(&pool, bob.id).await, 3);

    delete_user_in_db(&pool, bob.id).await.unwrap();

    assert_eq!(edges_touching(&pool, bob.id).await, 0);
    // alice's own self-edge survives
    assert!(is_following_in_db(&pool, alice.id, alice.id).await.unwrap());
}

#[tokio::test]
async fn follower_listing_is_stable_across_pages() {
    let pool = test_pool().await;
    let bob = register(&pool, "bob").await;
    for name in ["alice", "carol", "dave"] {
        let user = register(&pool, name).await;
        follow_user_in_db(&pool, user.id, "bob").await.unwrap();
    }

    // bob's self-edge plus three followers
    let all = list_followers_in_db(&pool, bob.id, 20, 0).await.unwrap();
    assert_eq!(all.len(), 4);

    let first = list_followers_in_db(&pool, bob.id, 2, 0).await.unwrap();
    let second = list_followers_in_db(&pool, bob.id, 2, 2).await.unwrap();
    let mut paged: Vec<_> = first
        .iter()
        .chain(second.iter())
        .map(|follow| follow.username.clone())
        .collect();
    let mut expected: Vec<_> = all.iter().map(|follow| follow.username.clone()).collect();
    assert_eq!(paged.len(), 4);
    paged.sort();
    expected.sort();
    assert_eq!(paged, expected);
}

#[tokio::test]
async fn recipe_durations_survive_storage() {
    let pool = test_pool().await;
    let alice = register(&pool, "alice").await;
    let request = CreateRecipeRequest {
        title: "Overnight oats".to_string(),
        description: None,
        img_filename: None,
        prep_time: String::new(),
        cook_time: String::new(),
        ingredients: Vec::new(),
        steps: Vec::new(),
    };
    let prep = parse_duration("20m").unwrap();
    let cook = parse_duration("8h").unwrap();
    let recipe = create_recipe_in_db(&pool, alice.id, &request, prep, cook)
        .await
        .unwrap();
    assert_eq!(recipe.prep_time, 20 * 60);
    assert_eq!(recipe.cook_time, 8 * 3600);
    assert_eq!(
        Duration::from_seconds(recipe.cook_time).to_string(),
        "0d 8h 0m 0s"
    );
}
