//! Live integration tests for ordb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/ordb-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory. Run with `cargo test -- --ignored` against a local
//! Postgres.

use ordb_db::{
    insert_outreach_history, list_daycares, list_influencers, list_never_contacted_daycares,
    mark_daycare_contacted, DaycareFilter, InfluencerFilter, NewOutreachHistory,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a minimal daycare row and return its generated `id`.
async fn insert_test_daycare(pool: &sqlx::PgPool, name: &str, city: &str, region: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO daycares (name, city, email, region) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(city)
    .bind(format!("{}@example.com", name.to_lowercase().replace(' ', ".")))
    .bind(region)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_test_daycare failed for '{name}': {e}"))
}

/// Insert a minimal influencer row and return its generated `id`.
async fn insert_test_influencer(
    pool: &sqlx::PgPool,
    name: &str,
    country: &str,
    followers: i64,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO influencers (name, platform, follower_count, country, email) \
         VALUES ($1, 'YOUTUBE', $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(followers)
    .bind(country)
    .bind(format!("{}@example.com", name.to_lowercase().replace(' ', ".")))
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_test_influencer failed for '{name}': {e}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres instance"]
async fn list_daycares_filters_by_city_case_insensitively(pool: sqlx::PgPool) {
    insert_test_daycare(&pool, "Little Stars", "New York", "USA").await;
    insert_test_daycare(&pool, "Petits Anges", "Paris", "FRANCE").await;

    let rows = list_daycares(
        &pool,
        DaycareFilter {
            city: Some("new york"),
            ..DaycareFilter::default()
        },
    )
    .await
    .expect("list_daycares should succeed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Little Stars");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres instance"]
async fn list_influencers_applies_follower_floor(pool: sqlx::PgPool) {
    insert_test_influencer(&pool, "Big Creator", "France", 50_000).await;
    insert_test_influencer(&pool, "Small Creator", "France", 900).await;

    let rows = list_influencers(
        &pool,
        InfluencerFilter {
            country: Some("France"),
            min_followers: Some(10_000),
            limit: None,
        },
    )
    .await
    .expect("list_influencers should succeed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Big Creator");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres instance"]
async fn never_contacted_selection_excludes_contacted_and_caps_count(pool: sqlx::PgPool) {
    let contacted = insert_test_daycare(&pool, "Already Contacted", "Boston", "USA").await;
    mark_daycare_contacted(&pool, contacted)
        .await
        .expect("mark contacted should succeed");
    for i in 0..5 {
        insert_test_daycare(&pool, &format!("Fresh {i}"), "Boston", "USA").await;
    }

    let rows = list_never_contacted_daycares(&pool, Some("USA"), 3)
        .await
        .expect("selection should succeed");

    assert_eq!(rows.len(), 3, "batch size must not exceed requested count");
    assert!(
        rows.iter().all(|r| r.last_contacted.is_none()),
        "only never-contacted rows are eligible"
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres instance"]
async fn insert_outreach_history_stamps_last_contacted(pool: sqlx::PgPool) {
    let daycare_id = insert_test_daycare(&pool, "History Test", "Austin", "USA").await;

    let history_id = insert_outreach_history(
        &pool,
        NewOutreachHistory {
            target_type: "daycare",
            target_id: daycare_id,
            email_subject: "Hello",
            email_content: "<p>Hi</p>",
            language: "en",
        },
    )
    .await
    .expect("history insert should succeed");
    assert!(history_id > 0);

    let rows = list_never_contacted_daycares(&pool, None, 10)
        .await
        .expect("selection should succeed");
    assert!(
        rows.iter().all(|r| r.id != daycare_id),
        "contacted daycare must no longer be eligible"
    );
}
