//! Integration tests for the version store (`TemplateVersionRepo`).
//!
//! - `append` numbers an empty history from 1 and follows `MAX + 1`
//! - `list` is ascending and payload-free; `latest` picks the highest number
//! - `find_in_template` refuses a version id from another template
//! - the `(template_id, version)` unique constraint rejects duplicates
//! - `delete_all` clears a history and unblocks template deletion
//! - `append` retries past a number claimed by a concurrent writer and gives
//!   up after `MAX_APPEND_ATTEMPTS` conflicts

use std::time::Duration;

use assert_matches::assert_matches;
use menuprint_core::error::CoreError;
use menuprint_core::versioning::MAX_APPEND_ATTEMPTS;
use menuprint_db::error::{is_unique_violation, ServiceError};
use menuprint_db::models::user::CreateUser;
use menuprint_db::repositories::template_version_repo::VERSION_CONSTRAINT;
use menuprint_db::repositories::{TemplateRepo, TemplateVersionRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, username: &str) -> Uuid {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// Insert bare template metadata (no versions) and return its id.
async fn bare_template(pool: &PgPool, owner_id: Uuid, name: &str) -> Uuid {
    let mut conn = pool.acquire().await.unwrap();
    TemplateRepo::create(&mut *conn, owner_id, name, &["cover".to_string()])
        .await
        .unwrap()
        .id
}

async fn append(pool: &PgPool, template_id: Uuid, data: serde_json::Value) -> i32 {
    let mut tx = pool.begin().await.unwrap();
    let version = TemplateVersionRepo::append(&mut *tx, template_id, &data)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    version.version
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_append_numbers_from_one(pool: PgPool) {
    let owner = create_user(&pool, "append_owner").await;
    let template_id = bare_template(&pool, owner, "A4").await;

    assert_eq!(append(&pool, template_id, json!({ "rows": 1 })).await, 1);
    assert_eq!(append(&pool, template_id, json!({ "rows": 2 })).await, 2);
    assert_eq!(append(&pool, template_id, json!({ "rows": 3 })).await, 3);

    let numbers = TemplateVersionRepo::version_numbers(&pool, template_id)
        .await
        .unwrap();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_histories_are_numbered_independently(pool: PgPool) {
    let owner = create_user(&pool, "indep_owner").await;
    let first = bare_template(&pool, owner, "first").await;
    let second = bare_template(&pool, owner, "second").await;

    append(&pool, first, json!({})).await;
    append(&pool, first, json!({})).await;

    assert_eq!(append(&pool, second, json!({})).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_ascending_and_latest(pool: PgPool) {
    let owner = create_user(&pool, "list_owner").await;
    let template_id = bare_template(&pool, owner, "menu").await;
    for rows in 1..=4 {
        append(&pool, template_id, json!({ "rows": rows })).await;
    }

    let listed = TemplateVersionRepo::list(&pool, template_id).await.unwrap();
    let numbers: Vec<i32> = listed.iter().map(|v| v.version).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);

    let latest = TemplateVersionRepo::latest(&pool, template_id)
        .await
        .unwrap()
        .expect("history is not empty");
    assert_eq!(latest.version, 4);

    let detail = TemplateVersionRepo::latest_detail(&pool, template_id)
        .await
        .unwrap()
        .expect("history is not empty");
    assert_eq!(detail.version, 4);
    assert_eq!(detail.data, json!({ "rows": 4 }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_of_empty_history_is_none(pool: PgPool) {
    let owner = create_user(&pool, "empty_owner").await;
    let template_id = bare_template(&pool, owner, "empty").await;

    let latest = TemplateVersionRepo::latest(&pool, template_id).await.unwrap();
    assert!(latest.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_in_template_is_scoped(pool: PgPool) {
    let owner = create_user(&pool, "scope_owner").await;
    let a = bare_template(&pool, owner, "a").await;
    let b = bare_template(&pool, owner, "b").await;
    append(&pool, a, json!({ "side": "a" })).await;

    let a_version = TemplateVersionRepo::latest(&pool, a).await.unwrap().unwrap();

    let found = TemplateVersionRepo::find_in_template(&pool, a, a_version.id)
        .await
        .unwrap();
    assert_eq!(found.unwrap().data, json!({ "side": "a" }));

    let cross = TemplateVersionRepo::find_in_template(&pool, b, a_version.id)
        .await
        .unwrap();
    assert!(cross.is_none(), "a version must not be reachable through another template");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_version_number_rejected(pool: PgPool) {
    let owner = create_user(&pool, "dup_owner").await;
    let template_id = bare_template(&pool, owner, "dup").await;
    append(&pool, template_id, json!({})).await;

    let result = sqlx::query(
        "INSERT INTO template_versions (template_id, version, data) VALUES ($1, 1, '{}'::jsonb)",
    )
    .bind(template_id)
    .execute(&pool)
    .await;

    let err = result.expect_err("second version 1 must be rejected");
    assert!(is_unique_violation(&err, VERSION_CONSTRAINT));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_append_after_conflicting_row_skips_taken_number(pool: PgPool) {
    let owner = create_user(&pool, "skip_owner").await;
    let template_id = bare_template(&pool, owner, "skip").await;
    append(&pool, template_id, json!({})).await;

    // Another writer's row lands between reads; the next append still sees it.
    sqlx::query(
        "INSERT INTO template_versions (template_id, version, data) VALUES ($1, 2, '{}'::jsonb)",
    )
    .bind(template_id)
    .execute(&pool)
    .await
    .unwrap();

    assert_eq!(append(&pool, template_id, json!({})).await, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_all_then_template(pool: PgPool) {
    let owner = create_user(&pool, "del_owner").await;
    let template_id = bare_template(&pool, owner, "del").await;
    append(&pool, template_id, json!({})).await;
    append(&pool, template_id, json!({})).await;

    // The foreign key refuses to orphan versions.
    {
        let mut conn = pool.acquire().await.unwrap();
        let blocked = TemplateRepo::delete(&mut *conn, template_id, owner).await;
        assert_matches!(blocked, Err(sqlx::Error::Database(_)));
    }

    let mut tx = pool.begin().await.unwrap();
    let removed = TemplateVersionRepo::delete_all(&mut *tx, template_id)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(TemplateRepo::delete(&mut *tx, template_id, owner).await.unwrap());
    tx.commit().await.unwrap();

    let numbers = TemplateVersionRepo::version_numbers(&pool, template_id)
        .await
        .unwrap();
    assert!(numbers.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_object_payload_rejected_by_schema(pool: PgPool) {
    let owner = create_user(&pool, "schema_owner").await;
    let template_id = bare_template(&pool, owner, "schema").await;

    let mut tx = pool.begin().await.unwrap();
    let result = TemplateVersionRepo::append(&mut *tx, template_id, &json!([1, 2])).await;
    assert!(result.is_err(), "array payloads violate the data CHECK constraint");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_append_retries_after_concurrent_insert(pool: PgPool) {
    let owner = create_user(&pool, "retry_owner").await;
    let template_id = bare_template(&pool, owner, "retry").await;
    append(&pool, template_id, json!({})).await;

    // Writer B claims version 2 but has not committed yet.
    let mut other = pool.begin().await.unwrap();
    sqlx::query(
        "INSERT INTO template_versions (template_id, version, data) VALUES ($1, 2, '{}'::jsonb)",
    )
    .bind(template_id)
    .execute(&mut *other)
    .await
    .unwrap();

    // Writer A reads MAX = 1 and blocks on B's uncommitted version 2.
    let writer = {
        let pool = pool.clone();
        tokio::spawn(async move {
            let mut tx = pool.begin().await.unwrap();
            let result = TemplateVersionRepo::append(&mut *tx, template_id, &json!({ "a": 1 }))
                .await
                .map(|v| v.version);
            tx.commit().await.unwrap();
            result
        })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    other.commit().await.unwrap();

    let version = writer.await.unwrap().unwrap();
    assert_eq!(version, 3);

    let numbers = TemplateVersionRepo::version_numbers(&pool, template_id)
        .await
        .unwrap();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_append_gives_up_after_max_attempts(pool: PgPool) {
    let owner = create_user(&pool, "exhaust_owner").await;
    let template_id = bare_template(&pool, owner, "exhaust").await;

    // Every insert reports a version-number conflict.
    sqlx::raw_sql(
        r#"
        CREATE FUNCTION always_conflict() RETURNS trigger AS $$
        BEGIN
            RAISE EXCEPTION 'version taken'
                USING ERRCODE = 'unique_violation',
                      CONSTRAINT = 'uq_template_versions_template_version';
        END;
        $$ LANGUAGE plpgsql;

        CREATE TRIGGER always_conflict BEFORE INSERT ON template_versions
            FOR EACH ROW EXECUTE FUNCTION always_conflict();
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let result = TemplateVersionRepo::append(&mut *tx, template_id, &json!({})).await;

    assert_matches!(
        result,
        Err(ServiceError::Core(CoreError::NumberingRaceExhausted { template_id: id, attempts }))
            if id == template_id && attempts == MAX_APPEND_ATTEMPTS
    );
}
