use sqlx::SqlitePool;

use crate::models::assignment::{AssignmentEntry, TestAssignment};

/// Creates the (test, user) assignment or refreshes its timestamp.
pub async fn upsert(
    pool: &SqlitePool,
    test_id: i64,
    user_id: i64,
) -> Result<TestAssignment, sqlx::Error> {
    sqlx::query_as::<_, TestAssignment>(
        "INSERT INTO test_assignments (test_id, user_id, assigned_at)
         VALUES (?, ?, ?)
         ON CONFLICT (test_id, user_id) DO UPDATE SET assigned_at = excluded.assigned_at
         RETURNING id, test_id, user_id, assigned_at",
    )
    .bind(test_id)
    .bind(user_id)
    .bind(chrono::Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &SqlitePool, test_id: i64, user_id: i64) -> Result<u64, sqlx::Error> {
    Ok(
        sqlx::query("DELETE FROM test_assignments WHERE test_id = ? AND user_id = ?")
            .bind(test_id)
            .bind(user_id)
            .execute(pool)
            .await?
            .rows_affected(),
    )
}

pub async fn exists(pool: &SqlitePool, test_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM test_assignments WHERE test_id = ? AND user_id = ?",
    )
    .bind(test_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

pub async fn list_for_test(
    pool: &SqlitePool,
    test_id: i64,
) -> Result<Vec<AssignmentEntry>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentEntry>(
        "SELECT a.user_id, u.name, u.username, a.assigned_at
         FROM test_assignments a
         JOIN users u ON u.id = a.user_id
         WHERE a.test_id = ?
         ORDER BY u.name ASC",
    )
    .bind(test_id)
    .fetch_all(pool)
    .await
}
