use sqlx::SqlitePool;

use crate::models::attempt::Attempt;

const COLUMNS: &str = "id, user_id, test_id, score, answers, created_at, updated_at";

pub async fn find(
    pool: &SqlitePool,
    user_id: i64,
    test_id: i64,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE user_id = ? AND test_id = ?"
    ))
    .bind(user_id)
    .bind(test_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE user_id = ?"))
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Inserts the attempt. The UNIQUE(user_id, test_id) constraint rejects a
/// second row even when two submissions race past the existence check.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    test_id: i64,
    score: i64,
    answers: &str,
) -> Result<Attempt, sqlx::Error> {
    let now = chrono::Utc::now();
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (user_id, test_id, score, answers, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(test_id)
    .bind(score)
    .bind(answers)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}
