use sqlx::SqlitePool;

use crate::models::user::{Role, StudentSummary, User};

const COLUMNS: &str = "id, name, username, password, role, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub struct CreateUser<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub hashed_password: String,
    pub role: Role,
}

/// Inserts a user. A taken username surfaces as a unique violation.
pub async fn create(pool: &SqlitePool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    let now = chrono::Utc::now();
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, username, password, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn list_students(pool: &SqlitePool) -> Result<Vec<StudentSummary>, sqlx::Error> {
    sqlx::query_as::<_, StudentSummary>(
        "SELECT id, name, username FROM users WHERE role = ? ORDER BY name ASC",
    )
    .bind(Role::Student)
    .fetch_all(pool)
    .await
}
