// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use tokio::task::JoinSet;

use crate::{
    config::{
        DEFAULT_CORRECT_MARKS, DEFAULT_DURATION_MINUTES, DEFAULT_INCORRECT_MARKS,
        DEFAULT_TEST_TITLE,
    },
    error::AppError,
    models::{
        assignment::{AssignTestRequest, UnassignTestRequest},
        test::{CreateTestRequest, TestSummary, UpdateTestRequest, normalize_questions},
    },
    repositories::{self, tests::CreateTest},
    utils::{html::clean_html, json::AppJson, jwt::AdminSession},
};

/// Lists all students, ordered by name.
/// Admin only.
pub async fn list_students(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let students = repositories::users::list_students(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list students: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(students))
}

/// Creates a test from a title, a marking scheme and a raw question list.
/// Admin only.
pub async fn create_test(
    State(pool): State<SqlitePool>,
    Extension(admin): Extension<AdminSession>,
    AppJson(payload): AppJson<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let duration = payload.duration.unwrap_or(DEFAULT_DURATION_MINUTES);
    if duration <= 0 {
        return Err(AppError::BadRequest(
            "Duration must be a positive number of minutes".to_string(),
        ));
    }

    let questions = normalize_questions(payload.questions)?;

    let title = payload
        .title
        .map(|t| clean_html(t.trim()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_TITLE.to_string());

    let question_count = questions.len();
    let id = repositories::tests::create(
        &pool,
        CreateTest {
            title,
            correct_marks: payload.correct_marks.unwrap_or(DEFAULT_CORRECT_MARKS),
            incorrect_marks: payload.incorrect_marks.unwrap_or(DEFAULT_INCORRECT_MARKS),
            duration,
            questions,
        },
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to create test: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(test_id = id, question_count, admin = %admin.username, "Test created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": id })),
    ))
}

/// Patches a test. Any provided field overwrites the stored one.
/// Admin only.
pub async fn update_test(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound("Test not found".to_string());

    if !payload.is_empty() {
        let affected = repositories::tests::update(&pool, id, payload)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update test: {:?}", e);
                AppError::from(e)
            })?;

        if affected == 0 {
            return Err(not_found());
        }
    }

    let test = repositories::tests::find_by_id(&pool, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(TestSummary::from(&test)))
}

/// Deletes a test. Its assignments and attempts are kept.
/// Admin only.
pub async fn delete_test(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let affected = repositories::tests::delete(&pool, id).await.map_err(|e| {
        tracing::error!("Failed to delete test: {:?}", e);
        AppError::from(e)
    })?;

    if affected == 0 {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Assigns a test to several students at once.
///
/// Each (test, user) pair is upserted independently, so repeating the call
/// is harmless.
/// Admin only.
pub async fn assign_test(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<AssignTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if repositories::tests::find_by_id(&pool, payload.test_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    let mut user_ids = payload.user_ids;
    user_ids.sort_unstable();
    user_ids.dedup();

    let mut upserts = JoinSet::new();
    for user_id in user_ids {
        let pool = pool.clone();
        let test_id = payload.test_id;
        upserts.spawn(async move { repositories::assignments::upsert(&pool, test_id, user_id).await });
    }

    let mut assigned = 0usize;
    while let Some(joined) = upserts.join_next().await {
        joined
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .map_err(|e| {
                tracing::error!("Failed to assign test: {:?}", e);
                AppError::from(e)
            })?;
        assigned += 1;
    }

    Ok(Json(json!({ "success": true, "assigned": assigned })))
}

/// Removes one assignment. Missing assignments are not an error.
/// Admin only.
pub async fn unassign_test(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<UnassignTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = repositories::assignments::delete(&pool, payload.test_id, payload.user_id).await {
        tracing::warn!("Ignoring failed unassign: {:?}", e);
    }

    Ok(Json(json!({ "success": true })))
}

/// Lists students assigned to a test.
/// Admin only.
pub async fn list_assignments(
    State(pool): State<SqlitePool>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let entries = repositories::assignments::list_for_test(&pool, test_id).await?;
    Ok(Json(entries))
}
