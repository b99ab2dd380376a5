// src/handlers/student.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::attempt::{AttemptSummary, DashboardEntry},
    repositories,
    services::scoring::{QuestionAnalysis, analyze},
    utils::jwt::StudentSession,
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub tests: Vec<DashboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub test_title: String,
    pub score: i64,
    pub total_questions: usize,
    pub analysis: Vec<QuestionAnalysis>,
}

/// Lists the student's active assigned tests, each with its attempt (if any).
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(student): Extension<StudentSession>,
) -> Result<impl IntoResponse, AppError> {
    let tests = repositories::tests::list_active_assigned(&pool, student.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch dashboard tests: {:?}", e);
            AppError::from(e)
        })?;

    let mut attempts: HashMap<i64, AttemptSummary> =
        repositories::attempts::list_for_user(&pool, student.user_id)
            .await?
            .into_iter()
            .map(|a| {
                (
                    a.test_id,
                    AttemptSummary {
                        id: a.id,
                        score: a.score,
                        created_at: a.created_at,
                    },
                )
            })
            .collect();

    let entries = tests
        .into_iter()
        .map(|t| DashboardEntry {
            id: t.id,
            question_count: t.questions.len(),
            attempt: attempts.remove(&t.id),
            title: t.title,
            duration: t.duration,
            is_active: t.is_active,
            show_results: t.show_results,
            created_at: t.created_at,
        })
        .collect();

    Ok(Json(DashboardResponse { tests: entries }))
}

/// Per-question breakdown of the student's attempt.
///
/// Refused with 403 until the admin releases results, whether or not an
/// attempt exists. The score comes from the stored attempt, never recomputed.
pub async fn results(
    State(pool): State<SqlitePool>,
    Extension(student): Extension<StudentSession>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = repositories::tests::find_by_id(&pool, test_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;

    if !test.show_results {
        return Err(AppError::Forbidden("Results are not released yet".to_string()));
    }

    let attempt = repositories::attempts::find(&pool, student.user_id, test_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

    let answers = attempt.answer_map()?;

    Ok(Json(ResultsResponse {
        total_questions: test.questions.len(),
        analysis: analyze(&test.questions, &answers),
        score: attempt.score,
        test_title: test.title,
    }))
}
