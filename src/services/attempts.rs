// src/services/attempts.rs

use sqlx::SqlitePool;

use crate::{
    error::{AppError, is_unique_violation},
    models::attempt::AnswerMap,
    repositories,
    services::scoring::{Marking, compute_score},
};

/// Scores and records a student's single attempt at a test.
///
/// Fails with `NotFound` for an unknown user or test and with `Conflict`
/// when the user already has an attempt, and with `BadRequest` when the total
/// overflows the marking scheme. Nothing is written on any failure.
/// Returns the computed score, which may be negative.
pub async fn submit_attempt(
    pool: &SqlitePool,
    test_id: i64,
    username: &str,
    answers: &AnswerMap,
) -> Result<i64, AppError> {
    let user = repositories::users::find_by_username(pool, username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found. Please login.".to_string()))?;

    if repositories::attempts::find(pool, user.id, test_id).await?.is_some() {
        return Err(AppError::Conflict(
            "You have already attempted this test.".to_string(),
        ));
    }

    let test = repositories::tests::find_by_id(pool, test_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;

    let marking = Marking {
        correct: test.correct_marks,
        incorrect: test.incorrect_marks,
    };
    let score = compute_score(&test.questions, answers, marking).ok_or_else(|| {
        AppError::BadRequest("Score is out of range for this test's marking scheme".to_string())
    })?;
    let serialized = serde_json::to_string(answers)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    repositories::attempts::create(pool, user.id, test_id, score, &serialized)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("You have already attempted this test.".to_string())
            } else {
                tracing::error!("Failed to store attempt: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!(test_id, user_id = user.id, score, "Attempt recorded");

    Ok(score)
}
