// src/models/attempt.rs

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::{error::AppError, models::test::as_integer};

/// Selected option index per question identifier. Absent keys are unattempted.
pub type AnswerMap = BTreeMap<String, i64>;

/// Represents the 'attempts' table in the database.
/// At most one row exists per (user_id, test_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub test_id: i64,
    pub score: i64,
    /// The submitted answer map, serialized as JSON text.
    /// Only deserialized for the results view.
    pub answers: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Attempt {
    pub fn answer_map(&self) -> Result<AnswerMap, AppError> {
        serde_json::from_str(&self.answers).map_err(|e| {
            tracing::error!("Corrupt answers for attempt {}: {:?}", self.id, e);
            AppError::InternalServerError(e.to_string())
        })
    }
}

/// DTO for submitting a test.
///
/// Key: question identifier.
/// Value: selected option index, as a number or numeric string; null means skipped.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: HashMap<String, Value>,
}

impl SubmitAttemptRequest {
    /// Coerces the raw answer values into option indices.
    pub fn normalized(&self) -> Result<AnswerMap, AppError> {
        let mut map = AnswerMap::new();
        for (question_id, value) in &self.answers {
            if value.is_null() {
                continue;
            }
            let index = as_integer(value).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Answer for question '{}' must be an option index",
                    question_id
                ))
            })?;
            map.insert(question_id.clone(), index);
        }
        Ok(map)
    }
}

/// Attempt summary embedded in dashboard entries.
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub score: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A student's dashboard line: one assigned, active test.
#[derive(Debug, Serialize)]
pub struct DashboardEntry {
    pub id: i64,
    pub title: String,
    pub question_count: usize,
    pub duration: i64,
    pub is_active: bool,
    pub show_results: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub attempt: Option<AttemptSummary>,
}
