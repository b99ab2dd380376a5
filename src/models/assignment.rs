// src/models/assignment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'test_assignments' table: a test made visible to one student.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestAssignment {
    pub id: i64,
    pub test_id: i64,
    pub user_id: i64,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

/// Assignment joined with the student's identity, for the admin view.
#[derive(Debug, Serialize, FromRow)]
pub struct AssignmentEntry {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for bulk assignment.
#[derive(Debug, Deserialize)]
pub struct AssignTestRequest {
    pub test_id: i64,
    pub user_ids: Vec<i64>,
}

/// DTO for removing a single assignment.
#[derive(Debug, Deserialize)]
pub struct UnassignTestRequest {
    pub test_id: i64,
    pub user_id: i64,
}
