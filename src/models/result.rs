// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'results' table: one row per submission.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub student_id: Uuid,
    pub test_id: Uuid,
    /// Number of correctly answered questions.
    pub score: i32,
}

/// A result joined with the title of its test.
/// `test_title` is absent when returned straight from a submission.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResultView {
    pub id: Uuid,
    pub student_id: Uuid,
    pub test_id: Uuid,
    pub score: i32,
    pub test_title: Option<String>,
}

impl From<TestResult> for ResultView {
    fn from(result: TestResult) -> Self {
        Self {
            id: result.id,
            student_id: result.student_id,
            test_id: result.test_id,
            score: result.score,
            test_title: None,
        }
    }
}

/// One (question, chosen answer) pair of a submission.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub answer_id: Uuid,
}

/// DTO for submitting a test.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitTestRequest {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}
