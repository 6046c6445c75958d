// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub is_correct: bool,
}

/// Outgoing answer; `is_correct` is omitted when the reader may not see the key.
#[derive(Debug, Serialize)]
pub struct AnswerView {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl AnswerView {
    pub fn new(answer: Answer, reveal_correct: bool) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            text: answer.text,
            is_correct: reveal_correct.then_some(answer.is_correct),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnswer {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl CreateAnswer {
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.trim().to_string(),
            ..self
        }
    }
}

/// DTO for adding an answer to an existing question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnswerRequest {
    pub question_id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl CreateAnswerRequest {
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnswerRequest {
    #[validate(length(min = 1, max = 500))]
    pub text: Option<String>,
    pub is_correct: Option<bool>,
}

impl UpdateAnswerRequest {
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.map(|t| t.trim().to_string()),
            ..self
        }
    }
}
