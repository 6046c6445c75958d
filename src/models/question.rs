// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::answer::{Answer, AnswerView, CreateAnswer};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct QuestionWithAnswers {
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// Outgoing representation of a question and its answers.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
    pub answers: Vec<AnswerView>,
}

impl QuestionView {
    pub fn new(full: QuestionWithAnswers, reveal_correct: bool) -> Self {
        Self {
            id: full.question.id,
            test_id: full.question.test_id,
            text: full.question.text,
            answers: full
                .answers
                .into_iter()
                .map(|a| AnswerView::new(a, reveal_correct))
                .collect(),
        }
    }
}

/// Question payload nested inside a test creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionWithAnswers {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<CreateAnswer>,
}

impl CreateQuestionWithAnswers {
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.trim().to_string(),
            answers: self.answers.into_iter().map(CreateAnswer::trimmed).collect(),
        }
    }
}

/// DTO for adding a question to an existing test.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub test_id: Uuid,
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<CreateAnswer>,
}

impl CreateQuestionRequest {
    pub fn trimmed(self) -> Self {
        Self {
            test_id: self.test_id,
            text: self.text.trim().to_string(),
            answers: self.answers.into_iter().map(CreateAnswer::trimmed).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: Option<String>,
}

impl UpdateQuestionRequest {
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.map(|t| t.trim().to_string()),
        }
    }
}
