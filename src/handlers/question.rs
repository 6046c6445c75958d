// src/handlers/question.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        ownership::{editable_question, editable_test},
        policy,
    },
    error::AppError,
    extract::{AppJson, AppPath},
    models::{
        question::{
            CreateQuestionRequest, CreateQuestionWithAnswers, QuestionView, UpdateQuestionRequest,
        },
        user::User,
    },
    repository::Store,
};

fn question_not_found() -> AppError {
    AppError::NotFound("Question not found".to_string())
}

/// Adds a question (and optionally its answers) to an existing test.
pub async fn create_question(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    editable_test(&store, &actor, payload.test_id).await?;
    let payload = payload.trimmed();
    payload.validate()?;

    let full = store
        .questions
        .create_with_answers(
            payload.test_id,
            CreateQuestionWithAnswers {
                text: payload.text,
                answers: payload.answers,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(QuestionView::new(full, true))))
}

pub async fn get_question(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let full = store
        .questions
        .find_with_answers(id)
        .await?
        .ok_or_else(question_not_found)?;

    // The answer key follows edit rights on the owning test.
    let reveal = match store.tests.find_by_id(full.question.test_id).await? {
        Some(test) => policy::can_see_answer_key(&actor, &test),
        None => false,
    };

    Ok(Json(QuestionView::new(full, reveal)))
}

pub async fn update_question(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    editable_question(&store, &actor, id).await?;
    let payload = payload.trimmed();
    payload.validate()?;

    if let Some(text) = payload.text.as_deref() {
        store.questions.update_text(id, text).await?;
    }

    let full = store
        .questions
        .find_with_answers(id)
        .await?
        .ok_or_else(question_not_found)?;

    Ok(Json(QuestionView::new(full, true)))
}

/// Deletes a question and its answers.
pub async fn delete_question(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    editable_question(&store, &actor, id).await?;

    if !store.questions.delete(id).await? {
        return Err(question_not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
