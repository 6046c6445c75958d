// src/handlers/answer.rs

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
        ownership::{editable_answer, editable_question},
        policy,
    },
    error::AppError,
    extract::{AppJson, AppPath},
    models::{
        answer::{AnswerView, CreateAnswer, CreateAnswerRequest, UpdateAnswerRequest},
        user::User,
    },
    repository::Store,
};

fn answer_not_found() -> AppError {
    AppError::NotFound("Answer not found".to_string())
}

pub async fn create_answer(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppJson(payload): AppJson<CreateAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    editable_question(&store, &actor, payload.question_id).await?;
    let payload = payload.trimmed();
    payload.validate()?;

    let answer = store
        .answers
        .create(
            payload.question_id,
            CreateAnswer {
                text: payload.text,
                is_correct: payload.is_correct,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AnswerView::new(answer, true))))
}

/// Reads one answer. `is_correct` is visible only to those who may edit its test.
pub async fn get_answer(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let answer = store
        .answers
        .find_by_id(id)
        .await?
        .ok_or_else(answer_not_found)?;

    let mut reveal = false;
    if let Some(question) = store.questions.find_by_id(answer.question_id).await? {
        if let Some(test) = store.tests.find_by_id(question.test_id).await? {
            reveal = policy::can_see_answer_key(&actor, &test);
        }
    }

    Ok(Json(AnswerView::new(answer, reveal)))
}

pub async fn update_answer(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    editable_answer(&store, &actor, id).await?;
    let payload = payload.trimmed();
    payload.validate()?;

    let answer = store
        .answers
        .update(id, payload.text.as_deref(), payload.is_correct)
        .await?;

    Ok(Json(AnswerView::new(answer, true)))
}

pub async fn delete_answer(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    editable_answer(&store, &actor, id).await?;

    if !store.answers.delete(id).await? {
        return Err(answer_not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
