// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{ownership::editable_test, policy},
    error::AppError,
    extract::{AppJson, AppPath},
    models::{
        result::{ResultView, SubmitTestRequest},
        test::{CreateTestRequest, TestView, UpdateTestRequest},
        user::User,
    },
    repository::Store,
    scoring,
};

fn test_not_found() -> AppError {
    AppError::NotFound("Test not found".to_string())
}

/// Creates a test with its questions and answers in one transaction.
///
/// Teachers and admins only. The caller becomes the author.
pub async fn create_test(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppJson(payload): AppJson<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    policy::authorize_create_test(&actor)?;
    let payload = payload.trimmed();
    payload.validate()?;

    let full = store.tests.create_with_questions(actor.id, payload).await?;

    tracing::info!(
        "test created: id={}, author_id={}, questions={}",
        full.test.id,
        actor.id,
        full.questions.len()
    );
    Ok((StatusCode::CREATED, Json(TestView::new(full, true))))
}

/// Lists every test. Answer keys are shown only on tests the caller may edit.
pub async fn list_tests(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let tests = store.tests.list_with_questions().await?;

    let views: Vec<TestView> = tests
        .into_iter()
        .map(|full| {
            let reveal = policy::can_see_answer_key(&actor, &full.test);
            TestView::new(full, reveal)
        })
        .collect();

    Ok(Json(views))
}

pub async fn get_test(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let full = store
        .tests
        .find_with_questions(id)
        .await?
        .ok_or_else(test_not_found)?;

    let reveal = policy::can_see_answer_key(&actor, &full.test);
    Ok(Json(TestView::new(full, reveal)))
}

/// Renames a test. Admins, or the teacher who authored it.
pub async fn update_test(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    editable_test(&store, &actor, id).await?;
    let payload = payload.trimmed();
    payload.validate()?;

    if let Some(title) = payload.title.as_deref() {
        store.tests.update_title(id, title).await?;
    }

    let full = store
        .tests
        .find_with_questions(id)
        .await?
        .ok_or_else(test_not_found)?;

    Ok(Json(TestView::new(full, true)))
}

/// Deletes a test with its questions, answers and results.
pub async fn delete_test(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    editable_test(&store, &actor, id).await?;

    if !store.tests.delete(id).await? {
        return Err(test_not_found());
    }

    tracing::info!("test deleted: id={}, by={}", id, actor.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Scores the submitted answers and records one result for the caller.
///
/// A body that does not parse as a list of (question, answer) id pairs is an
/// invalid submission, not a generic validation failure.
pub async fn submit_test(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
    body: Result<Json<SubmitTestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = body.map_err(|e| AppError::InvalidSubmission(e.body_text()))?;

    let result = scoring::submit(&store, &actor, id, &payload).await?;

    Ok((StatusCode::CREATED, Json(ResultView::from(result))))
}
