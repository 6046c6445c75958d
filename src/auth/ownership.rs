// src/auth/ownership.rs

//! Resolve-parent-then-check helpers. Questions and answers have no owner of
//! their own; they are authorized against the test that transitively owns them.

use uuid::Uuid;

use crate::{
    auth::policy,
    error::{AppError, AppResult},
    models::{answer::Answer, question::Question, test::Test, user::User},
    repository::Store,
};

fn test_not_found() -> AppError {
    AppError::NotFound("Test not found".to_string())
}

/// Loads a test and checks that `actor` may modify it.
pub async fn editable_test(store: &Store, actor: &User, test_id: Uuid) -> AppResult<Test> {
    let test = store
        .tests
        .find_by_id(test_id)
        .await?
        .ok_or_else(test_not_found)?;

    policy::authorize_modify_test(actor, &test)?;
    Ok(test)
}

/// Loads a question, then its parent test, and checks edit rights on the test.
pub async fn editable_question(
    store: &Store,
    actor: &User,
    question_id: Uuid,
) -> AppResult<(Question, Test)> {
    let question = store
        .questions
        .find_by_id(question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let test = editable_test(store, actor, question.test_id).await?;
    Ok((question, test))
}

/// Loads an answer, its question and the owning test, and checks edit rights on the test.
pub async fn editable_answer(
    store: &Store,
    actor: &User,
    answer_id: Uuid,
) -> AppResult<(Answer, Question, Test)> {
    let answer = store
        .answers
        .find_by_id(answer_id)
        .await?
        .ok_or(AppError::NotFound("Answer not found".to_string()))?;

    let (question, test) = editable_question(store, actor, answer.question_id).await?;
    Ok((answer, question, test))
}
