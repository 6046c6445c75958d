// src/scoring.rs

//! Test submission: validate, resolve in bulk, score, persist.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        answer::Answer,
        question::Question,
        result::{SubmittedAnswer, SubmitTestRequest, TestResult},
        user::User,
    },
    repository::Store,
};

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidSubmission(message.into())
}

/// Each question may be answered at most once per submission.
fn reject_duplicates(submitted: &[SubmittedAnswer]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(submitted.len());
    for item in submitted {
        if !seen.insert(item.question_id) {
            return Err(invalid(format!(
                "Question {} is answered more than once",
                item.question_id
            )));
        }
    }
    Ok(())
}

/// Counts correct answers after checking every pair against the resolved rows.
///
/// `questions` and `answers` are the rows found for the submitted ids; ids
/// that did not resolve are simply missing from them.
pub fn score_submission(
    test_id: Uuid,
    submitted: &[SubmittedAnswer],
    questions: &[Question],
    answers: &[Answer],
) -> AppResult<i32> {
    reject_duplicates(submitted)?;

    let question_map: HashMap<Uuid, &Question> = questions.iter().map(|q| (q.id, q)).collect();
    let answer_map: HashMap<Uuid, &Answer> = answers.iter().map(|a| (a.id, a)).collect();

    let mut correct_count = 0;
    for item in submitted {
        let answer = answer_map
            .get(&item.answer_id)
            .ok_or_else(|| invalid("Answer not found"))?;

        if answer.question_id != item.question_id {
            return Err(invalid("Answer does not belong to the question"));
        }

        let question = question_map
            .get(&item.question_id)
            .ok_or_else(|| invalid("Question not found"))?;

        if question.test_id != test_id {
            return Err(invalid("Question does not belong to this test"));
        }

        if answer.is_correct {
            correct_count += 1;
        }
    }

    Ok(correct_count)
}

/// Scores a submission by `actor` and stores exactly one result for it.
///
/// Resubmission is allowed; every call that passes validation adds a new result.
pub async fn submit(
    store: &Store,
    actor: &User,
    test_id: Uuid,
    request: &SubmitTestRequest,
) -> AppResult<TestResult> {
    store
        .tests
        .find_by_id(test_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    reject_duplicates(&request.answers)?;

    let question_ids: Vec<Uuid> = request.answers.iter().map(|a| a.question_id).collect();
    let answer_ids: Vec<Uuid> = request.answers.iter().map(|a| a.answer_id).collect();

    let questions = store.questions.find_many(&question_ids).await?;
    let answers = store.answers.find_many(&answer_ids).await?;

    let score = score_submission(test_id, &request.answers, &questions, &answers)?;

    let result = store.results.create(actor.id, test_id, score).await?;

    tracing::info!(
        "submission scored: test_id={}, student_id={}, score={}/{}",
        test_id,
        actor.id,
        score,
        request.answers.len()
    );
    Ok(result)
}
