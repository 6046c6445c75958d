// src/handlers/result.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use uuid::Uuid;

use crate::{auth::policy, error::AppError, extract::AppPath, models::user::User, repository::Store};

/// Students see their own results; teachers and admins see everyone's.
pub async fn list_results(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.results.list(policy::result_scope(&actor)).await?;
    Ok(Json(results))
}

pub async fn get_result(
    State(store): State<Store>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = store
        .results
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    policy::authorize_read_result(&actor, result.student_id)?;
    Ok(Json(result))
}
