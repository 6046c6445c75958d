// src/auth/identity.rs

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::{
    auth::tokens,
    error::{AppError, AppResult},
    models::user::User,
    repository::Store,
};

/// Same message for unknown, expired and orphaned tokens so callers cannot tell which one it was.
const INVALID_TOKEN: &str = "Invalid or expired token";

/// Extracts the token from `Authorization: Bearer <token>`.
///
/// A missing header is an authentication failure; a header that is present
/// but unusable is a malformed request.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::AuthError("Missing authorization header".to_string()))?;

    let malformed = || AppError::BadRequest("Malformed authorization header".to_string());

    let value = value.to_str().map_err(|_| malformed())?;
    let (scheme, token) = value.trim().split_once(' ').ok_or_else(malformed)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(malformed());
    }

    Ok(token)
}

/// Resolves a bearer token to its owning user.
pub async fn resolve(store: &Store, token_id: &str) -> AppResult<User> {
    resolve_at(store, token_id, Utc::now()).await
}

/// Resolution against an explicit clock.
pub async fn resolve_at(store: &Store, token_id: &str, now: DateTime<Utc>) -> AppResult<User> {
    let token = tokens::lookup(store.tokens.as_ref(), token_id)
        .await?
        .ok_or_else(|| AppError::AuthError(INVALID_TOKEN.to_string()))?;

    if token.is_expired_at(now) {
        tracing::debug!("rejected expired token {}...", tokens::token_prefix(token_id));
        return Err(AppError::AuthError(INVALID_TOKEN.to_string()));
    }

    store.users.find_by_id(token.user_id).await?.ok_or_else(|| {
        tracing::warn!("token {}... has no owner", tokens::token_prefix(token_id));
        AppError::AuthError(INVALID_TOKEN.to_string())
    })
}

/// Axum Middleware: Authentication.
///
/// Resolves the bearer token on every request it guards and injects the
/// resolved `User` into the request extensions for handlers to use.
pub async fn auth_middleware(
    State(store): State<Store>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?.to_owned();
    let user = resolve(&store, &token).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
