// src/auth/tokens.rs

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::{RngCore, rngs::OsRng};

use crate::{
    error::{AppError, AppResult},
    models::{token::Token, user::User},
    repository::TokenRepository,
};

/// Random bytes behind every token id (encoded to 43 URL-safe characters).
pub const TOKEN_BYTES: usize = 32;

/// Produces an opaque, URL-safe identifier from the OS CSPRNG.
/// Uniqueness relies on entropy alone; there is no retry on collision.
pub fn generate_token_id() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Short, non-secret form of a token for log lines.
pub fn token_prefix(token_id: &str) -> &str {
    let end = token_id
        .char_indices()
        .nth(6)
        .map(|(i, _)| i)
        .unwrap_or(token_id.len());
    &token_id[..end]
}

/// Creates and persists a new session token for `user`, valid for `ttl`.
pub async fn issue(tokens: &dyn TokenRepository, user: &User, ttl: Duration) -> AppResult<Token> {
    let now = Utc::now();
    let token = Token {
        id: generate_token_id(),
        user_id: user.id,
        created_at: now,
        expires_at: Some(now + ttl),
    };

    let token = tokens.create(token).await?;
    tracing::info!(
        "token issued: user_id={}, token={}..., expires_at={:?}",
        user.id,
        token_prefix(&token.id),
        token.expires_at
    );
    Ok(token)
}

/// Exact-match lookup. Expiry is not checked here; see `identity::resolve`.
pub async fn lookup(tokens: &dyn TokenRepository, token_id: &str) -> AppResult<Option<Token>> {
    tokens.find_by_id(token_id).await
}

/// Deletes the token. A token that does not exist yields `NotFound`.
pub async fn revoke(tokens: &dyn TokenRepository, token_id: &str) -> AppResult<()> {
    if !tokens.delete(token_id).await? {
        return Err(AppError::NotFound("Token not found".to_string()));
    }

    tracing::info!("token revoked: token={}...", token_prefix(token_id));
    Ok(())
}

/// Storage housekeeping; correctness never depends on it.
pub async fn purge_expired(tokens: &dyn TokenRepository) -> AppResult<u64> {
    let removed = tokens.delete_expired(Utc::now()).await?;
    if removed > 0 {
        tracing::info!("purged {} expired tokens", removed);
    }
    Ok(removed)
}
