// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    auth::{
        bearer_token,
        credentials::{HashScheme, check_password_policy, hash_password, verify_password},
        policy, tokens,
    },
    config::Config,
    error::{AppError, AppResult},
    extract::AppJson,
    models::{
        token::LoginResponse,
        user::{LoginRequest, NewUser, RegisterUserRequest, Role, User, normalize_name},
    },
    repository::Store,
    utils::username::generate_username,
};

/// Account fields before hashing and username derivation.
pub struct AccountFields<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub last_name: &'a str,
    pub password: &'a str,
    pub role: Role,
}

/// Normalizes names, derives the username, hashes the password and inserts the user.
/// Performs no authorization; callers decide who may create which role.
pub async fn create_account(
    store: &Store,
    scheme: HashScheme,
    fields: AccountFields<'_>,
) -> AppResult<User> {
    check_password_policy(fields.password)?;

    let first_name = normalize_name(fields.first_name);
    let middle_name = fields
        .middle_name
        .map(normalize_name)
        .filter(|m| !m.is_empty());
    let last_name = normalize_name(fields.last_name);
    let email = fields.email.trim().to_lowercase();
    let username = generate_username(&first_name, middle_name.as_deref(), &last_name);

    if store
        .users
        .exists_by_email_or_username(&email, &username)
        .await?
    {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(fields.password, scheme)?;

    let user = store
        .users
        .create(NewUser {
            email,
            username,
            first_name,
            middle_name,
            last_name,
            password_hash,
            role: fields.role,
        })
        .await?;

    tracing::info!(
        "user registered: id={}, username={}, role={}",
        user.id,
        user.username,
        user.role.as_str()
    );
    Ok(user)
}

/// Registers a new teacher or student account.
///
/// Admin only; the requested role may not be `admin`.
/// The body is parsed only after the caller is known to be an admin.
/// Returns 201 Created and the user object (excluding the password hash).
pub async fn register(
    State(store): State<Store>,
    State(config): State<Config>,
    Extension(actor): Extension<User>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    policy::authorize_registrar(&actor)?;
    let Json(payload) = body?;

    policy::authorize_register(&actor, payload.role)?;
    payload.validate()?;

    let user = create_account(
        &store,
        config.password_scheme,
        AccountFields {
            email: &payload.email,
            first_name: &payload.first_name,
            middle_name: payload.middle_name.as_deref(),
            last_name: &payload.last_name,
            password: &payload.password,
            role: payload.role,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and opens a new session.
///
/// Unknown usernames and wrong passwords produce the same error.
pub async fn login(
    State(store): State<Store>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invalid_credentials = || AppError::AuthError("Invalid credentials".to_string());

    let user = store
        .users
        .find_by_username(payload.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        tracing::info!("failed login for username={}", user.username);
        return Err(invalid_credentials());
    }

    let token = tokens::issue(store.tokens.as_ref(), &user, config.token_ttl).await?;

    Ok(Json(LoginResponse::from(token)))
}

/// Ends the session named by the bearer token.
///
/// Not guarded by the resolver: a second logout with the same token answers 404.
pub async fn logout(
    State(store): State<Store>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&headers)?;
    tokens::revoke(store.tokens.as_ref(), token).await?;

    Ok(Json(json!({ "detail": "Logged out" })))
}

/// Returns the user behind the current token.
pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
