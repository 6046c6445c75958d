// src/seed.rs

use crate::{
    auth::credentials::HashScheme,
    config::AdminSeed,
    error::{AppError, AppResult},
    handlers::auth::{AccountFields, create_account},
    models::user::{Role, User},
    repository::Store,
};

/// Creates the configured admin account unless it already exists.
///
/// Returns the new user, or `None` when an account with the same email or
/// derived username is already present.
pub async fn seed_admin_user(
    store: &Store,
    seed: &AdminSeed,
    scheme: HashScheme,
) -> AppResult<Option<User>> {
    let created = create_account(
        store,
        scheme,
        AccountFields {
            email: &seed.email,
            first_name: &seed.first_name,
            middle_name: seed.middle_name.as_deref(),
            last_name: &seed.last_name,
            password: &seed.password,
            role: Role::Admin,
        },
    )
    .await;

    match created {
        Ok(user) => {
            tracing::info!("Admin user created: {}", user.username);
            Ok(Some(user))
        }
        Err(AppError::Conflict(_)) => {
            tracing::info!("Admin user already exists, skipping seed");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
