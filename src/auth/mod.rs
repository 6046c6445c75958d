// src/auth/mod.rs

pub mod credentials;
pub mod identity;
pub mod ownership;
pub mod policy;
pub mod tokens;

pub use identity::{auth_middleware, bearer_token, resolve};
