// src/handlers/mod.rs

pub mod answer;
pub mod auth;
pub mod question;
pub mod quiz;
pub mod result;
