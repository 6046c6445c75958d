// src/models/mod.rs

pub mod answer;
pub mod question;
pub mod result;
pub mod token;
pub mod user;
