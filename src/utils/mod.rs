// src/utils/mod.rs

pub mod username;
