// src/handlers/mod.rs

pub mod auth;
pub mod diagnostic;
pub mod progress;
pub mod questions;
pub mod teacher;
