// src/services/mod.rs

pub mod diagnostic;
pub mod progress;
pub mod question_bank;
