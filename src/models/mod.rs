// src/models/mod.rs

pub mod diagnostic;
pub mod progress;
pub mod question;
pub mod user;
