// src/config.rs

use std::env;

use dotenvy::dotenv;

use crate::error::AppError;

/// Topics whose diagnostic accuracy falls below this percentage are weak.
pub const WEAK_TOPIC_THRESHOLD: u32 = 50;
/// Topics at or above this percentage are strong.
pub const STRONG_TOPIC_THRESHOLD: u32 = 70;
/// How many weak topics are surfaced as recommended focus.
pub const RECOMMENDED_FOCUS_LIMIT: usize = 3;

pub const EXPERT_MIN_PERCENTAGE: u32 = 85;
pub const EXPERT_MIN_HARD_CORRECT: usize = 2;
pub const ADVANCED_MIN_PERCENTAGE: u32 = 70;
pub const ADVANCED_MIN_MEDIUM_CORRECT: usize = 3;
pub const ADVANCED_MIN_HARD_CORRECT: usize = 1;
pub const INTERMEDIATE_MIN_PERCENTAGE: u32 = 40;

/// Average seconds per question under which the student is warned to slow down.
pub const FAST_RESPONSE_SECONDS: f64 = 90.0;
/// Average seconds per question above which speed practice is suggested.
pub const SLOW_RESPONSE_SECONDS: f64 = 180.0;
/// More skipped questions than this triggers the completion nudge.
pub const SKIPPED_NUDGE_THRESHOLD: usize = 5;

pub const DIAGNOSTIC_XP_PER_CORRECT: u32 = 10;
pub const PRACTICE_XP_EASY: u32 = 10;
pub const PRACTICE_XP_MEDIUM: u32 = 15;
pub const PRACTICE_XP_HARD: u32 = 20;
pub const FIRST_ATTEMPT_BONUS_XP: u32 = 10;
pub const STREAK_BONUS_XP: u32 = 5;
pub const REVIEW_UNDERSTOOD_XP: u32 = 5;

pub const RECOMMENDED_QUESTION_LIMIT: usize = 5;
pub const DEFAULT_ACTIVITY_DAYS: u32 = 7;
pub const MAX_ACTIVITY_DAYS: u32 = 90;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub log_dir: String,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://portal.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Configuration("JWT_SECRET must be set".to_string()))?;

        let jwt_expiration = match env::var("JWT_EXPIRATION_SECONDS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                AppError::Configuration(format!("JWT_EXPIRATION_SECONDS is invalid: {}", e))
            })?,
            Err(_) => 86_400,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            log_dir,
            bind_addr,
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
