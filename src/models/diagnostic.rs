// src/models/diagnostic.rs

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::models::question::{Difficulty, Topic};

/// Upper bound for any single time value a client may report (one day).
const MAX_REPORTED_SECONDS: u32 = 86_400;

/// Everything the student sent when finishing the diagnostic.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DiagnosticSubmission {
    /// Key: question id, value: selected alternative id.
    /// Missing or blank entries are skipped questions.
    #[serde(default)]
    pub answers: HashMap<String, String>,

    /// Seconds spent per question id.
    #[serde(default)]
    #[validate(custom(function = validate_time_spent))]
    pub time_spent: HashMap<String, u32>,

    /// Wall time of the whole attempt, if the client tracked it.
    #[validate(range(max = 86_400))]
    pub total_time_seconds: Option<u64>,
}

fn validate_time_spent(times: &HashMap<String, u32>) -> Result<(), validator::ValidationError> {
    if times.values().any(|secs| *secs > MAX_REPORTED_SECONDS) {
        return Err(validator::ValidationError::new("time_spent_out_of_range"));
    }
    Ok(())
}

/// Knowledge level derived from a diagnostic attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLevel {
    Expert,
    Advanced,
    Intermediate,
    Basic,
}

impl PerformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Expert => "Expert",
            PerformanceLevel::Advanced => "Advanced",
            PerformanceLevel::Intermediate => "Intermediate",
            PerformanceLevel::Basic => "Basic",
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one catalog question within an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    /// `None` when the question was skipped.
    pub selected_answer: Option<String>,
    pub correct_answer: String,
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub time_spent_seconds: u32,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAggregate {
    pub topic: Topic,
    pub attempted: usize,
    pub correct: usize,
    pub accuracy: u32,
    pub average_time_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAggregate {
    pub difficulty: Difficulty,
    pub attempted: usize,
    pub correct: usize,
    pub accuracy: u32,
}

/// Running accuracy after answering `question_index` (1-based) questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeAccuracyPoint {
    pub question_index: usize,
    pub accuracy: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeCorrectnessPoint {
    pub question_id: String,
    pub time_spent_seconds: u32,
    pub is_correct: bool,
}

/// Chart-ready series for the results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub cumulative_accuracy: Vec<CumulativeAccuracyPoint>,
    pub time_vs_correctness: Vec<TimeCorrectnessPoint>,
}

/// Result of scoring one diagnostic attempt. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub score: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub performance_level: PerformanceLevel,
    pub total_time_seconds: u64,
    pub xp_earned: u32,
    pub skipped: usize,
    pub answers: Vec<AnswerRecord>,
    pub topics: Vec<TopicAggregate>,
    pub difficulties: Vec<DifficultyAggregate>,
    pub weak_topics: Vec<Topic>,
    pub strong_topics: Vec<Topic>,
    pub insights: Vec<String>,
    pub recommended_focus: Vec<Topic>,
    pub charts: ChartSeries,
}

/// Represents the 'diagnostic_results' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct DiagnosticResultRow {
    pub id: i64,
    /// Full scored report; score and level are also kept as columns for SQL listings.
    pub report: Json<DiagnosticResult>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// A stored diagnostic as returned to the client.
#[derive(Debug, Serialize)]
pub struct StoredDiagnostic {
    pub id: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    pub result: DiagnosticResult,
}

impl From<DiagnosticResultRow> for StoredDiagnostic {
    fn from(row: DiagnosticResultRow) -> Self {
        Self {
            id: row.id,
            completed_at: row.completed_at,
            result: row.report.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiagnosticStatus {
    pub completed: bool,
    pub last_completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub performance_level: Option<PerformanceLevel>,
}

/// Query parameters for the wrong-answer review.
#[derive(Debug, Deserialize)]
pub struct ReviewParams {
    pub topic: Option<Topic>,
}

/// A missed diagnostic question with its solution.
#[derive(Debug, Serialize)]
pub struct ReviewItem {
    pub question_id: String,
    pub question_text: String,
    pub alternatives: Vec<crate::models::question::Alternative>,
    pub selected_answer: Option<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub time_spent_seconds: u32,
}
