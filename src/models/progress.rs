// src/models/progress.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::diagnostic::PerformanceLevel;

/// Represents the 'student_progress' table. One row per student.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct StudentProgress {
    pub user_id: i64,
    pub total_xp: i64,
    pub questions_answered: i64,
    pub questions_correct: i64,
    /// Percentage of practice attempts answered correctly.
    pub overall_accuracy: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_activity: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'topic_progress' table. One row per (student, topic).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TopicProgress {
    pub user_id: i64,
    pub topic_name: String,
    pub questions_attempted: i64,
    pub questions_correct: i64,
    pub current_accuracy: f64,
    /// Running mean of seconds per practice attempt.
    pub average_time: f64,
    /// Accuracy in the latest diagnostic, if one was taken.
    pub diagnostic_accuracy: Option<f64>,
    pub last_practiced: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'daily_activity' table. One row per (student, UTC day).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DailyActivity {
    pub user_id: i64,
    pub date: chrono::NaiveDate,
    pub questions_answered: i64,
    pub time_spent_minutes: i64,
    pub xp_earned: i64,
}

/// Per-question attempt summary used by the question bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct AttemptHistory {
    pub attempts: i64,
    pub correct_attempts: i64,
}

#[derive(Debug, FromRow)]
pub(crate) struct AttemptHistoryRow {
    pub question_id: String,
    #[sqlx(flatten)]
    pub history: AttemptHistory,
}

/// DTO for answering a question-bank question.
#[derive(Debug, Deserialize, Validate)]
pub struct AttemptRequest {
    #[validate(length(min = 1, max = 8))]
    pub selected_answer: String,
    #[validate(range(max = 86_400))]
    pub time_spent_seconds: u32,
}

/// Feedback returned after a question-bank attempt.
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub xp_earned: u32,
    pub first_attempt: bool,
    pub current_streak: i64,
    pub total_xp: i64,
}

/// Dashboard summary for the current student.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_xp: i64,
    pub questions_answered: i64,
    pub overall_accuracy: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_activity: Option<chrono::DateTime<chrono::Utc>>,
    pub diagnostic_completed: bool,
    pub performance_level: Option<PerformanceLevel>,
}

/// Query parameters for the activity history.
#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub days: Option<u32>,
}

/// A student's progress as seen by a teacher.
#[derive(Debug, Serialize, FromRow)]
pub struct StudentSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub total_xp: i64,
    pub questions_answered: i64,
    pub overall_accuracy: f64,
    pub current_streak: i64,
    pub latest_performance_level: Option<String>,
    pub latest_diagnostic_score: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReviewAck {
    pub question_id: String,
    pub xp_earned: u32,
    pub already_reviewed: bool,
    pub total_xp: i64,
}
