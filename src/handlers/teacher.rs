// src/handlers/teacher.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{error::AppError, models::progress::StudentSummary};

/// Lists all students with their progress and latest diagnostic.
/// Teacher only.
pub async fn list_students(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let students = sqlx::query_as::<_, StudentSummary>(
        r#"
        SELECT
            u.id,
            u.name,
            u.email,
            COALESCE(p.total_xp, 0) AS total_xp,
            COALESCE(p.questions_answered, 0) AS questions_answered,
            COALESCE(p.overall_accuracy, 0.0) AS overall_accuracy,
            COALESCE(p.current_streak, 0) AS current_streak,
            (SELECT d.performance_level FROM diagnostic_results d
              WHERE d.user_id = u.id
              ORDER BY d.completed_at DESC, d.id DESC LIMIT 1) AS latest_performance_level,
            (SELECT d.score FROM diagnostic_results d
              WHERE d.user_id = u.id
              ORDER BY d.completed_at DESC, d.id DESC LIMIT 1) AS latest_diagnostic_score
        FROM users u
        LEFT JOIN student_progress p ON p.user_id = u.id
        WHERE u.role = 'student'
        ORDER BY u.name, u.id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list students: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(students))
}
