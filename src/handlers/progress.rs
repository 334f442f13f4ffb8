// src/handlers/progress.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::{
    config::{DEFAULT_ACTIVITY_DAYS, MAX_ACTIVITY_DAYS},
    error::AppError,
    models::progress::{ActivityParams, DailyActivity, DashboardStats},
    store,
    utils::jwt::Claims,
};

/// Dashboard statistics of the current user.
pub async fn get_me(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let mut conn = pool.acquire().await?;

    let progress = store::fetch_student_progress(&mut conn, ctx.user_id).await?;
    let latest = store::latest_diagnostic(&mut conn, ctx.user_id).await?;

    Ok(Json(DashboardStats {
        total_xp: progress.total_xp,
        questions_answered: progress.questions_answered,
        overall_accuracy: progress.overall_accuracy,
        current_streak: progress.current_streak,
        longest_streak: progress.longest_streak,
        last_activity: progress.last_activity,
        diagnostic_completed: latest.is_some(),
        performance_level: latest.map(|row| row.report.0.performance_level),
    }))
}

/// Per-topic progress of the current user.
pub async fn list_topics(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let mut conn = pool.acquire().await?;

    Ok(Json(store::list_topic_progress(&mut conn, ctx.user_id).await?))
}

/// Daily activity for the last `days` days (default 7, at most 90), newest first.
pub async fn list_activity(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ActivityParams>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let days = params
        .days
        .unwrap_or(DEFAULT_ACTIVITY_DAYS)
        .clamp(1, MAX_ACTIVITY_DAYS);
    let since = Utc::now().date_naive() - Duration::days(i64::from(days) - 1);

    let activity = sqlx::query_as::<_, DailyActivity>(
        r#"
        SELECT user_id, date, questions_answered, time_spent_minutes, xp_earned
        FROM daily_activity
        WHERE user_id = ? AND date >= ?
        ORDER BY date DESC
        "#,
    )
    .bind(ctx.user_id)
    .bind(since)
    .fetch_all(&pool)
    .await?;

    Ok(Json(activity))
}
