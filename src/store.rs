// src/store.rs

//! SQL shared by several handlers.
//!
//! Every function takes a `&mut SqliteConnection` so callers can run it on a
//! pooled connection or inside a transaction (`&mut *tx`).

use std::{collections::HashMap, str::FromStr, time::Duration};

use chrono::NaiveDate;
use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    error::AppError,
    models::{
        diagnostic::DiagnosticResultRow,
        progress::{AttemptHistory, AttemptHistoryRow, DailyActivity, StudentProgress, TopicProgress},
    },
};

/// Opens the SQLite pool with foreign keys enforced.
///
/// An in-memory database lives only as long as its connection, so it gets a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Applies the embedded migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalServerError(format!("migration failed: {}", e)))
}

pub async fn fetch_student_progress(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<StudentProgress, AppError> {
    let progress = sqlx::query_as::<_, StudentProgress>(
        r#"
        SELECT user_id, total_xp, questions_answered, questions_correct, overall_accuracy,
               current_streak, longest_streak, last_activity
        FROM student_progress
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(progress.unwrap_or_else(|| StudentProgress::new(user_id)))
}

pub async fn save_student_progress(
    conn: &mut SqliteConnection,
    progress: &StudentProgress,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO student_progress
            (user_id, total_xp, questions_answered, questions_correct, overall_accuracy,
             current_streak, longest_streak, last_activity)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            total_xp = excluded.total_xp,
            questions_answered = excluded.questions_answered,
            questions_correct = excluded.questions_correct,
            overall_accuracy = excluded.overall_accuracy,
            current_streak = excluded.current_streak,
            longest_streak = excluded.longest_streak,
            last_activity = excluded.last_activity
        "#,
    )
    .bind(progress.user_id)
    .bind(progress.total_xp)
    .bind(progress.questions_answered)
    .bind(progress.questions_correct)
    .bind(progress.overall_accuracy)
    .bind(progress.current_streak)
    .bind(progress.longest_streak)
    .bind(progress.last_activity)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch_topic_progress(
    conn: &mut SqliteConnection,
    user_id: i64,
    topic_name: &str,
) -> Result<Option<TopicProgress>, AppError> {
    let topic = sqlx::query_as::<_, TopicProgress>(
        r#"
        SELECT user_id, topic_name, questions_attempted, questions_correct, current_accuracy,
               average_time, diagnostic_accuracy, last_practiced
        FROM topic_progress
        WHERE user_id = ? AND topic_name = ?
        "#,
    )
    .bind(user_id)
    .bind(topic_name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(topic)
}

pub async fn list_topic_progress(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<TopicProgress>, AppError> {
    let topics = sqlx::query_as::<_, TopicProgress>(
        r#"
        SELECT user_id, topic_name, questions_attempted, questions_correct, current_accuracy,
               average_time, diagnostic_accuracy, last_practiced
        FROM topic_progress
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(topics)
}

pub async fn save_topic_progress(
    conn: &mut SqliteConnection,
    topic: &TopicProgress,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO topic_progress
            (user_id, topic_name, questions_attempted, questions_correct, current_accuracy,
             average_time, diagnostic_accuracy, last_practiced)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, topic_name) DO UPDATE SET
            questions_attempted = excluded.questions_attempted,
            questions_correct = excluded.questions_correct,
            current_accuracy = excluded.current_accuracy,
            average_time = excluded.average_time,
            diagnostic_accuracy = excluded.diagnostic_accuracy,
            last_practiced = excluded.last_practiced
        "#,
    )
    .bind(topic.user_id)
    .bind(&topic.topic_name)
    .bind(topic.questions_attempted)
    .bind(topic.questions_correct)
    .bind(topic.current_accuracy)
    .bind(topic.average_time)
    .bind(topic.diagnostic_accuracy)
    .bind(topic.last_practiced)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch_daily_activity(
    conn: &mut SqliteConnection,
    user_id: i64,
    date: NaiveDate,
) -> Result<DailyActivity, AppError> {
    let day = sqlx::query_as::<_, DailyActivity>(
        r#"
        SELECT user_id, date, questions_answered, time_spent_minutes, xp_earned
        FROM daily_activity
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(day.unwrap_or_else(|| DailyActivity::new(user_id, date)))
}

pub async fn save_daily_activity(
    conn: &mut SqliteConnection,
    day: &DailyActivity,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO daily_activity (user_id, date, questions_answered, time_spent_minutes, xp_earned)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id, date) DO UPDATE SET
            questions_answered = excluded.questions_answered,
            time_spent_minutes = excluded.time_spent_minutes,
            xp_earned = excluded.xp_earned
        "#,
    )
    .bind(day.user_id)
    .bind(day.date)
    .bind(day.questions_answered)
    .bind(day.time_spent_minutes)
    .bind(day.xp_earned)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Attempt counts per question id for one student.
pub async fn attempt_history(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<HashMap<String, AttemptHistory>, AppError> {
    let rows = sqlx::query_as::<_, AttemptHistoryRow>(
        r#"
        SELECT
            question_id,
            COUNT(*) AS attempts,
            SUM(CASE WHEN is_correct THEN 1 ELSE 0 END) AS correct_attempts
        FROM question_attempts
        WHERE user_id = ?
        GROUP BY question_id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.question_id, row.history))
        .collect())
}

pub async fn latest_diagnostic(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<DiagnosticResultRow>, AppError> {
    let row = sqlx::query_as::<_, DiagnosticResultRow>(
        r#"
        SELECT id, report, completed_at
        FROM diagnostic_results
        WHERE user_id = ?
        ORDER BY completed_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}
