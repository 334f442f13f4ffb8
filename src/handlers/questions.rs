// src/handlers/questions.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    catalog::Catalog,
    error::AppError,
    models::{
        progress::{AttemptRequest, AttemptResponse, TopicProgress},
        question::PublicQuestion,
    },
    services::{
        progress::practice_xp,
        question_bank::{BankFilter, list_questions, recommend},
    },
    store,
    utils::jwt::Claims,
};

const ATTEMPT_SOURCE: &str = "question_bank";

/// Lists the question bank with the current user's status per question.
pub async fn list_bank(
    State(pool): State<SqlitePool>,
    State(catalog): State<Arc<Catalog>>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<BankFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let mut conn = pool.acquire().await?;

    let history = store::attempt_history(&mut conn, ctx.user_id).await?;

    Ok(Json(list_questions(catalog.questions(), &history, &filter)))
}

/// Questions from weak diagnostic topics or previously missed.
pub async fn list_recommended(
    State(pool): State<SqlitePool>,
    State(catalog): State<Arc<Catalog>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let mut conn = pool.acquire().await?;

    let history = store::attempt_history(&mut conn, ctx.user_id).await?;
    let weak_topics = store::latest_diagnostic(&mut conn, ctx.user_id)
        .await?
        .map(|row| row.report.0.weak_topics)
        .unwrap_or_default();

    let picks: Vec<PublicQuestion> = recommend(catalog.questions(), &history, &weak_topics)
        .into_iter()
        .map(|q| q.to_public())
        .collect();

    Ok(Json(picks))
}

/// Answers one question-bank question.
///
/// * Checks the answer and computes practice XP (difficulty, first attempt, streak).
/// * Records the attempt and folds it into student, topic and daily progress.
/// * All writes share one transaction.
pub async fn submit_attempt(
    State(pool): State<SqlitePool>,
    State(catalog): State<Arc<Catalog>>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<String>,
    Json(req): Json<AttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let ctx = claims.context()?;

    let question = catalog
        .get(&question_id)
        .ok_or(AppError::NotFound(format!("Question '{}' not found", question_id)))?;

    let selected = req.selected_answer.trim();
    if !question.has_alternative(selected) {
        return Err(AppError::BadRequest(format!(
            "'{}' is not an alternative of question '{}'",
            selected, question_id
        )));
    }

    let now = Utc::now();
    let is_correct = question.is_correct(selected);

    let mut tx = pool.begin().await?;

    let previous_attempts = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM question_attempts WHERE user_id = ? AND question_id = ?",
    )
    .bind(ctx.user_id)
    .bind(&question.id)
    .fetch_one(&mut *tx)
    .await?;
    let first_attempt = previous_attempts == 0;

    let mut progress = store::fetch_student_progress(&mut tx, ctx.user_id).await?;
    let xp_earned = practice_xp(
        question.difficulty,
        is_correct,
        first_attempt,
        progress.has_streak(),
    );

    sqlx::query(
        r#"
        INSERT INTO question_attempts
            (user_id, question_id, selected_answer, is_correct, time_spent_seconds, source, xp_earned, attempted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(ctx.user_id)
    .bind(&question.id)
    .bind(selected)
    .bind(is_correct)
    .bind(i64::from(req.time_spent_seconds))
    .bind(ATTEMPT_SOURCE)
    .bind(i64::from(xp_earned))
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    progress.record_attempt(is_correct, xp_earned, now);
    store::save_student_progress(&mut tx, &progress).await?;

    let mut topic = store::fetch_topic_progress(&mut tx, ctx.user_id, question.topic.label())
        .await?
        .unwrap_or_else(|| TopicProgress::new(ctx.user_id, question.topic));
    topic.record_attempt(is_correct, req.time_spent_seconds, now);
    store::save_topic_progress(&mut tx, &topic).await?;

    let mut today = store::fetch_daily_activity(&mut tx, ctx.user_id, now.date_naive()).await?;
    today.record(1, u64::from(req.time_spent_seconds), xp_earned);
    store::save_daily_activity(&mut tx, &today).await?;

    tx.commit().await?;

    tracing::debug!(
        user_id = ctx.user_id,
        question_id = %question.id,
        difficulty = %question.difficulty,
        is_correct,
        xp_earned,
        "Question attempt recorded"
    );

    Ok(Json(AttemptResponse {
        is_correct,
        correct_answer: question.correct_answer.clone(),
        explanation: question.explanation.clone(),
        xp_earned,
        first_attempt,
        current_streak: progress.current_streak,
        total_xp: progress.total_xp,
    }))
}
