// src/handlers/diagnostic.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::{SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    catalog::Catalog,
    config::REVIEW_UNDERSTOOD_XP,
    error::AppError,
    models::{
        diagnostic::{
            DiagnosticStatus, DiagnosticSubmission, ReviewItem, ReviewParams, StoredDiagnostic,
        },
        progress::{ReviewAck, TopicProgress},
        question::PublicQuestion,
    },
    services::{diagnostic::score_diagnostic, progress::diagnostic_topic_accuracy},
    store,
    utils::jwt::Claims,
};

/// Returns the diagnostic questions without answer keys.
pub async fn get_questions(State(catalog): State<Arc<Catalog>>) -> Json<Vec<PublicQuestion>> {
    Json(catalog.questions().iter().map(|q| q.to_public()).collect())
}

/// Scores and stores a diagnostic attempt.
///
/// * Scores the submission against the catalog.
/// * Inserts a new `diagnostic_results` row (retakes never overwrite).
/// * Credits the diagnostic XP, records per-topic diagnostic accuracy and
///   today's activity in the same transaction.
pub async fn submit_diagnostic(
    State(pool): State<SqlitePool>,
    State(catalog): State<Arc<Catalog>>,
    Extension(claims): Extension<Claims>,
    Json(submission): Json<DiagnosticSubmission>,
) -> Result<impl IntoResponse, AppError> {
    submission.validate()?;
    let ctx = claims.context()?;
    let result = score_diagnostic(catalog.questions(), &submission);
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO diagnostic_results
            (user_id, score, percentage, performance_level, xp_earned, report, completed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(ctx.user_id)
    .bind(result.score as i64)
    .bind(i64::from(result.percentage))
    .bind(result.performance_level.as_str())
    .bind(i64::from(result.xp_earned))
    .bind(SqlJson(&result))
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store diagnostic result: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let mut progress = store::fetch_student_progress(&mut tx, ctx.user_id).await?;
    progress.add_xp(result.xp_earned, now);
    store::save_student_progress(&mut tx, &progress).await?;

    for (topic, accuracy) in diagnostic_topic_accuracy(&result) {
        let mut topic_progress = store::fetch_topic_progress(&mut tx, ctx.user_id, topic.label())
            .await?
            .unwrap_or_else(|| TopicProgress::new(ctx.user_id, topic));
        topic_progress.diagnostic_accuracy = Some(accuracy);
        store::save_topic_progress(&mut tx, &topic_progress).await?;
    }

    let answered = (result.total_questions - result.skipped) as u32;
    let mut today = store::fetch_daily_activity(&mut tx, ctx.user_id, now.date_naive()).await?;
    today.record(answered, result.total_time_seconds, result.xp_earned);
    store::save_daily_activity(&mut tx, &today).await?;

    tx.commit().await?;

    tracing::info!(
        user_id = ctx.user_id,
        diagnostic_id = id,
        score = result.score,
        level = %result.performance_level,
        "Diagnostic submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(StoredDiagnostic {
            id,
            completed_at: now,
            result,
        }),
    ))
}

/// Latest stored diagnostic of the current user.
pub async fn get_latest(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let mut conn = pool.acquire().await?;

    let row = store::latest_diagnostic(&mut conn, ctx.user_id)
        .await?
        .ok_or(AppError::NotFound("No diagnostic found".to_string()))?;

    Ok(Json(StoredDiagnostic::from(row)))
}

/// Whether the current user has completed the diagnostic.
pub async fn get_status(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let mut conn = pool.acquire().await?;

    let latest = store::latest_diagnostic(&mut conn, ctx.user_id).await?;

    Ok(Json(DiagnosticStatus {
        completed: latest.is_some(),
        last_completed_at: latest.as_ref().map(|row| row.completed_at),
        performance_level: latest.map(|row| row.report.0.performance_level),
    }))
}

/// Questions missed (wrong or skipped) in the latest diagnostic.
pub async fn get_review(
    State(pool): State<SqlitePool>,
    State(catalog): State<Arc<Catalog>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ReviewParams>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let mut conn = pool.acquire().await?;

    let latest = store::latest_diagnostic(&mut conn, ctx.user_id)
        .await?
        .ok_or(AppError::NotFound("No diagnostic found".to_string()))?;

    let items: Vec<ReviewItem> = latest
        .report
        .0
        .answers
        .into_iter()
        .filter(|answer| !answer.is_correct)
        .filter(|answer| params.topic.is_none_or(|t| answer.topic == t))
        .filter_map(|answer| {
            // Questions removed from the catalog since the attempt are dropped.
            let question = catalog.get(&answer.question_id)?;
            Some(ReviewItem {
                question_id: answer.question_id,
                question_text: question.question_text.clone(),
                alternatives: question.alternatives.clone(),
                selected_answer: answer.selected_answer,
                correct_answer: question.correct_answer.clone(),
                explanation: question.explanation.clone(),
                topic: question.topic,
                difficulty: question.difficulty,
                time_spent_seconds: answer.time_spent_seconds,
            })
        })
        .collect();

    Ok(Json(items))
}

/// Marks a missed diagnostic question as understood.
/// Awards XP the first time only.
pub async fn mark_understood(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = claims.context()?;
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    let latest = store::latest_diagnostic(&mut tx, ctx.user_id)
        .await?
        .ok_or(AppError::NotFound("No diagnostic found".to_string()))?;

    let missed = latest
        .report
        .0
        .answers
        .iter()
        .any(|answer| answer.question_id == question_id && !answer.is_correct);
    if !missed {
        return Err(AppError::NotFound(format!(
            "Question '{}' is not among the missed diagnostic questions",
            question_id
        )));
    }

    let inserted = sqlx::query(
        r#"
        INSERT OR IGNORE INTO review_marks (user_id, diagnostic_id, question_id, reviewed_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(ctx.user_id)
    .bind(latest.id)
    .bind(&question_id)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let already_reviewed = inserted == 0;
    let xp_earned = if already_reviewed { 0 } else { REVIEW_UNDERSTOOD_XP };

    let mut progress = store::fetch_student_progress(&mut tx, ctx.user_id).await?;
    if !already_reviewed {
        progress.add_xp(xp_earned, now);
        store::save_student_progress(&mut tx, &progress).await?;

        let mut today = store::fetch_daily_activity(&mut tx, ctx.user_id, now.date_naive()).await?;
        today.record(0, 0, xp_earned);
        store::save_daily_activity(&mut tx, &today).await?;
    }

    tx.commit().await?;

    Ok(Json(ReviewAck {
        question_id,
        xp_earned,
        already_reviewed,
        total_xp: progress.total_xp,
    }))
}
