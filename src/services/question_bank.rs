// src/services/question_bank.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    config::RECOMMENDED_QUESTION_LIMIT,
    models::{
        progress::AttemptHistory,
        question::{Difficulty, PublicQuestion, Question, Topic},
    },
    services::progress::base_xp,
};

/// Where a student stands on a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    NotAttempted,
    /// At least one attempt was correct.
    Correct,
    /// Attempted, never correct.
    Incorrect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Catalog,
    Difficulty,
}

/// Query parameters for listing the question bank.
#[derive(Debug, Default, Deserialize)]
pub struct BankFilter {
    pub topic: Option<Topic>,
    pub difficulty: Option<Difficulty>,
    pub status: Option<QuestionStatus>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// A question-bank listing entry.
#[derive(Debug, Serialize)]
pub struct BankEntry {
    #[serde(flatten)]
    pub question: PublicQuestion,
    pub status: QuestionStatus,
    pub xp: u32,
}

pub fn status_of(history: Option<&AttemptHistory>) -> QuestionStatus {
    match history {
        None => QuestionStatus::NotAttempted,
        Some(h) if h.attempts == 0 => QuestionStatus::NotAttempted,
        Some(h) if h.correct_attempts > 0 => QuestionStatus::Correct,
        Some(_) => QuestionStatus::Incorrect,
    }
}

/// Applies the filters and sort order to the catalog.
pub fn list_questions(
    questions: &[Question],
    history: &HashMap<String, AttemptHistory>,
    filter: &BankFilter,
) -> Vec<BankEntry> {
    let mut selected: Vec<(&Question, QuestionStatus)> = questions
        .iter()
        .filter(|q| filter.topic.is_none_or(|t| q.topic == t))
        .filter(|q| filter.difficulty.is_none_or(|d| q.difficulty == d))
        .map(|q| (q, status_of(history.get(&q.id))))
        .filter(|(_, status)| filter.status.is_none_or(|s| *status == s))
        .collect();

    if filter.sort == SortOrder::Difficulty {
        selected.sort_by_key(|(q, _)| q.difficulty);
    }

    selected
        .into_iter()
        .map(|(q, status)| BankEntry {
            question: q.to_public(),
            status,
            xp: base_xp(q.difficulty),
        })
        .collect()
}

/// Questions from weak topics or previously missed, in catalog order.
pub fn recommend<'a>(
    questions: &'a [Question],
    history: &HashMap<String, AttemptHistory>,
    weak_topics: &[Topic],
) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|q| {
            let missed = status_of(history.get(&q.id)) == QuestionStatus::Incorrect;
            missed || weak_topics.contains(&q.topic)
        })
        .take(RECOMMENDED_QUESTION_LIMIT)
        .collect()
}
