// src/services/progress.rs

//! XP policy and the pure folding of attempts into progress rows.
//!
//! Two XP rules coexist and are never mixed: a diagnostic pays a flat
//! amount per correct answer (see `services::diagnostic::diagnostic_xp`),
//! while practice attempts are weighted by difficulty with first-attempt and
//! streak bonuses.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    config::{
        FIRST_ATTEMPT_BONUS_XP, PRACTICE_XP_EASY, PRACTICE_XP_HARD, PRACTICE_XP_MEDIUM,
        STREAK_BONUS_XP,
    },
    models::{
        diagnostic::DiagnosticResult,
        progress::{DailyActivity, StudentProgress, TopicProgress},
        question::{Difficulty, Topic},
    },
};

/// Base XP a question is worth before bonuses.
pub fn base_xp(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => PRACTICE_XP_EASY,
        Difficulty::Medium => PRACTICE_XP_MEDIUM,
        Difficulty::Hard => PRACTICE_XP_HARD,
    }
}

/// XP for one practice attempt. Wrong answers earn nothing.
///
/// `had_streak` is the streak state *before* this attempt.
pub fn practice_xp(difficulty: Difficulty, is_correct: bool, first_attempt: bool, had_streak: bool) -> u32 {
    if !is_correct {
        return 0;
    }
    let mut xp = base_xp(difficulty);
    if first_attempt {
        xp += FIRST_ATTEMPT_BONUS_XP;
    }
    if had_streak {
        xp += STREAK_BONUS_XP;
    }
    xp
}

fn percentage(correct: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

impl StudentProgress {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            total_xp: 0,
            questions_answered: 0,
            questions_correct: 0,
            overall_accuracy: 0.0,
            current_streak: 0,
            longest_streak: 0,
            last_activity: None,
        }
    }

    pub fn has_streak(&self) -> bool {
        self.current_streak > 0
    }

    /// Folds one practice attempt: counters, accuracy, streaks and XP.
    pub fn record_attempt(&mut self, is_correct: bool, xp: u32, at: DateTime<Utc>) {
        self.questions_answered += 1;
        if is_correct {
            self.questions_correct += 1;
            self.current_streak += 1;
        } else {
            self.current_streak = 0;
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.overall_accuracy = percentage(self.questions_correct, self.questions_answered);
        self.add_xp(xp, at);
    }

    /// Credits XP without touching answer counters (diagnostics, reviews).
    pub fn add_xp(&mut self, xp: u32, at: DateTime<Utc>) {
        self.total_xp += i64::from(xp);
        self.last_activity = Some(at);
    }
}

impl TopicProgress {
    pub fn new(user_id: i64, topic: Topic) -> Self {
        Self {
            user_id,
            topic_name: topic.label().to_string(),
            questions_attempted: 0,
            questions_correct: 0,
            current_accuracy: 0.0,
            average_time: 0.0,
            diagnostic_accuracy: None,
            last_practiced: None,
        }
    }

    pub fn record_attempt(&mut self, is_correct: bool, time_spent_seconds: u32, at: DateTime<Utc>) {
        let total_time = self.average_time * self.questions_attempted as f64
            + f64::from(time_spent_seconds);
        self.questions_attempted += 1;
        if is_correct {
            self.questions_correct += 1;
        }
        self.current_accuracy = percentage(self.questions_correct, self.questions_attempted);
        self.average_time = total_time / self.questions_attempted as f64;
        self.last_practiced = Some(at);
    }
}

impl DailyActivity {
    pub fn new(user_id: i64, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            questions_answered: 0,
            time_spent_minutes: 0,
            xp_earned: 0,
        }
    }

    pub fn record(&mut self, questions: u32, time_spent_seconds: u64, xp: u32) {
        let minutes = i64::try_from(time_spent_seconds / 60).unwrap_or(i64::MAX);
        self.questions_answered = self.questions_answered.saturating_add(i64::from(questions));
        self.time_spent_minutes = self.time_spent_minutes.saturating_add(minutes);
        self.xp_earned = self.xp_earned.saturating_add(i64::from(xp));
    }
}

/// Diagnostic accuracy per topic, in catalog order.
pub fn diagnostic_topic_accuracy(result: &DiagnosticResult) -> Vec<(Topic, f64)> {
    result
        .topics
        .iter()
        .map(|t| (t.topic, f64::from(t.accuracy)))
        .collect()
}
