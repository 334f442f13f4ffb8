// src/services/diagnostic.rs

//! Diagnostic scoring.
//!
//! Reduces one diagnostic attempt over the fixed catalog into a
//! [`DiagnosticResult`]. Pure: no I/O, no clock, same input gives the same
//! output.

use std::collections::BTreeMap;

use crate::{
    config::{
        ADVANCED_MIN_HARD_CORRECT, ADVANCED_MIN_MEDIUM_CORRECT, ADVANCED_MIN_PERCENTAGE,
        DIAGNOSTIC_XP_PER_CORRECT, EXPERT_MIN_HARD_CORRECT, EXPERT_MIN_PERCENTAGE,
        FAST_RESPONSE_SECONDS, INTERMEDIATE_MIN_PERCENTAGE, RECOMMENDED_FOCUS_LIMIT,
        SKIPPED_NUDGE_THRESHOLD, SLOW_RESPONSE_SECONDS, STRONG_TOPIC_THRESHOLD,
        WEAK_TOPIC_THRESHOLD,
    },
    models::{
        diagnostic::{
            AnswerRecord, ChartSeries, CumulativeAccuracyPoint, DiagnosticResult,
            DiagnosticSubmission, DifficultyAggregate, PerformanceLevel, TimeCorrectnessPoint,
            TopicAggregate,
        },
        question::{Difficulty, Question, Topic},
    },
};

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    attempted: usize,
    correct: usize,
    time_seconds: u64,
}

impl Tally {
    fn record(&mut self, is_correct: bool, time_seconds: u32) {
        self.attempted += 1;
        if is_correct {
            self.correct += 1;
        }
        self.time_seconds += u64::from(time_seconds);
    }
}

/// `round(correct / total * 100)`, 0 when nothing was attempted.
pub fn accuracy(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// Scores a diagnostic attempt.
///
/// Questions are visited in catalog order; answers for ids outside the
/// catalog are ignored and blank selections count as skipped.
pub fn score_diagnostic(questions: &[Question], submission: &DiagnosticSubmission) -> DiagnosticResult {
    let mut answers = Vec::with_capacity(questions.len());
    let mut topic_tallies: Vec<(Topic, Tally)> = Vec::new();
    let mut difficulty_tallies: BTreeMap<Difficulty, Tally> = BTreeMap::new();

    for question in questions {
        let selected = submission
            .answers
            .get(&question.id)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty());
        let time_spent = submission.time_spent.get(&question.id).copied().unwrap_or(0);
        let is_correct = selected.is_some_and(|s| question.is_correct(s));

        match topic_tallies.iter_mut().find(|(t, _)| *t == question.topic) {
            Some((_, tally)) => tally.record(is_correct, time_spent),
            None => {
                let mut tally = Tally::default();
                tally.record(is_correct, time_spent);
                topic_tallies.push((question.topic, tally));
            }
        }
        difficulty_tallies
            .entry(question.difficulty)
            .or_default()
            .record(is_correct, time_spent);

        answers.push(AnswerRecord {
            question_id: question.id.clone(),
            selected_answer: selected.map(str::to_string),
            correct_answer: question.correct_answer.clone(),
            topic: question.topic,
            difficulty: question.difficulty,
            time_spent_seconds: time_spent,
            is_correct,
        });
    }

    let total_questions = questions.len();
    let score = answers.iter().filter(|a| a.is_correct).count();
    let skipped = answers.iter().filter(|a| a.selected_answer.is_none()).count();
    let percentage = accuracy(score, total_questions);

    let correct_at = |difficulty: Difficulty| {
        difficulty_tallies
            .get(&difficulty)
            .map_or(0, |tally| tally.correct)
    };
    let performance_level = classify(
        percentage,
        correct_at(Difficulty::Medium),
        correct_at(Difficulty::Hard),
    );

    let topics: Vec<TopicAggregate> = topic_tallies
        .into_iter()
        .map(|(topic, tally)| TopicAggregate {
            topic,
            attempted: tally.attempted,
            correct: tally.correct,
            accuracy: accuracy(tally.correct, tally.attempted),
            average_time_seconds: average(tally.time_seconds, tally.attempted),
        })
        .collect();

    let difficulties: Vec<DifficultyAggregate> = difficulty_tallies
        .into_iter()
        .map(|(difficulty, tally)| DifficultyAggregate {
            difficulty,
            attempted: tally.attempted,
            correct: tally.correct,
            accuracy: accuracy(tally.correct, tally.attempted),
        })
        .collect();

    let (weak_topics, strong_topics) = split_topics(&topics);

    let total_time_seconds = submission.total_time_seconds.unwrap_or_else(|| {
        answers
            .iter()
            .map(|a| u64::from(a.time_spent_seconds))
            .sum()
    });

    let insights = build_insights(
        &strong_topics,
        &weak_topics,
        total_time_seconds,
        total_questions,
        skipped,
    );

    let recommended_focus = weak_topics
        .iter()
        .take(RECOMMENDED_FOCUS_LIMIT)
        .copied()
        .collect();

    let charts = chart_series(&answers);

    DiagnosticResult {
        score,
        total_questions,
        percentage,
        performance_level,
        total_time_seconds,
        xp_earned: diagnostic_xp(score),
        skipped,
        answers,
        topics,
        difficulties,
        weak_topics,
        strong_topics,
        insights,
        recommended_focus,
        charts,
    }
}

/// First matching rule wins.
pub fn classify(percentage: u32, medium_correct: usize, hard_correct: usize) -> PerformanceLevel {
    if percentage >= EXPERT_MIN_PERCENTAGE && hard_correct >= EXPERT_MIN_HARD_CORRECT {
        PerformanceLevel::Expert
    } else if percentage > ADVANCED_MIN_PERCENTAGE
        && (medium_correct >= ADVANCED_MIN_MEDIUM_CORRECT
            || hard_correct >= ADVANCED_MIN_HARD_CORRECT)
    {
        PerformanceLevel::Advanced
    } else if percentage > INTERMEDIATE_MIN_PERCENTAGE {
        PerformanceLevel::Intermediate
    } else {
        PerformanceLevel::Basic
    }
}

/// Flat diagnostic XP: no difficulty weighting.
pub fn diagnostic_xp(score: usize) -> u32 {
    u32::try_from(score)
        .unwrap_or(u32::MAX)
        .saturating_mul(DIAGNOSTIC_XP_PER_CORRECT)
}

fn average(total: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total as f64 / count as f64
}

/// Weak topics ascending by accuracy, strong topics descending.
/// Equal accuracies keep catalog order.
fn split_topics(topics: &[TopicAggregate]) -> (Vec<Topic>, Vec<Topic>) {
    let mut weak: Vec<&TopicAggregate> = topics
        .iter()
        .filter(|t| t.accuracy < WEAK_TOPIC_THRESHOLD)
        .collect();
    weak.sort_by_key(|t| t.accuracy);

    let mut strong: Vec<&TopicAggregate> = topics
        .iter()
        .filter(|t| t.accuracy >= STRONG_TOPIC_THRESHOLD)
        .collect();
    strong.sort_by(|a, b| b.accuracy.cmp(&a.accuracy));

    (
        weak.into_iter().map(|t| t.topic).collect(),
        strong.into_iter().map(|t| t.topic).collect(),
    )
}

fn build_insights(
    strong_topics: &[Topic],
    weak_topics: &[Topic],
    total_time_seconds: u64,
    total_questions: usize,
    skipped: usize,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(top) = strong_topics.first() {
        insights.push(format!(
            "Your strongest topic is {}. Keep it sharp with occasional practice.",
            top
        ));
    }

    if let Some(focus) = weak_topics.first() {
        insights.push(format!(
            "Make {} your focus for the next 2 weeks.",
            focus
        ));
    }

    // An attempt with no recorded time averages 0 s and reads as rushed.
    if total_questions > 0 {
        let average_seconds = total_time_seconds as f64 / total_questions as f64;
        if average_seconds < FAST_RESPONSE_SECONDS {
            insights.push(format!(
                "You averaged {:.0}s per question. Fast answers are great, but double-check your reasoning before moving on.",
                average_seconds
            ));
        } else if average_seconds > SLOW_RESPONSE_SECONDS {
            insights.push(format!(
                "You averaged {:.0}s per question. Timed practice will help you build speed.",
                average_seconds
            ));
        }
    }

    if skipped > SKIPPED_NUDGE_THRESHOLD {
        insights.push(format!(
            "You skipped {} questions. Try to complete all questions next time for a more accurate diagnosis.",
            skipped
        ));
    }

    insights
}

fn chart_series(answers: &[AnswerRecord]) -> ChartSeries {
    let mut correct_so_far = 0;
    let cumulative_accuracy = answers
        .iter()
        .enumerate()
        .map(|(index, answer)| {
            if answer.is_correct {
                correct_so_far += 1;
            }
            CumulativeAccuracyPoint {
                question_index: index + 1,
                accuracy: accuracy(correct_so_far, index + 1),
            }
        })
        .collect();

    let time_vs_correctness = answers
        .iter()
        .map(|answer| TimeCorrectnessPoint {
            question_id: answer.question_id.clone(),
            time_spent_seconds: answer.time_spent_seconds,
            is_correct: answer.is_correct,
        })
        .collect();

    ChartSeries {
        cumulative_accuracy,
        time_vs_correctness,
    }
}
