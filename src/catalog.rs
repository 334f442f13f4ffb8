// src/catalog.rs

use std::collections::HashSet;

use crate::{
    error::AppError,
    models::question::{Question, Topic},
};

const BUILTIN_CATALOG: &str = include_str!("../data/diagnostic_questions.json");

/// The fixed, ordered set of diagnostic questions.
///
/// Built once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    /// Parses the catalog embedded in the binary.
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parses and validates a catalog from JSON.
    /// Alternatives are normalized while deserializing `Question`.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let questions: Vec<Question> = serde_json::from_str(raw)
            .map_err(|e| AppError::Configuration(format!("invalid question catalog: {}", e)))?;
        Self::new(questions)
    }

    pub fn new(questions: Vec<Question>) -> Result<Self, AppError> {
        if questions.is_empty() {
            return Err(AppError::Configuration("question catalog is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id.as_str()) {
                return Err(AppError::Configuration(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }
            if question.alternatives.is_empty() {
                return Err(AppError::Configuration(format!(
                    "question '{}' has no alternatives",
                    question.id
                )));
            }
            if !question.has_alternative(&question.correct_answer) {
                return Err(AppError::Configuration(format!(
                    "question '{}' answer key '{}' is not one of its alternatives",
                    question.id, question.correct_answer
                )));
            }
        }

        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.questions().len(), 20);

        let hard = catalog
            .questions()
            .iter()
            .filter(|q| q.difficulty == Difficulty::Hard)
            .count();
        assert_eq!(hard, 2);

        // Topics appear in contiguous blocks, in display order.
        let mut blocks: Vec<(Topic, usize)> = Vec::new();
        for q in catalog.questions() {
            match blocks.last_mut() {
                Some((topic, count)) if *topic == q.topic => *count += 1,
                _ => blocks.push((q.topic, 1)),
            }
        }
        assert_eq!(
            blocks,
            vec![
                (Topic::BasicAlgebra, 5),
                (Topic::Geometry, 4),
                (Topic::LogicalReasoning, 4),
                (Topic::PercentageAndRatio, 4),
                (Topic::Functions, 3),
            ]
        );
    }

    #[test]
    fn test_question_eleven_answer_key() {
        let catalog = Catalog::builtin().unwrap();
        let q = catalog.get("11").unwrap();
        assert!(q.question_text.starts_with("Se todos os A são B"));
        assert_eq!(q.topic, Topic::LogicalReasoning);
        assert_eq!(q.difficulty, Difficulty::Hard);
        assert!(q.is_correct("B"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let raw = r#"[
            {"id": "1", "question_text": "a", "alternatives": ["x", "y"], "correct_answer": "A",
             "topic": "Geometria", "difficulty": "easy", "explanation": ""},
            {"id": "1", "question_text": "b", "alternatives": ["x", "y"], "correct_answer": "B",
             "topic": "Geometria", "difficulty": "easy", "explanation": ""}
        ]"#;
        assert!(matches!(Catalog::from_json(raw), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_rejects_unknown_answer_key() {
        let raw = r#"[
            {"id": "1", "question_text": "a", "alternatives": ["x", "y"], "correct_answer": "E",
             "topic": "Funções", "difficulty": "hard", "explanation": ""}
        ]"#;
        assert!(matches!(Catalog::from_json(raw), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_rejects_empty_catalog() {
        assert!(Catalog::from_json("[]").is_err());
    }
}
