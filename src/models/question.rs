// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Difficulty tier of a question. Ordered `Easy < Medium < Hard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject area a question belongs to.
/// Serialized with the labels shown to students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "Álgebra básica")]
    BasicAlgebra,
    #[serde(rename = "Geometria")]
    Geometry,
    #[serde(rename = "Raciocínio lógico")]
    LogicalReasoning,
    #[serde(rename = "Porcentagem e razão")]
    PercentageAndRatio,
    #[serde(rename = "Funções")]
    Functions,
}

impl Topic {
    pub fn label(&self) -> &'static str {
        match self {
            Topic::BasicAlgebra => "Álgebra básica",
            Topic::Geometry => "Geometria",
            Topic::LogicalReasoning => "Raciocínio lógico",
            Topic::PercentageAndRatio => "Porcentagem e razão",
            Topic::Functions => "Funções",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Letter identifying the alternative (e.g., "A").
    pub id: String,
    pub text: String,
}

/// A question of the diagnostic catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    pub question_text: String,

    /// Alternatives in display order.
    /// Accepts `{id, text}`, `{letter, text}` or plain strings on input.
    #[serde(deserialize_with = "deserialize_alternatives")]
    pub alternatives: Vec<Alternative>,

    /// Id of the correct alternative.
    pub correct_answer: String,

    pub topic: Topic,

    pub difficulty: Difficulty,

    /// Worked solution shown after answering.
    pub explanation: String,
}

impl Question {
    /// Strict comparison against the answer key.
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.correct_answer
    }

    pub fn has_alternative(&self, id: &str) -> bool {
        self.alternatives.iter().any(|alt| alt.id == id)
    }

    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id.clone(),
            question_text: self.question_text.clone(),
            alternatives: self.alternatives.clone(),
            topic: self.topic,
            difficulty: self.difficulty,
        }
    }
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub question_text: String,
    pub alternatives: Vec<Alternative>,
    pub topic: Topic,
    pub difficulty: Difficulty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAlternatives {
    Keyed(Vec<KeyedAlternative>),
    Plain(Vec<String>),
}

#[derive(Deserialize)]
struct KeyedAlternative {
    #[serde(alias = "letter")]
    id: String,
    text: String,
}

impl RawAlternatives {
    fn normalize(self) -> Vec<Alternative> {
        match self {
            RawAlternatives::Keyed(items) => items
                .into_iter()
                .map(|item| Alternative {
                    id: item.id,
                    text: item.text,
                })
                .collect(),
            RawAlternatives::Plain(texts) => texts
                .into_iter()
                .enumerate()
                .map(|(index, text)| Alternative {
                    id: alternative_label(index),
                    text,
                })
                .collect(),
        }
    }
}

/// "A", "B", ... for the first 26 positions, then the 1-based index.
fn alternative_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

fn deserialize_alternatives<'de, D>(deserializer: D) -> Result<Vec<Alternative>, D::Error>
where
    D: Deserializer<'de>,
{
    RawAlternatives::deserialize(deserializer).map(RawAlternatives::normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question_json(alternatives: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "1",
            "question_text": "2 + 2?",
            "alternatives": alternatives,
            "correct_answer": "B",
            "topic": "Álgebra básica",
            "difficulty": "easy",
            "explanation": "4"
        })
    }

    #[test]
    fn test_keyed_alternatives() {
        let q: Question =
            serde_json::from_value(question_json(json!([{"id": "A", "text": "3"}, {"id": "B", "text": "4"}])))
                .unwrap();
        assert_eq!(q.alternatives[1], Alternative { id: "B".into(), text: "4".into() });
        assert!(q.is_correct("B"));
        assert!(!q.is_correct("A"));
    }

    #[test]
    fn test_letter_alternatives() {
        let q: Question = serde_json::from_value(question_json(
            json!([{"letter": "A", "text": "3"}, {"letter": "B", "text": "4"}]),
        ))
        .unwrap();
        assert_eq!(q.alternatives[0].id, "A");
        assert!(q.has_alternative("B"));
    }

    #[test]
    fn test_plain_string_alternatives_get_letters() {
        let q: Question = serde_json::from_value(question_json(json!(["3", "4", "5"]))).unwrap();
        let ids: Vec<&str> = q.alternatives.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(q.alternatives[2].text, "5");
    }

    #[test]
    fn test_alternative_label_past_alphabet() {
        assert_eq!(alternative_label(0), "A");
        assert_eq!(alternative_label(25), "Z");
        assert_eq!(alternative_label(26), "27");
    }

    #[test]
    fn test_topic_serializes_as_label() {
        for topic in [Topic::BasicAlgebra, Topic::PercentageAndRatio, Topic::Functions] {
            assert_eq!(serde_json::to_value(topic).unwrap(), topic.label());
        }
        assert!(serde_json::from_value::<Topic>(json!("Química")).is_err());
    }

    #[test]
    fn test_difficulty_ordering() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
    }

    #[test]
    fn test_public_question_hides_answer() {
        let q: Question = serde_json::from_value(question_json(json!(["3", "4"]))).unwrap();
        let public = serde_json::to_value(q.to_public()).unwrap();
        assert!(public.get("correct_answer").is_none());
        assert!(public.get("explanation").is_none());
        assert_eq!(public["topic"], "Álgebra básica");
    }
}
