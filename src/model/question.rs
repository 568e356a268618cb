use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Languages a session or question can be authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// Italian.
    It,
}

/// One answer option of a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    /// Text shown to the player.
    pub text: String,
    /// Whether this is the single correct option.
    pub correct: bool,
    /// Optional authoring hint (0..=100) about how believable the option is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plausibility: Option<u8>,
}

/// Immutable quiz item supplied by the Question Bank.
///
/// The engine never mutates questions; sessions embed full copies so a
/// finished game can be replayed even when the bank changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    /// Stable identifier.
    pub id: Uuid,
    /// Question text.
    pub text: String,
    /// Topic this question belongs to.
    pub topic_id: String,
    /// Difficulty level, 1 (easiest) to 5.
    pub difficulty: u8,
    /// Language the question is written in.
    pub language: Language,
    /// Ordered answer options; exactly one has `correct = true`.
    pub answers: Vec<Answer>,
}

impl Question {
    /// Index of the single correct answer, if the invariant holds.
    pub fn correct_index(&self) -> Option<usize> {
        self.answers.iter().position(|answer| answer.correct)
    }

    /// Text of the correct answer, used by the per-session review board.
    pub fn correct_answer_text(&self) -> Option<&str> {
        self.correct_index()
            .map(|index| self.answers[index].text.as_str())
    }

    /// Whether the question carries exactly one correct answer.
    pub fn well_formed(&self) -> bool {
        self.answers.iter().filter(|answer| answer.correct).count() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answers: Vec<Answer>) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "capital of Italy?".into(),
            topic_id: "geography".into(),
            difficulty: 2,
            language: Language::En,
            answers,
        }
    }

    fn answer(text: &str, correct: bool) -> Answer {
        Answer {
            text: text.into(),
            correct,
            plausibility: None,
        }
    }

    #[test]
    fn correct_index_finds_single_correct() {
        let q = question(vec![
            answer("Milan", false),
            answer("Rome", true),
            answer("Turin", false),
        ]);
        assert_eq!(q.correct_index(), Some(1));
        assert_eq!(q.correct_answer_text(), Some("Rome"));
        assert!(q.well_formed());
    }

    #[test]
    fn well_formed_rejects_zero_or_multiple_correct() {
        assert!(!question(vec![answer("a", false), answer("b", false)]).well_formed());
        assert!(!question(vec![answer("a", true), answer("b", true)]).well_formed());
    }
}
