use super::answer_option::AnswerOption;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable key for responses; assigned when the question is added to a draft.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub question_text: String,
    #[serde(default)]
    pub answer_options: Vec<AnswerOption>,
}

/// How a question is presented to the respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlKind {
    /// Exactly one correct option: picking an option replaces the previous pick.
    ExclusiveChoice,
    /// Zero or several correct options: options toggle independently, at most `cap` at once.
    MultiChoice { cap: usize },
}

impl Question {
    pub fn new(question_text: impl Into<String>, answer_options: Vec<AnswerOption>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_text: question_text.into(),
            answer_options,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.answer_options.iter().filter(|o| o.is_correct).count()
    }

    pub fn correct_labels(&self) -> impl Iterator<Item = &str> {
        self.answer_options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.label.as_str())
    }

    pub fn has_option(&self, label: &str) -> bool {
        self.answer_options.iter().any(|o| o.label == label)
    }

    pub fn control_kind(&self) -> ControlKind {
        match self.correct_count() {
            1 => ControlKind::ExclusiveChoice,
            0 => ControlKind::MultiChoice {
                cap: self.answer_options.len(),
            },
            n => ControlKind::MultiChoice { cap: n },
        }
    }
}
