use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub label: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(label: impl Into<String>, is_correct: bool) -> Self {
        Self {
            label: label.into(),
            is_correct,
        }
    }

    pub fn correct(label: impl Into<String>) -> Self {
        Self::new(label, true)
    }

    pub fn incorrect(label: impl Into<String>) -> Self {
        Self::new(label, false)
    }

    /// The blank option a new question starts with.
    pub fn empty() -> Self {
        Self::new(String::new(), false)
    }
}
