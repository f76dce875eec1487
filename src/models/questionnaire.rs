use super::question::Question;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    /// Assigned by the store on create; `None` while the questionnaire is a draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub pass_score: u32,
    #[serde(default)]
    pub passed_users: BTreeSet<String>,
}

impl Questionnaire {
    /// Sum of correct options across all questions; the upper bound for `pass_score`.
    pub fn total_correct_answers(&self) -> u32 {
        self.questions
            .iter()
            .map(|q| q.correct_count() as u32)
            .sum()
    }

    pub fn question(&self, question_id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn has_passed(&self, user_id: &str) -> bool {
        self.passed_users.contains(user_id)
    }

    /// Adds `user_id` to the passed set. Returns false when it was already there.
    pub fn record_pass(&mut self, user_id: &str) -> bool {
        self.passed_users.insert(user_id.to_string())
    }

    pub fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| Error::Validation("Questionnaire has not been saved yet".to_string()))
    }

    /// Responses are keyed by question id, so ids must be unique within a questionnaire.
    pub fn validate_question_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        match self.questions.iter().find(|q| !seen.insert(q.id)) {
            Some(dup) => Err(duplicate_question_error(dup.id)),
            None => Ok(()),
        }
    }

    pub fn validate_pass_score(&self) -> Result<()> {
        let bound = self.total_correct_answers();
        if self.pass_score > bound {
            return Err(Error::Validation(format!(
                "Pass score {} exceeds the {} correct answers available",
                self.pass_score, bound
            )));
        }
        Ok(())
    }
}

pub(crate) fn duplicate_question_error(id: Uuid) -> Error {
    Error::Validation(format!("Question id {} is used more than once", id))
}
