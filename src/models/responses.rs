use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Selected option labels per question for one fill session, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserResponses {
    selections: HashMap<Uuid, Vec<String>>,
}

impl UserResponses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self, question_id: Uuid) -> &[String] {
        self.selections
            .get(&question_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_selected(&self, question_id: Uuid, label: &str) -> bool {
        self.selected(question_id).iter().any(|l| l == label)
    }

    pub fn selected_count(&self, question_id: Uuid) -> usize {
        self.selected(question_id).len()
    }

    /// Adds `label` to the selection. Returns false if it was already selected.
    pub fn insert(&mut self, question_id: Uuid, label: &str) -> bool {
        let entry = self.selections.entry(question_id).or_default();
        if entry.iter().any(|l| l == label) {
            return false;
        }
        entry.push(label.to_string());
        true
    }

    /// Removes `label` from the selection. Returns false if it was not selected.
    pub fn remove(&mut self, question_id: Uuid, label: &str) -> bool {
        match self.selections.get_mut(&question_id) {
            Some(entry) => {
                let before = entry.len();
                entry.retain(|l| l != label);
                entry.len() != before
            }
            None => false,
        }
    }

    /// Replaces the whole selection for a question with `label`.
    pub fn select_only(&mut self, question_id: Uuid, label: &str) {
        self.selections
            .insert(question_id, vec![label.to_string()]);
    }

    pub fn is_empty(&self) -> bool {
        self.selections.values().all(Vec::is_empty)
    }
}
