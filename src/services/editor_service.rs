//! In-place editing of questions already added to a draft.
//!
//! Only one question is edited at a time. The working copy lives in an [`EditSession`]
//! until `commit_edit` validates it and writes it back over the original.

use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::services::builder_service::{option_index_error, question_index_error, QuestionnaireBuilder};
use crate::utils::validation::is_blank;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub index: usize,
    pub question: Question,
}

impl QuestionnaireBuilder {
    /// Opens an edit session on the question at `index`, replacing any open one.
    pub fn start_edit(&mut self, index: usize) -> Result<&Question> {
        let question = self
            .draft
            .questions
            .get(index)
            .cloned()
            .ok_or_else(|| question_index_error(index))?;
        let session = self.edit.insert(EditSession { index, question });
        Ok(&session.question)
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    pub fn update_edited_question_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.edited_question_mut()?.question_text = text.into();
        Ok(())
    }

    pub fn update_edited_answer_label(
        &mut self,
        option_index: usize,
        text: impl Into<String>,
    ) -> Result<()> {
        let option = self
            .edited_question_mut()?
            .answer_options
            .get_mut(option_index)
            .ok_or_else(|| option_index_error(option_index))?;
        option.label = text.into();
        Ok(())
    }

    pub fn toggle_edited_answer_correctness(&mut self, option_index: usize) -> Result<()> {
        let option = self
            .edited_question_mut()?
            .answer_options
            .get_mut(option_index)
            .ok_or_else(|| option_index_error(option_index))?;
        option.is_correct = !option.is_correct;
        Ok(())
    }

    /// Writes the edited question back. A blank text or no correct option is rejected and
    /// leaves the session open for another try.
    pub fn commit_edit(&mut self) -> Result<()> {
        let session = self
            .edit
            .as_ref()
            .ok_or_else(no_session_error)?;

        let no_correct = session.question.answer_options.iter().all(|o| !o.is_correct);
        if no_correct || is_blank(&session.question.question_text) {
            return Err(Error::Validation(
                "Cannot save: no correct answer marked, or empty question text".to_string(),
            ));
        }

        let EditSession { index, question } = session.clone();
        self.edit_question(index, question)?;
        self.edit = None;
        Ok(())
    }

    fn edited_question_mut(&mut self) -> Result<&mut Question> {
        self.edit
            .as_mut()
            .map(|s| &mut s.question)
            .ok_or_else(no_session_error)
    }

    /// Keeps an open session pointing at the same question after `removed` is deleted.
    pub(crate) fn adjust_edit_after_removal(&mut self, removed: usize) {
        let Some(index) = self.edit.as_ref().map(|s| s.index) else {
            return;
        };
        if index == removed {
            self.edit = None;
        } else if let Some(session) = self.edit.as_mut().filter(|_| index > removed) {
            session.index -= 1;
        }
    }
}

fn no_session_error() -> Error {
    Error::Validation("No question is being edited".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer_option::AnswerOption;

    fn builder() -> QuestionnaireBuilder {
        let mut builder = QuestionnaireBuilder::new();
        builder.add_question(
            "Which is the capital?",
            vec![AnswerOption::correct("Paris"), AnswerOption::incorrect("London")],
        );
        builder.add_question(
            "Pick primes",
            vec![
                AnswerOption::correct("2"),
                AnswerOption::correct("3"),
                AnswerOption::incorrect("4"),
            ],
        );
        builder.add_question("Last", vec![AnswerOption::correct("yes")]);
        builder
    }

    #[test]
    fn commit_replaces_question_in_place() {
        let mut b = builder();
        let id = b.draft().questions[1].id;
        b.start_edit(1).unwrap();
        b.update_edited_question_text("Pick the primes").unwrap();
        b.update_edited_answer_label(2, "9").unwrap();
        b.toggle_edited_answer_correctness(1).unwrap();
        b.commit_edit().unwrap();

        let q = &b.draft().questions[1];
        assert_eq!(q.id, id);
        assert_eq!(q.question_text, "Pick the primes");
        assert_eq!(
            q.answer_options,
            vec![
                AnswerOption::correct("2"),
                AnswerOption::incorrect("3"),
                AnswerOption::incorrect("9"),
            ]
        );
        assert_eq!(b.draft().questions[0].question_text, "Which is the capital?");
        assert_eq!(b.draft().questions[2].question_text, "Last");
        assert!(b.editing().is_none());
    }

    #[test]
    fn commit_without_correct_answer_keeps_session_open() {
        let mut b = builder();
        b.start_edit(0).unwrap();
        b.toggle_edited_answer_correctness(0).unwrap();

        assert!(matches!(b.commit_edit(), Err(Error::Validation(_))));
        assert!(b.editing().is_some());
        assert!(b.draft().questions[0].answer_options[0].is_correct);

        b.toggle_edited_answer_correctness(1).unwrap();
        b.commit_edit().unwrap();
        assert_eq!(b.draft().questions[0].correct_labels().collect::<Vec<_>>(), vec!["London"]);
    }

    #[test]
    fn commit_with_blank_text_is_rejected() {
        let mut b = builder();
        b.start_edit(2).unwrap();
        b.update_edited_question_text("   ").unwrap();
        assert!(matches!(b.commit_edit(), Err(Error::Validation(_))));
        assert_eq!(b.editing().unwrap().question.question_text, "   ");
        assert_eq!(b.draft().questions[2].question_text, "Last");
    }

    #[test]
    fn edits_require_an_open_session() {
        let mut b = builder();
        assert!(b.update_edited_question_text("x").is_err());
        assert!(b.commit_edit().is_err());
        assert!(b.start_edit(9).is_err());
    }

    #[test]
    fn removing_questions_keeps_session_consistent() {
        let mut b = builder();
        b.start_edit(2).unwrap();
        b.remove_question(0).unwrap();
        assert_eq!(b.editing().unwrap().index, 1);

        b.remove_question(1).unwrap();
        assert!(b.editing().is_none());
    }

    #[test]
    fn commit_reclamps_pass_score() {
        let mut b = builder();
        b.set_pass_score(4);
        b.start_edit(1).unwrap();
        b.toggle_edited_answer_correctness(0).unwrap();
        b.commit_edit().unwrap();
        assert_eq!(b.total_correct_answers(), 3);
        assert_eq!(b.draft().pass_score, 3);
    }
}
