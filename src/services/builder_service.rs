use crate::error::{Error, Result};
use crate::models::answer_option::AnswerOption;
use crate::models::question::Question;
use crate::models::questionnaire::{duplicate_question_error, Questionnaire};
use crate::services::editor_service::EditSession;
use crate::store::QuestionnaireStore;
use crate::utils::validation::is_blank;
use uuid::Uuid;

/// Which required fields still block saving; drives the save button hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFields {
    None,
    Title,
    Description,
    TitleAndDescription,
}

impl MissingFields {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            MissingFields::None => None,
            MissingFields::Title => Some("Title is required"),
            MissingFields::Description => Some("Description is required"),
            MissingFields::TitleAndDescription => Some("Title and description are required"),
        }
    }
}

/// Client-side authoring session for one questionnaire.
///
/// Nothing reaches the store until [`QuestionnaireBuilder::save`] succeeds; the draft is
/// then reset so the same builder can author the next questionnaire.
#[derive(Debug, Default)]
pub struct QuestionnaireBuilder {
    pub(crate) draft: Questionnaire,
    pub(crate) edit: Option<EditSession>,
}

impl QuestionnaireBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Questionnaire {
        &self.draft
    }

    pub fn set_title(&mut self, text: impl Into<String>) {
        self.draft.title = text.into();
    }

    pub fn set_description(&mut self, text: impl Into<String>) {
        self.draft.description = text.into();
    }

    /// Appends a question. Correct options are not required here; the editor enforces them.
    pub fn add_question(
        &mut self,
        question_text: impl Into<String>,
        answer_options: Vec<AnswerOption>,
    ) -> Uuid {
        self.push_question(Question::new(question_text, answer_options))
    }

    /// Appends a question keeping its existing id. An id already in the draft is rejected.
    pub fn insert_question(&mut self, question: Question) -> Result<Uuid> {
        if self.draft.question(question.id).is_some() {
            return Err(duplicate_question_error(question.id));
        }
        Ok(self.push_question(question))
    }

    fn push_question(&mut self, question: Question) -> Uuid {
        let id = question.id;
        self.draft.questions.push(question);
        self.clamp_pass_score();
        id
    }

    pub fn remove_question(&mut self, index: usize) -> Result<Question> {
        if index >= self.draft.questions.len() {
            return Err(question_index_error(index));
        }
        let removed = self.draft.questions.remove(index);
        self.adjust_edit_after_removal(index);
        self.clamp_pass_score();
        Ok(removed)
    }

    /// Replaces the question at `index`; the replaced question's id is kept. An edit session
    /// open on the same question is dropped, since its working copy is now stale.
    pub fn edit_question(&mut self, index: usize, mut updated: Question) -> Result<()> {
        let slot = self
            .draft
            .questions
            .get_mut(index)
            .ok_or_else(|| question_index_error(index))?;
        updated.id = slot.id;
        *slot = updated;
        if self.edit.as_ref().is_some_and(|s| s.index == index) {
            self.edit = None;
        }
        self.clamp_pass_score();
        Ok(())
    }

    pub fn total_correct_answers(&self) -> u32 {
        self.draft.total_correct_answers()
    }

    /// Stores `value` clamped into `[0, total_correct_answers]` and returns what was stored.
    pub fn set_pass_score(&mut self, value: i64) -> u32 {
        let bound = self.total_correct_answers();
        self.draft.pass_score = value.clamp(0, i64::from(bound)) as u32;
        self.draft.pass_score
    }

    pub fn missing_fields(&self) -> MissingFields {
        match (is_blank(&self.draft.title), is_blank(&self.draft.description)) {
            (true, true) => MissingFields::TitleAndDescription,
            (true, false) => MissingFields::Title,
            (false, true) => MissingFields::Description,
            (false, false) => MissingFields::None,
        }
    }

    pub fn can_save(&self) -> bool {
        self.missing_fields() == MissingFields::None
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(message) = self.missing_fields().message() {
            return Err(Error::Validation(message.to_string()));
        }
        self.draft.validate_question_ids()?;
        self.draft.validate_pass_score()
    }

    /// Persists the draft through `store`. On any failure the draft is left untouched.
    pub async fn save(&mut self, store: &dyn QuestionnaireStore) -> Result<Questionnaire> {
        self.validate()?;

        let created = match store.create(&self.draft).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, title = %self.draft.title, "questionnaire save failed");
                return Err(e);
            }
        };

        tracing::info!(
            questionnaire_id = created.id.as_deref().unwrap_or_default(),
            questions = created.questions.len(),
            pass_score = created.pass_score,
            "questionnaire saved"
        );
        self.reset();
        Ok(created)
    }

    fn reset(&mut self) {
        self.draft = Questionnaire::default();
        self.edit = None;
    }

    fn clamp_pass_score(&mut self) {
        let bound = self.total_correct_answers();
        if self.draft.pass_score > bound {
            tracing::debug!(
                from = self.draft.pass_score,
                to = bound,
                "pass score lowered to the new bound"
            );
            self.draft.pass_score = bound;
        }
    }
}

pub(crate) fn question_index_error(index: usize) -> Error {
    Error::Validation(format!("No question at position {}", index))
}

/// The "new question" form: question text plus a growing list of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    question_text: String,
    answer_options: Vec<AnswerOption>,
}

impl Default for QuestionDraft {
    fn default() -> Self {
        Self {
            question_text: String::new(),
            answer_options: vec![AnswerOption::empty()],
        }
    }
}

impl QuestionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn answer_options(&self) -> &[AnswerOption] {
        &self.answer_options
    }

    pub fn set_question_text(&mut self, text: impl Into<String>) {
        self.question_text = text.into();
    }

    pub fn add_option(&mut self) -> usize {
        self.answer_options.push(AnswerOption::empty());
        self.answer_options.len() - 1
    }

    pub fn set_option_label(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let option = self
            .answer_options
            .get_mut(index)
            .ok_or_else(|| option_index_error(index))?;
        option.label = text.into();
        Ok(())
    }

    pub fn toggle_option_correct(&mut self, index: usize) -> Result<()> {
        let option = self
            .answer_options
            .get_mut(index)
            .ok_or_else(|| option_index_error(index))?;
        option.is_correct = !option.is_correct;
        Ok(())
    }

    /// Moves the drafted question into `builder` and clears the form.
    pub fn add_to(&mut self, builder: &mut QuestionnaireBuilder) -> Uuid {
        let drafted = std::mem::take(self);
        builder.add_question(drafted.question_text, drafted.answer_options)
    }
}

pub(crate) fn option_index_error(index: usize) -> Error {
    Error::Validation(format!("No answer option at position {}", index))
}
