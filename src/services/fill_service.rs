use crate::error::{Error, Result};
use crate::identity::IdentityProvider;
use crate::models::question::{ControlKind, Question};
use crate::models::questionnaire::Questionnaire;
use crate::models::responses::UserResponses;
use crate::services::scoring_service::{ScoringService, SubmissionOutcome};
use crate::store::QuestionnaireStore;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionControl {
    pub label: String,
    pub selected: bool,
    pub disabled: bool,
}

/// What the respondent sees for one question. Correctness is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionControl {
    pub question_id: Uuid,
    pub question_text: String,
    pub control: ControlKind,
    pub options: Vec<OptionControl>,
}

pub fn render_question(question: &Question, responses: &UserResponses) -> QuestionControl {
    let control = question.control_kind();
    let full = match control {
        ControlKind::ExclusiveChoice => false,
        ControlKind::MultiChoice { cap } => responses.selected_count(question.id) >= cap,
    };

    let options = question
        .answer_options
        .iter()
        .map(|option| {
            let selected = responses.is_selected(question.id, &option.label);
            OptionControl {
                label: option.label.clone(),
                selected,
                disabled: full && !selected,
            }
        })
        .collect();

    QuestionControl {
        question_id: question.id,
        question_text: question.question_text.clone(),
        control,
        options,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillOutcome {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    NotFound(String),
    Persistence(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillState {
    NotStarted,
    Loading,
    Ready,
    Submitted(FillOutcome),
    Error(LoadFailure),
}

/// One respondent working through one questionnaire.
///
/// `NotStarted -> Loading -> Ready -> Submitted`, with `Loading -> Error` when the fetch
/// fails. `Submitted` and `Error` are terminal. A pass the store could not record leaves
/// the session `Ready` with its responses intact, so `submit` can be retried.
#[derive(Debug)]
pub struct FillSession {
    state: FillState,
    questionnaire: Option<Questionnaire>,
    responses: UserResponses,
}

impl Default for FillSession {
    fn default() -> Self {
        Self {
            state: FillState::NotStarted,
            questionnaire: None,
            responses: UserResponses::new(),
        }
    }
}

impl FillSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FillState {
        &self.state
    }

    pub fn questionnaire(&self) -> Option<&Questionnaire> {
        self.questionnaire.as_ref()
    }

    pub fn responses(&self) -> &UserResponses {
        &self.responses
    }

    pub async fn load(&mut self, store: &dyn QuestionnaireStore, id: &str) -> Result<&Questionnaire> {
        if self.state != FillState::NotStarted {
            return Err(Error::Validation("Fill session was already started".to_string()));
        }

        self.state = FillState::Loading;
        match store.get_by_id(id).await {
            Ok(questionnaire) => {
                self.state = FillState::Ready;
                Ok(&*self.questionnaire.insert(questionnaire))
            }
            Err(e) => {
                tracing::warn!(questionnaire_id = id, error = %e, "failed to load questionnaire");
                self.state = FillState::Error(match &e {
                    Error::NotFound(msg) => LoadFailure::NotFound(msg.clone()),
                    other => LoadFailure::Persistence(other.to_string()),
                });
                Err(e)
            }
        }
    }

    pub fn render(&self) -> Result<Vec<QuestionControl>> {
        let questionnaire = self.ready_questionnaire()?;
        Ok(questionnaire
            .questions
            .iter()
            .map(|q| render_question(q, &self.responses))
            .collect())
    }

    /// Checks or unchecks one option. Returns whether the selection changed; checking an
    /// option of a multi-choice question whose cap is reached is a no-op.
    pub fn on_option_toggle(&mut self, question_id: Uuid, label: &str, selected: bool) -> Result<bool> {
        let control = self.option_of(question_id, label)?;

        if !selected {
            return Ok(self.responses.remove(question_id, label));
        }
        if self.responses.is_selected(question_id, label) {
            return Ok(false);
        }

        match control {
            ControlKind::ExclusiveChoice => {
                self.responses.select_only(question_id, label);
                Ok(true)
            }
            ControlKind::MultiChoice { cap } => {
                if self.responses.selected_count(question_id) >= cap {
                    tracing::debug!(%question_id, label, cap, "selection cap reached, option disabled");
                    return Ok(false);
                }
                Ok(self.responses.insert(question_id, label))
            }
        }
    }

    /// Picks `label` as the only answer of a single-answer question.
    pub fn on_exclusive_select(&mut self, question_id: Uuid, label: &str) -> Result<bool> {
        match self.option_of(question_id, label)? {
            ControlKind::ExclusiveChoice => {
                let changed = self.responses.selected_count(question_id) != 1
                    || !self.responses.is_selected(question_id, label);
                self.responses.select_only(question_id, label);
                Ok(changed)
            }
            ControlKind::MultiChoice { .. } => Err(Error::Validation(
                "Question accepts several answers; toggle options instead".to_string(),
            )),
        }
    }

    /// Scores the accumulated responses for the current user and ends the session, unless
    /// recording a pass failed.
    pub async fn submit(
        &mut self,
        store: &dyn QuestionnaireStore,
        identity: &dyn IdentityProvider,
    ) -> Result<SubmissionOutcome> {
        let questionnaire = self.ready_questionnaire()?;
        let user_id = identity.current_user_id()?;

        let outcome = ScoringService::submit(store, questionnaire, &self.responses, &user_id).await;
        if !outcome.persisted() {
            tracing::warn!(user_id = %user_id, "pass not recorded; session stays open for retry");
            return Ok(outcome);
        }
        self.state = FillState::Submitted(if outcome.evaluation.passed {
            FillOutcome::Passed
        } else {
            FillOutcome::Failed
        });
        Ok(outcome)
    }

    fn ready_questionnaire(&self) -> Result<&Questionnaire> {
        match (&self.state, &self.questionnaire) {
            (FillState::Ready, Some(q)) => Ok(q),
            (FillState::Submitted(_), _) => Err(Error::Validation(
                "Questionnaire has already been submitted".to_string(),
            )),
            _ => Err(Error::Validation("Questionnaire is not loaded".to_string())),
        }
    }

    fn option_of(&self, question_id: Uuid, label: &str) -> Result<ControlKind> {
        let question = self
            .ready_questionnaire()?
            .question(question_id)
            .ok_or_else(|| Error::Validation(format!("Unknown question {}", question_id)))?;
        if !question.has_option(label) {
            return Err(Error::Validation(format!(
                "'{}' is not an option of question {}",
                label, question_id
            )));
        }
        Ok(question.control_kind())
    }
}
