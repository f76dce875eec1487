use crate::error::Error;
use crate::models::question::Question;
use crate::models::questionnaire::Questionnaire;
use crate::models::responses::UserResponses;
use crate::store::QuestionnaireStore;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub correct_count: usize,
    pub total_questions: usize,
    pub passed: bool,
    /// The questionnaire with the respondent added to `passed_users` when they passed.
    pub questionnaire: Questionnaire,
    /// True when passing added the respondent to `passed_users` for the first time.
    pub newly_passed: bool,
}

/// Result of a submission: the score always, plus the persistence failure if recording
/// the pass did not reach the store.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub evaluation: Evaluation,
    pub persistence_error: Option<Error>,
}

impl SubmissionOutcome {
    pub fn persisted(&self) -> bool {
        self.persistence_error.is_none()
    }
}

pub struct ScoringService;

impl ScoringService {
    /// A question is correct when the selected labels equal the correct labels as sets.
    pub fn is_question_correct(question: &Question, responses: &UserResponses) -> bool {
        let expected: BTreeSet<&str> = question.correct_labels().collect();
        let actual: BTreeSet<&str> = responses
            .selected(question.id)
            .iter()
            .map(String::as_str)
            .collect();
        expected == actual
    }

    pub fn evaluate(
        questionnaire: &Questionnaire,
        responses: &UserResponses,
        user_id: &str,
    ) -> Evaluation {
        let correct_count = questionnaire
            .questions
            .iter()
            .filter(|q| Self::is_question_correct(q, responses))
            .count();
        let passed = correct_count >= questionnaire.pass_score as usize;

        let mut updated = questionnaire.clone();
        let newly_passed = passed && updated.record_pass(user_id);

        Evaluation {
            correct_count,
            total_questions: questionnaire.questions.len(),
            passed,
            questionnaire: updated,
            newly_passed,
        }
    }

    /// Evaluates and, on a first pass, appends the respondent through `store.record_pass`.
    /// Only the passed-user set is written, so edits made since the questionnaire was loaded
    /// survive. A failed or already-recorded submission never touches the store.
    pub async fn submit(
        store: &dyn QuestionnaireStore,
        questionnaire: &Questionnaire,
        responses: &UserResponses,
        user_id: &str,
    ) -> SubmissionOutcome {
        let mut evaluation = Self::evaluate(questionnaire, responses, user_id);
        tracing::info!(
            questionnaire_id = questionnaire.id.as_deref().unwrap_or_default(),
            user_id,
            correct = evaluation.correct_count,
            pass_score = questionnaire.pass_score,
            passed = evaluation.passed,
            "questionnaire evaluated"
        );

        if !evaluation.newly_passed {
            return SubmissionOutcome {
                evaluation,
                persistence_error: None,
            };
        }

        let persisted = match evaluation.questionnaire.require_id() {
            Ok(id) => store.record_pass(id, user_id).await,
            Err(e) => Err(e),
        };

        match persisted {
            Ok(stored) => {
                evaluation.questionnaire = stored;
                SubmissionOutcome {
                    evaluation,
                    persistence_error: None,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, user_id, "failed to record questionnaire pass");
                SubmissionOutcome {
                    evaluation,
                    persistence_error: Some(e),
                }
            }
        }
    }
}
