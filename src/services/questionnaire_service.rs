use crate::dto::questionnaire_dto::{
    FillViewResponse, QuestionnairePayload, QuestionnaireSummary, SubmitAnswersRequest,
    SubmitAnswersResponse,
};
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::models::question::Question;
use crate::models::questionnaire::Questionnaire;
use crate::services::builder_service::QuestionnaireBuilder;
use crate::services::fill_service::FillSession;
use crate::store::QuestionnaireStore;
use std::sync::Arc;

/// Server-side entry point tying the store to the builder and the fill flow.
#[derive(Clone)]
pub struct QuestionnaireService {
    store: Arc<dyn QuestionnaireStore>,
}

impl QuestionnaireService {
    pub fn new(store: Arc<dyn QuestionnaireStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn QuestionnaireStore {
        self.store.as_ref()
    }

    /// Authors a questionnaire from an admin payload. The pass score goes through the
    /// builder's clamp, so an over-large value is lowered rather than rejected.
    pub async fn create(&self, payload: QuestionnairePayload) -> Result<Questionnaire> {
        let mut builder = QuestionnaireBuilder::new();
        builder.set_title(payload.title);
        builder.set_description(payload.description);
        for question in payload.questions {
            builder.insert_question(question.into())?;
        }
        builder.set_pass_score(payload.pass_score);
        builder.save(self.store()).await
    }

    pub async fn get(&self, id: &str) -> Result<Questionnaire> {
        self.store.get_by_id(id).await
    }

    pub async fn list_records(&self) -> Result<Vec<Questionnaire>> {
        self.store.list().await
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<QuestionnaireSummary>> {
        let records = self.store.list().await?;
        Ok(records
            .iter()
            .map(|q| QuestionnaireSummary::for_user(q, user_id))
            .collect())
    }

    /// Replaces a stored questionnaire. Unlike `create`, an out-of-range pass score is an error.
    pub async fn replace(&self, id: &str, payload: QuestionnairePayload) -> Result<Questionnaire> {
        let questionnaire = Questionnaire {
            id: Some(id.to_string()),
            title: payload.title,
            description: payload.description,
            questions: payload.questions.into_iter().map(Question::from).collect(),
            pass_score: u32::try_from(payload.pass_score).unwrap_or(u32::MAX),
            passed_users: payload.passed_users,
        };
        questionnaire.validate_question_ids()?;
        questionnaire.validate_pass_score()?;

        let updated = self.store.update(id, &questionnaire).await?;
        tracing::info!(questionnaire_id = id, "questionnaire replaced");
        Ok(updated)
    }

    pub async fn record_pass(&self, id: &str, user_id: &str) -> Result<Questionnaire> {
        let updated = self.store.record_pass(id, user_id.trim()).await?;
        tracing::info!(questionnaire_id = id, user_id, "pass recorded");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(questionnaire_id = id, "questionnaire deleted");
        Ok(())
    }

    pub async fn fill_view(&self, id: &str, user_id: &str) -> Result<FillViewResponse> {
        let mut session = FillSession::new();
        let questionnaire = session.load(self.store(), id).await?;
        let already_passed = questionnaire.has_passed(user_id);
        let (title, description, pass_score, total_questions) = (
            questionnaire.title.clone(),
            questionnaire.description.clone(),
            questionnaire.pass_score,
            questionnaire.questions.len(),
        );

        Ok(FillViewResponse {
            id: id.to_string(),
            title,
            description,
            pass_score,
            total_questions,
            already_passed,
            questions: session.render()?,
        })
    }

    /// Replays submitted selections through a fill session, then scores them.
    /// Selections beyond a question's cap are dropped the same way the form disables them.
    pub async fn submit(
        &self,
        id: &str,
        request: SubmitAnswersRequest,
        identity: &dyn IdentityProvider,
    ) -> Result<SubmitAnswersResponse> {
        let mut session = FillSession::new();
        session.load(self.store(), id).await?;

        for answer in &request.answers {
            for label in &answer.selected {
                if !session.on_option_toggle(answer.question_id, label, true)? {
                    tracing::debug!(
                        question_id = %answer.question_id,
                        label = %label,
                        "submitted selection ignored"
                    );
                }
            }
        }

        let outcome = session.submit(self.store(), identity).await?;
        let evaluation = &outcome.evaluation;
        Ok(SubmitAnswersResponse {
            questionnaire_id: id.to_string(),
            correct_count: evaluation.correct_count,
            total_questions: evaluation.total_questions,
            pass_score: evaluation.questionnaire.pass_score,
            passed: evaluation.passed,
            persisted: outcome.persisted(),
            persistence_error: outcome.persistence_error.as_ref().map(ToString::to_string),
        })
    }
}
