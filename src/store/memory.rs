use super::QuestionnaireStore;
use crate::error::{Error, Result};
use crate::models::questionnaire::Questionnaire;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store, ordered by creation.
#[derive(Default)]
pub struct InMemoryQuestionnaireStore {
    records: RwLock<Vec<Questionnaire>>,
}

impl InMemoryQuestionnaireStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Questionnaire {} not found", id))
}

#[async_trait]
impl QuestionnaireStore for InMemoryQuestionnaireStore {
    async fn create(&self, questionnaire: &Questionnaire) -> Result<Questionnaire> {
        let mut created = questionnaire.clone();
        created.id = Some(Uuid::new_v4().to_string());
        self.records.write().await.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> Result<Questionnaire> {
        self.records
            .read()
            .await
            .iter()
            .find(|q| q.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: &str, questionnaire: &Questionnaire) -> Result<Questionnaire> {
        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|q| q.id.as_deref() == Some(id))
            .ok_or_else(|| not_found(id))?;

        let mut passed_users = std::mem::take(&mut stored.passed_users);
        passed_users.extend(questionnaire.passed_users.iter().cloned());

        *stored = Questionnaire {
            id: Some(id.to_string()),
            title: questionnaire.title.clone(),
            description: questionnaire.description.clone(),
            questions: questionnaire.questions.clone(),
            pass_score: questionnaire.pass_score,
            passed_users,
        };
        Ok(stored.clone())
    }

    async fn record_pass(&self, id: &str, user_id: &str) -> Result<Questionnaire> {
        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|q| q.id.as_deref() == Some(id))
            .ok_or_else(|| not_found(id))?;
        stored.record_pass(user_id);
        Ok(stored.clone())
    }

    async fn list(&self) -> Result<Vec<Questionnaire>> {
        Ok(self.records.read().await.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|q| q.id.as_deref() != Some(id));
        if records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
