pub mod http;
pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::questionnaire::Questionnaire;
use async_trait::async_trait;

pub use http::HttpQuestionnaireStore;
pub use memory::InMemoryQuestionnaireStore;
pub use postgres::PgQuestionnaireStore;

/// Persistence for questionnaires.
///
/// Implementations must treat `passed_users` as append-only: `update` stores the union of
/// the current and the incoming set in one atomic step, and `record_pass` appends a single
/// user without rewriting the rest of the record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionnaireStore: Send + Sync {
    /// Persists a draft and returns it with its assigned id.
    async fn create(&self, questionnaire: &Questionnaire) -> Result<Questionnaire>;

    async fn get_by_id(&self, id: &str) -> Result<Questionnaire>;

    async fn update(&self, id: &str, questionnaire: &Questionnaire) -> Result<Questionnaire>;

    /// Adds `user_id` to `passed_users` and touches nothing else. Idempotent.
    async fn record_pass(&self, id: &str, user_id: &str) -> Result<Questionnaire>;

    async fn list(&self) -> Result<Vec<Questionnaire>>;

    async fn delete(&self, id: &str) -> Result<()>;
}
