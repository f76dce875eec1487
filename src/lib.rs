pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use crate::services::questionnaire_service::QuestionnaireService;
use crate::store::QuestionnaireStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuestionnaireStore>,
    pub questionnaire_service: QuestionnaireService,
}

impl AppState {
    pub fn new(store: Arc<dyn QuestionnaireStore>) -> Self {
        let questionnaire_service = QuestionnaireService::new(store.clone());
        Self {
            store,
            questionnaire_service,
        }
    }
}
