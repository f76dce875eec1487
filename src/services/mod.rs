pub mod builder_service;
pub mod editor_service;
pub mod fill_service;
pub mod questionnaire_service;
pub mod scoring_service;
