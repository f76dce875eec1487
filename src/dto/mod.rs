pub mod questionnaire_dto;
