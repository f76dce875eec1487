pub mod answer_option;
pub mod question;
pub mod questionnaire;
pub mod responses;
