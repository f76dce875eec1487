use crate::models::answer_option::AnswerOption;
use crate::models::question::Question;
use crate::models::questionnaire::Questionnaire;
use crate::services::fill_service::QuestionControl;
use crate::utils::validation::not_blank;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOptionPayload {
    #[validate(custom(function = "not_blank"))]
    pub label: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    /// Kept when present so clients can round-trip their own question ids.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(custom(function = "not_blank"))]
    pub question_text: String,
    #[validate(
        length(min = 1, message = "A question needs at least one answer option"),
        custom(function = "distinct_labels"),
        nested
    )]
    pub answer_options: Vec<AnswerOptionPayload>,
}

/// Labels key the respondent's selections, so they must be unique within a question.
fn distinct_labels(options: &[AnswerOptionPayload]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if options.iter().all(|o| seen.insert(o.label.trim())) {
        return Ok(());
    }
    let mut err = ValidationError::new("duplicate_label");
    err.message = Some("Answer labels must be unique within a question".into());
    Err(err)
}

impl From<QuestionPayload> for Question {
    fn from(payload: QuestionPayload) -> Self {
        Question {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            question_text: payload.question_text,
            answer_options: payload
                .answer_options
                .into_iter()
                .map(|o| AnswerOption::new(o.label, o.is_correct))
                .collect(),
        }
    }
}

/// Body of create and update. On create, `passed_users` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnairePayload {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionPayload>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Pass score cannot be negative"))]
    pub pass_score: i64,
    #[serde(default)]
    pub passed_users: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub pass_score: u32,
    /// Whether the requesting user is among `passedUsers`.
    pub passed: bool,
}

impl QuestionnaireSummary {
    pub fn for_user(questionnaire: &Questionnaire, user_id: &str) -> Self {
        Self {
            id: questionnaire.id.clone().unwrap_or_default(),
            title: questionnaire.title.clone(),
            description: questionnaire.description.clone(),
            question_count: questionnaire.questions.len(),
            pass_score: questionnaire.pass_score,
            passed: questionnaire.has_passed(user_id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillViewResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub pass_score: u32,
    pub total_questions: usize,
    pub already_passed: bool,
    pub questions: Vec<QuestionControl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    #[serde(default)]
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

/// Body of the append-only pass endpoint used by remote stores.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPassRequest {
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersResponse {
    pub questionnaire_id: String,
    pub correct_count: usize,
    pub total_questions: usize,
    pub pass_score: u32,
    pub passed: bool,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_labels_and_empty_option_lists_are_invalid() {
        let payload: QuestionnairePayload = serde_json::from_value(json!({
            "title": "T",
            "description": "D",
            "questions": [
                { "questionText": "Q", "answerOptions": [] },
                { "questionText": "Q2", "answerOptions": [{ "label": "  ", "isCorrect": true }] }
            ],
            "passScore": 1
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn repeated_answer_label_is_invalid() {
        let payload: QuestionnairePayload = serde_json::from_value(json!({
            "title": "T",
            "description": "D",
            "questions": [{
                "questionText": "Which is the capital?",
                "answerOptions": [
                    { "label": "Paris", "isCorrect": true },
                    { "label": "Paris " }
                ]
            }],
            "passScore": 1
        }))
        .unwrap();
        assert!(payload.validate().is_err());

        let errors = payload.questions[0].validate().unwrap_err();
        assert_eq!(errors.field_errors()["answer_options"][0].code, "duplicate_label");
    }

    #[test]
    fn blank_title_is_invalid() {
        let payload: QuestionnairePayload = serde_json::from_value(json!({
            "title": " ",
            "description": "D"
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn well_formed_payload_converts_to_questions() {
        let id = Uuid::new_v4();
        let payload: QuestionnairePayload = serde_json::from_value(json!({
            "title": "T",
            "description": "D",
            "questions": [{
                "id": id,
                "questionText": "Which is the capital?",
                "answerOptions": [
                    { "label": "Paris", "isCorrect": true },
                    { "label": "London" }
                ]
            }],
            "passScore": 1
        }))
        .unwrap();
        assert!(payload.validate().is_ok());

        let question: Question = payload.questions[0].clone().into();
        assert_eq!(question.id, id);
        assert_eq!(question.correct_count(), 1);
        assert!(!question.answer_options[1].is_correct);
    }
}
