use super::QuestionnaireStore;
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::questionnaire::Questionnaire;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct QuestionnaireRow {
    id: String,
    title: String,
    description: String,
    questions: Json<Vec<Question>>,
    pass_score: i32,
    passed_users: Vec<String>,
}

impl From<QuestionnaireRow> for Questionnaire {
    fn from(row: QuestionnaireRow) -> Self {
        Questionnaire {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            questions: row.questions.0,
            pass_score: row.pass_score.max(0) as u32,
            passed_users: row.passed_users.into_iter().collect(),
        }
    }
}

fn pass_score_param(questionnaire: &Questionnaire) -> Result<i32> {
    i32::try_from(questionnaire.pass_score)
        .map_err(|_| Error::Validation("Pass score is out of range".to_string()))
}

#[derive(Clone)]
pub struct PgQuestionnaireStore {
    pool: PgPool,
}

impl PgQuestionnaireStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl QuestionnaireStore for PgQuestionnaireStore {
    async fn create(&self, questionnaire: &Questionnaire) -> Result<Questionnaire> {
        let id = Uuid::new_v4().to_string();
        let passed_users: Vec<String> = questionnaire.passed_users.iter().cloned().collect();

        let row = sqlx::query_as::<_, QuestionnaireRow>(
            r#"
            INSERT INTO questionnaires (id, title, description, questions, pass_score, passed_users)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&questionnaire.title)
        .bind(&questionnaire.description)
        .bind(Json(&questionnaire.questions))
        .bind(pass_score_param(questionnaire)?)
        .bind(&passed_users)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: &str) -> Result<Questionnaire> {
        let row = sqlx::query_as::<_, QuestionnaireRow>(
            r#"SELECT * FROM questionnaires WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Questionnaire {} not found", id)))?;

        Ok(row.into())
    }

    async fn update(&self, id: &str, questionnaire: &Questionnaire) -> Result<Questionnaire> {
        let passed_users: Vec<String> = questionnaire.passed_users.iter().cloned().collect();

        // The union happens inside the row update, so concurrent passes are all kept.
        let row = sqlx::query_as::<_, QuestionnaireRow>(
            r#"
            UPDATE questionnaires
            SET
                title = $2,
                description = $3,
                questions = $4,
                pass_score = $5,
                passed_users = ARRAY(
                    SELECT DISTINCT u FROM unnest(passed_users || $6::text[]) AS u ORDER BY u
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&questionnaire.title)
        .bind(&questionnaire.description)
        .bind(Json(&questionnaire.questions))
        .bind(pass_score_param(questionnaire)?)
        .bind(&passed_users)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Questionnaire {} not found", id)))?;

        Ok(row.into())
    }

    async fn record_pass(&self, id: &str, user_id: &str) -> Result<Questionnaire> {
        let row = sqlx::query_as::<_, QuestionnaireRow>(
            r#"
            UPDATE questionnaires
            SET
                passed_users = ARRAY(
                    SELECT DISTINCT u FROM unnest(array_append(passed_users, $2::text)) AS u ORDER BY u
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Questionnaire {} not found", id)))?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Questionnaire>> {
        let rows = sqlx::query_as::<_, QuestionnaireRow>(
            r#"SELECT * FROM questionnaires ORDER BY created_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Questionnaire::from).collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM questionnaires WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Questionnaire {} not found", id)));
        }
        Ok(())
    }
}
