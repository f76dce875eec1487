use super::QuestionnaireStore;
use crate::error::{Error, Result};
use crate::models::questionnaire::Questionnaire;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for a remote questionnaire service exposing `/api/questionnaires`.
#[derive(Clone)]
pub struct HttpQuestionnaireStore {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpQuestionnaireStore {
    pub fn new(base_url: impl Into<String>, bearer_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, base_url, bearer_token))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        bearer_token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/questionnaires{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, id: Option<&str>) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, body = %body, "questionnaire store request failed");
        match status {
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!(
                "Questionnaire {} not found",
                id.unwrap_or_default()
            ))),
            StatusCode::BAD_REQUEST => Err(Error::Validation(body)),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized(body)),
            StatusCode::FORBIDDEN => Err(Error::Forbidden(body)),
            _ => Err(Error::Persistence(format!(
                "Questionnaire store responded with {}: {}",
                status, body
            ))),
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl QuestionnaireStore for HttpQuestionnaireStore {
    async fn create(&self, questionnaire: &Questionnaire) -> Result<Questionnaire> {
        let request = self.client.post(self.url("")).json(questionnaire);
        let response = self.send(request, None).await?;
        Self::json(response).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Questionnaire> {
        let request = self.client.get(self.url(&format!("/{}", id)));
        let response = self.send(request, Some(id)).await?;
        Self::json(response).await
    }

    async fn update(&self, id: &str, questionnaire: &Questionnaire) -> Result<Questionnaire> {
        let request = self
            .client
            .put(self.url(&format!("/{}", id)))
            .json(questionnaire);
        let response = self.send(request, Some(id)).await?;
        Self::json(response).await
    }

    async fn record_pass(&self, id: &str, user_id: &str) -> Result<Questionnaire> {
        let request = self
            .client
            .post(self.url(&format!("/{}/passes", id)))
            .json(&serde_json::json!({ "userId": user_id }));
        let response = self.send(request, Some(id)).await?;
        Self::json(response).await
    }

    async fn list(&self) -> Result<Vec<Questionnaire>> {
        let request = self.client.get(self.url("/records"));
        let response = self.send(request, None).await?;
        Self::json(response).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/{}", id)));
        self.send(request, Some(id)).await?;
        Ok(())
    }
}
