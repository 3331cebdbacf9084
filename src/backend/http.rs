//! HTTP implementation of the [`Backend`] trait.
//!
//! Talks JSON to the corpus service endpoints. Failures map onto the
//! [`BackendError`] taxonomy: request errors become `Transport`,
//! non-success statuses become `Status` with the response body retained
//! as the message, and undecodable bodies become `Malformed`. There is no
//! retry or backoff here; recovery is the caller's concern (the staging
//! workflow keeps its draft and lets the user retry).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::BackendConfig;
use crate::models::{DocumentRecord, PreviewInput};

use super::{
    Backend, BackendError, BackendResult, CommitReceipt, CommitRequest, DocumentPage,
    PreviewResponse, VisualizationPayload,
};

/// JSON client for the corpus service.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Build a client from configuration. The timeout applies per request.
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> BackendResult<T> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> BackendResult<T> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode(response).await
    }
}

/// Map a response into the error taxonomy, then decode the body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    serde_json::from_str(&body).map_err(|e| BackendError::Malformed(e.to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn preview(&self, input: &PreviewInput) -> BackendResult<PreviewResponse> {
        let body = match input {
            PreviewInput::Url(url) => serde_json::json!({ "url": url }),
            PreviewInput::Text(text) => serde_json::json!({ "text": text }),
        };
        self.post_json("fetch-preview/", &body).await
    }

    async fn commit(&self, request: &CommitRequest) -> BackendResult<CommitReceipt> {
        let receipt: CommitReceipt = self.post_json("fetch/", request).await?;
        if receipt.id.trim().is_empty() {
            return Err(BackendError::Malformed(
                "commit receipt has an empty id".to_string(),
            ));
        }
        Ok(receipt)
    }

    async fn list_documents(&self, page: u32, page_size: u32) -> BackendResult<DocumentPage> {
        let page = page.to_string();
        let page_size = page_size.to_string();
        self.get_json("list/", &[("page", page.as_str()), ("page_size", page_size.as_str())])
            .await
    }

    async fn get_document(&self, id: &str) -> BackendResult<DocumentRecord> {
        self.get_json(&format!("detail/{}/", id), &[]).await
    }

    async fn visualization_data(&self) -> BackendResult<VisualizationPayload> {
        self.get_json("visualization-data/", &[]).await
    }

    async fn notify(&self, doc_id: &str) -> BackendResult<()> {
        let url = self.endpoint("notify/");
        tracing::debug!(%url, doc_id, "GET");
        let response = self
            .client
            .get(&url)
            .query(&[("doc_id", doc_id)])
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
