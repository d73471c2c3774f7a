//! HTTP Transport
//!
//! バックエンドAPIへのHTTPクライアント。3つの Repository trait を実装する

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::adapter::config::Config;
use crate::domain::entities::report_record::ReportRecord;
use crate::domain::entities::upload_task::DocumentFile;
use crate::domain::errors::{GatewayError, TransportError};
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::repositories::report_repository::ReportRepository;
use crate::domain::repositories::symptom_chat_repository::{
    SymptomAssessment, SymptomChatRepository,
};
use crate::domain::services::document_policy::DocumentPolicy;

use super::errors::{
    request_error, status_error, CHAT_FAILED, HISTORY_FAILED, PDF_EXPORT_FAILED,
    SUMMARIZATION_FAILED, TTS_FAILED, UPLOAD_FAILED,
};
use super::models::{
    HistoryResponse, SummarizeRequest, SummarizeResponse, SymptomChatRequest,
    SymptomChatResponse, TtsRequest, UploadResponse,
};

/// HTTP transport for the SymptoScan backend
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout
    ///
    /// # Arguments
    ///
    /// * `base_url` - APIのベースURL（http/https）
    /// * `timeout` - 1リクエストあたりのタイムアウト
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot be used as a base: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.base_url()?;
        Self::new(base_url, config.request_timeout())
    }

    /// ベースURLにパスセグメントを追加する（各セグメントはエンコードされる）
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// 送信し、非成功ステータスを `TransportError` に変換する
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response, TransportError> {
        let response = request.send().await.map_err(|e| {
            warn!("{}: {}", fallback, e);
            request_error(&e)
        })?;

        let status = response.status();
        debug!("{} {}", response.url().path(), status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = status_error(status, &body, fallback);
        warn!("{} ({}): {}", fallback, status, error.detail);
        Err(error)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, TransportError> {
        let response = self.send(request, fallback).await?;
        let body = response.text().await.map_err(|e| request_error(&e))?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("{}: malformed response body: {}", fallback, e);
            TransportError::parse_error(format!("Malformed response: {}", e))
        })
    }

    async fn send_bytes(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let response = self.send(request, fallback).await?;
        let bytes = response.bytes().await.map_err(|e| request_error(&e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DocumentRepository for HttpTransport {
    async fn submit_document(
        &self,
        user_id: &str,
        document: &DocumentFile,
    ) -> Result<String, GatewayError> {
        DocumentPolicy::validate(document)?;

        let part = Part::bytes(document.bytes().to_vec())
            .file_name(document.name().to_string())
            .mime_str(document.mime_type())
            .map_err(|e| TransportError::bad_request(format!("Invalid content type: {}", e)))?;
        let form = Form::new()
            .text("user_id", user_id.to_string())
            .part("file", part);

        debug!("Uploading {} ({} bytes)", document.name(), document.size());
        let request = self
            .client
            .post(self.endpoint(&["upload-report"]))
            .multipart(form);
        let response: UploadResponse = self.send_json(request, UPLOAD_FAILED).await?;

        Ok(response.document_id)
    }

    async fn request_summary(&self, document_id: &str) -> Result<String, TransportError> {
        let request = self
            .client
            .post(self.endpoint(&["summarize-report"]))
            .json(&SummarizeRequest { document_id });
        let response: SummarizeResponse = self.send_json(request, SUMMARIZATION_FAILED).await?;

        Ok(response.summary_text)
    }
}

#[async_trait]
impl SymptomChatRepository for HttpTransport {
    async fn send_chat_message(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<SymptomAssessment, GatewayError> {
        DocumentPolicy::validate_message(text)?;

        let request = self
            .client
            .post(self.endpoint(&["symptom-chat"]))
            .json(&SymptomChatRequest {
                user_id,
                message: text,
            });
        let response: SymptomChatResponse = self.send_json(request, CHAT_FAILED).await?;

        Ok(response.into())
    }
}

#[async_trait]
impl ReportRepository for HttpTransport {
    async fn fetch_history(&self, user_id: &str) -> Result<Vec<ReportRecord>, TransportError> {
        let request = self.client.get(self.endpoint(&["history", user_id]));
        let response: HistoryResponse = self.send_json(request, HISTORY_FAILED).await?;

        Ok(response.summaries.into_iter().map(Into::into).collect())
    }

    async fn export_summary_pdf(&self, summary_id: &str) -> Result<Vec<u8>, TransportError> {
        let request = self.client.get(self.endpoint(&["export-summary", summary_id]));
        self.send_bytes(request, PDF_EXPORT_FAILED).await
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, TransportError> {
        let request = self
            .client
            .post(self.endpoint(&["tts"]))
            .json(&TtsRequest { text });
        self.send_bytes(request, TTS_FAILED).await
    }
}
