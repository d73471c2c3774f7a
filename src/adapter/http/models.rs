//! Wire Models
//!
//! バックエンドAPIのリクエスト/レスポンス形式

use serde::{Deserialize, Serialize};

use crate::domain::entities::chat_turn::Urgency;
use crate::domain::entities::report_record::ReportRecord;
use crate::domain::repositories::symptom_chat_repository::SymptomAssessment;

/// `POST /upload-report` の応答
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub document_id: String,
}

/// `POST /summarize-report` の要求
#[derive(Debug, Serialize)]
pub struct SummarizeRequest<'a> {
    pub document_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeResponse {
    pub summary_text: String,
}

/// `POST /symptom-chat` の要求
#[derive(Debug, Serialize)]
pub struct SymptomChatRequest<'a> {
    pub user_id: &'a str,
    pub message: &'a str,
}

/// `POST /symptom-chat` の応答
///
/// 欠けているリストは空として扱う
#[derive(Debug, Deserialize)]
pub struct SymptomChatResponse {
    #[serde(default)]
    pub possible_conditions: Vec<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

impl From<SymptomChatResponse> for SymptomAssessment {
    fn from(response: SymptomChatResponse) -> Self {
        Self {
            conditions: response.possible_conditions,
            urgency: response.urgency.as_deref().and_then(Urgency::parse),
            recommendations: response.recommended_actions,
        }
    }
}

/// `POST /tts` の要求
#[derive(Debug, Serialize)]
pub struct TtsRequest<'a> {
    pub text: &'a str,
}

/// 履歴IDは文字列でも数値でも受け付ける
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SummaryId {
    Text(String),
    Number(i64),
}

impl SummaryId {
    fn into_string(self) -> String {
        match self {
            SummaryId::Text(id) => id,
            SummaryId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistorySummary {
    pub id: SummaryId,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub summary_text: String,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

impl From<HistorySummary> for ReportRecord {
    fn from(summary: HistorySummary) -> Self {
        Self {
            id: summary.id.into_string(),
            filename: summary.filename,
            upload_date: summary.upload_date,
            summary_text: summary.summary_text,
            recommendations: summary.recommendations.unwrap_or_default(),
        }
    }
}

/// `GET /history/{user_id}` の応答
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub summaries: Vec<HistorySummary>,
}

/// 非成功応答のボディ
///
/// `detail` は文字列とは限らない（検証エラーでは配列になることがある）
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn into_detail(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(detail) if detail.trim().is_empty() => None,
            serde_json::Value::String(detail) => Some(detail),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
