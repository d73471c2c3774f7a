//! HTTP Error Classification
//!
//! ステータスコードと reqwest のエラーを `TransportError` に正規化する

use reqwest::StatusCode;

use crate::domain::errors::{TransportError, TransportErrorKind};

use super::models::ErrorBody;

pub const UPLOAD_FAILED: &str = "Upload failed";
pub const SUMMARIZATION_FAILED: &str = "Summarization failed";
pub const CHAT_FAILED: &str = "Chat failed";
pub const HISTORY_FAILED: &str = "Failed to load history";
pub const PDF_EXPORT_FAILED: &str = "PDF export failed";
pub const TTS_FAILED: &str = "TTS failed";

/// Classify a non-success status code
pub fn classify_status(status: StatusCode) -> TransportErrorKind {
    if status.is_client_error() {
        TransportErrorKind::BadRequest
    } else {
        TransportErrorKind::ServerError
    }
}

/// Extract `detail` from an error body, if the body is JSON and carries one
pub fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_detail)
}

/// Build the error for a non-success response
///
/// `detail` が無い場合は操作ごとの既定メッセージを使う
pub fn status_error(status: StatusCode, body: &str, fallback: &str) -> TransportError {
    let detail = extract_detail(body).unwrap_or_else(|| fallback.to_string());
    TransportError::new(classify_status(status), detail)
}

/// Convert error chain to string including all causes
pub fn error_chain_to_string(e: &(dyn std::error::Error + 'static)) -> String {
    let mut messages = vec![e.to_string()];
    let mut source = e.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages.join(" | ")
}

/// Convert a send/receive failure
///
/// 接続不能とタイムアウトはどちらも `Network` として扱う
pub fn request_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        return TransportError::network("Request timed out");
    }
    if e.is_decode() {
        return TransportError::parse_error(error_chain_to_string(e));
    }
    TransportError::network(error_chain_to_string(e))
}
