//! # Document Policy Service
//!
//! 送信前の入力検証（MIMEタイプ、サイズ、メッセージ）

use std::path::Path;

use crate::domain::entities::upload_task::DocumentFile;
use crate::domain::errors::ValidationError;

/// 受け付けるMIMEタイプ
pub const ALLOWED_MIME_TYPES: [&str; 4] =
    ["application/pdf", "text/plain", "image/jpeg", "image/png"];

/// 最大サイズ（10 MiB）
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// 拡張子が不明な場合のMIMEタイプ
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// ドキュメント検証ポリシー
///
/// Upload Pipeline と HTTP クライアントの両方がこの検証を共有する
pub struct DocumentPolicy;

impl DocumentPolicy {
    /// ドキュメントを検証する
    ///
    /// # Errors
    ///
    /// MIMEタイプが許可リストにない場合、またはサイズが上限を超える場合
    pub fn validate(document: &DocumentFile) -> Result<(), ValidationError> {
        if !ALLOWED_MIME_TYPES.contains(&document.mime_type()) {
            return Err(ValidationError::UnsupportedMimeType {
                mime_type: document.mime_type().to_string(),
            });
        }

        if document.size() > MAX_DOCUMENT_SIZE {
            return Err(ValidationError::FileTooLarge {
                size: document.size(),
                limit: MAX_DOCUMENT_SIZE,
            });
        }

        Ok(())
    }

    /// チャットメッセージを検証する（空白のみは不可）
    pub fn validate_message(text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(())
    }

    /// 拡張子からMIMEタイプを推定する
    pub fn mime_type_for(path: &Path) -> &'static str {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            _ => FALLBACK_MIME_TYPE,
        }
    }
}
