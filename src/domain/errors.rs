//! # Domain Errors
//!
//! 事前検証エラーと通信エラーの分類
//!
//! - **ValidationError**: ネットワーク呼び出し前にクライアント側で拒否されたもの
//! - **TransportError**: ネットワーク呼び出しの失敗を正規化したもの
//! - **GatewayError**: 検証と通信の両方が起こり得る操作の結果

use std::fmt;

use thiserror::Error;

/// 事前検証エラー
///
/// パイプラインの失敗ではなく、送信前の入力エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported file type: {mime_type}. Please upload a PDF, TXT, or image file.")]
    UnsupportedMimeType { mime_type: String },

    #[error("File too large: {size} bytes (limit {limit} bytes). Please upload a file smaller than 10MB.")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Message must not be empty")]
    EmptyMessage,
}

/// 通信エラーの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// 4xx応答
    BadRequest,
    /// 4xx以外の非成功応答
    ServerError,
    /// 接続不能・タイムアウト
    Network,
    /// 応答ボディの解析失敗
    ParseError,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::BadRequest => "bad request",
            TransportErrorKind::ServerError => "server error",
            TransportErrorKind::Network => "network",
            TransportErrorKind::ParseError => "parse error",
        };
        f.write_str(name)
    }
}

/// 正規化された通信エラー
///
/// `Display` は `detail` のみを出力する（ユーザーに表示するメッセージ）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::BadRequest, detail)
    }

    pub fn server_error(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, detail)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, detail)
    }

    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ParseError, detail)
    }
}

/// 検証エラーまたは通信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
