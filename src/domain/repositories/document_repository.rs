//! # Document Repository Trait
//!
//! ドキュメントのアップロードと要約依頼を抽象化

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::upload_task::DocumentFile;
use crate::domain::errors::{GatewayError, TransportError};

/// ドキュメントリポジトリ
///
/// 1操作につきネットワーク呼び出しは1回。リトライは行わない。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// ドキュメントを送信する
    ///
    /// # Arguments
    ///
    /// * `user_id` - 送信者のユーザーID
    /// * `document` - 送信するドキュメント
    ///
    /// # Returns
    ///
    /// リモートで採番されたドキュメントID
    ///
    /// # Errors
    ///
    /// 許可されていないMIMEタイプまたはサイズ超過の場合は、ネットワーク呼び出しの前に
    /// `GatewayError::Validation` を返す
    async fn submit_document(
        &self,
        user_id: &str,
        document: &DocumentFile,
    ) -> Result<String, GatewayError>;

    /// 要約を依頼する
    ///
    /// # Arguments
    ///
    /// * `document_id` - アップロード済みドキュメントのID
    ///
    /// # Returns
    ///
    /// 要約テキスト
    async fn request_summary(&self, document_id: &str) -> Result<String, TransportError>;
}
