//! # Symptom Chat Repository Trait
//!
//! 症状チャットの問い合わせを抽象化

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::chat_turn::Urgency;
use crate::domain::errors::GatewayError;

/// リモートから返された症状評価
///
/// `urgency` はリモートが省略した場合 `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomAssessment {
    pub conditions: Vec<String>,
    pub urgency: Option<Urgency>,
    pub recommendations: Vec<String>,
}

/// 症状チャットリポジトリ
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SymptomChatRepository: Send + Sync {
    /// メッセージを送信して評価を受け取る
    ///
    /// # Errors
    ///
    /// 空白のみのメッセージはネットワーク呼び出しなしで
    /// `GatewayError::Validation(ValidationError::EmptyMessage)` を返す
    async fn send_chat_message(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<SymptomAssessment, GatewayError>;
}
