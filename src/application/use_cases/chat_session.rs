//! # Chat Session Use Case
//!
//! 症状チャットの会話ログと、1ターンずつの送受信を管理するステートマシン
//!
//! `Ready ↔ AwaitingResponse`。送信したユーザーターンには必ず1つだけアシスタントターンが続く。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use log::{debug, info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::application::dto::user_context::UserContext;
use crate::domain::entities::chat_turn::{Assessment, ChatTurn};
use crate::domain::entities::conversation::ConversationState;
use crate::domain::errors::ValidationError;
use crate::domain::repositories::symptom_chat_repository::{
    SymptomAssessment, SymptomChatRepository,
};
use crate::domain::services::document_policy::DocumentPolicy;

/// 評価を受け取ったときのアシスタントの定型文
pub const ACKNOWLEDGEMENT: &str = "Here's what I found based on your symptoms:";

/// 通信に失敗したときのアシスタントの定型文
pub const CHAT_ERROR_MESSAGE: &str = "Error contacting AI service. Please try again.";

/// 送信エラー（いずれも会話状態は変わらない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("A response is still pending")]
    AwaitingResponse,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<SymptomAssessment> for Assessment {
    fn from(result: SymptomAssessment) -> Self {
        Self {
            conditions: result.conditions,
            urgency: result.urgency.unwrap_or_default(),
            recommendations: result.recommendations,
        }
    }
}

fn lock(state: &Mutex<ConversationState>) -> MutexGuard<'_, ConversationState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 応答待ちのターン
///
/// 応答前に破棄された場合もエラーのアシスタントターンを追記して `Ready` に戻す
struct PendingTurn<'a> {
    state: &'a Mutex<ConversationState>,
    settled: bool,
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut state = lock(self.state);
        warn!("Chat request dropped before a response arrived");
        state.push_assistant(CHAT_ERROR_MESSAGE.to_string(), None, Utc::now());
        state.set_awaiting_response(false);
    }
}

/// チャットセッション
pub struct ChatSession<R: SymptomChatRepository> {
    session_id: Uuid,
    repository: Arc<R>,
    context: UserContext,
    state: Mutex<ConversationState>,
}

impl<R: SymptomChatRepository> ChatSession<R> {
    /// 新しいセッションを作成
    pub fn new(repository: Arc<R>, context: UserContext) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            repository,
            context,
            state: Mutex::new(ConversationState::new()),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// 会話ログのコピー
    pub fn turns(&self) -> Vec<ChatTurn> {
        lock(&self.state).turns().to_vec()
    }

    pub fn is_awaiting_response(&self) -> bool {
        lock(&self.state).awaiting_response()
    }

    /// メッセージを送信する
    ///
    /// ユーザーターンを即座に追記し、応答（または失敗）を受けてアシスタントターンを追記する。
    ///
    /// # Returns
    ///
    /// 追記されたアシスタントターン
    ///
    /// # Errors
    ///
    /// - 応答待ちの間は `SubmitError::AwaitingResponse`
    /// - 空白のみのメッセージは `SubmitError::Validation`
    pub async fn submit(&self, text: &str) -> Result<ChatTurn, SubmitError> {
        let user_turn = {
            let mut state = lock(&self.state);
            if state.awaiting_response() {
                debug!("Session {} rejected a message while awaiting a response", self.session_id);
                return Err(SubmitError::AwaitingResponse);
            }
            DocumentPolicy::validate_message(text)?;

            state.set_awaiting_response(true);
            state.push_user(text.to_string(), Utc::now())
        };

        let mut pending = PendingTurn {
            state: &self.state,
            settled: false,
        };
        info!("Session {} sent turn {}", self.session_id, user_turn.id);

        let result = self
            .repository
            .send_chat_message(self.context.user_id(), text)
            .await;

        let mut state = lock(&self.state);
        pending.settled = true;

        let turn = match result {
            Ok(assessment) => state.push_assistant(
                ACKNOWLEDGEMENT.to_string(),
                Some(assessment.into()),
                Utc::now(),
            ),
            Err(e) => {
                warn!("Session {} chat request failed: {}", self.session_id, e);
                state.push_assistant(CHAT_ERROR_MESSAGE.to_string(), None, Utc::now())
            }
        };
        state.set_awaiting_response(false);

        Ok(turn)
    }
}
