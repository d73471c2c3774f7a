//! # ConversationState Entity
//!
//! 追記専用の会話ログと、同時送信を防ぐ待機フラグ

use chrono::{DateTime, Utc};

use super::chat_turn::{Assessment, ChatTurn, Role};

/// 会話状態
///
/// ターンは追記のみ。`created_at` は単調非減少に補正される。
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    turns: Vec<ChatTurn>,
    awaiting_response: bool,
    next_id: u64,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn set_awaiting_response(&mut self, awaiting: bool) {
        self.awaiting_response = awaiting;
    }

    /// ユーザーのターンを追記
    pub fn push_user(&mut self, text: String, now: DateTime<Utc>) -> ChatTurn {
        self.push(Role::User, text, None, now)
    }

    /// アシスタントのターンを追記
    pub fn push_assistant(
        &mut self,
        text: String,
        assessment: Option<Assessment>,
        now: DateTime<Utc>,
    ) -> ChatTurn {
        self.push(Role::Assistant, text, assessment, now)
    }

    fn push(
        &mut self,
        role: Role,
        text: String,
        assessment: Option<Assessment>,
        now: DateTime<Utc>,
    ) -> ChatTurn {
        // 時計が巻き戻っても順序を崩さない
        let created_at = match self.turns.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };

        self.next_id += 1;
        let turn = ChatTurn {
            id: self.next_id,
            role,
            text,
            created_at,
            assessment,
        };
        self.turns.push(turn.clone());
        turn
    }
}
