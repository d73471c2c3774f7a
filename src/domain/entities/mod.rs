//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **UploadTask**: ドキュメント1件のアップロード→要約ライフサイクル
//! - **ChatTurn**: 会話ログの1ターン
//! - **ConversationState**: 追記専用の会話ログ
//! - **ReportRecord**: 履歴の要約レポート

pub mod chat_turn;
pub mod conversation;
pub mod report_record;
pub mod upload_task;
