//! Adapter Layer
//!
//! 外部システム（バックエンドAPI、設定ファイル）との統合

pub mod config;
pub mod http;
