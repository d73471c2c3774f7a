//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **UploadPipeline**: アップロード→要約のステートマシン
//! - **ChatSession**: 症状チャットの会話ステートマシン
//! - **LoadCurrentReportUseCase**: 現在のレポートの取得
//! - **ExportReportUseCase**: PDF出力と読み上げ音声

pub mod chat_session;
pub mod export_report;
pub mod load_current_report;
pub mod upload_pipeline;
