//! # Report Repository Trait
//!
//! 保存済みレポートの取得と、音声化・PDF出力（リモート操作）を抽象化

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::report_record::ReportRecord;
use crate::domain::errors::TransportError;

/// レポートリポジトリ
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// ユーザーの履歴を古い順で取得する
    async fn fetch_history(&self, user_id: &str) -> Result<Vec<ReportRecord>, TransportError>;

    /// 要約のPDFを取得する（バイト列のまま返す）
    async fn export_summary_pdf(&self, summary_id: &str) -> Result<Vec<u8>, TransportError>;

    /// テキストの音声を取得する（バイト列のまま返す）
    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, TransportError>;
}
