//! # Export Report Use Case
//!
//! 要約のPDF出力と読み上げ音声の取得（どちらもリモート操作、結果はバイト列）

use std::sync::Arc;

use log::info;

use crate::domain::errors::TransportError;
use crate::domain::repositories::report_repository::ReportRepository;

/// レポート出力ユースケース
pub struct ExportReportUseCase<R: ReportRepository> {
    repository: Arc<R>,
}

impl<R: ReportRepository> ExportReportUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// 要約をPDFとして取得
    pub async fn export_pdf(&self, summary_id: &str) -> Result<Vec<u8>, TransportError> {
        let pdf = self.repository.export_summary_pdf(summary_id).await?;
        info!("Exported summary {} ({} bytes)", summary_id, pdf.len());
        Ok(pdf)
    }

    /// テキストの読み上げ音声を取得
    pub async fn narrate(&self, text: &str) -> Result<Vec<u8>, TransportError> {
        let audio = self.repository.synthesize_speech(text).await?;
        info!("Synthesized {} bytes of audio", audio.len());
        Ok(audio)
    }
}
