//! # Load Current Report Use Case
//!
//! 履歴の最後の要約を「現在のレポート」として取得する

use std::sync::Arc;

use log::info;

use crate::application::dto::user_context::UserContext;
use crate::domain::entities::report_record::ReportRecord;
use crate::domain::errors::TransportError;
use crate::domain::repositories::report_repository::ReportRepository;

/// 現在のレポート取得ユースケース
pub struct LoadCurrentReportUseCase<R: ReportRepository> {
    repository: Arc<R>,
    context: UserContext,
}

impl<R: ReportRepository> LoadCurrentReportUseCase<R> {
    pub fn new(repository: Arc<R>, context: UserContext) -> Self {
        Self {
            repository,
            context,
        }
    }

    /// 現在のレポートを取得
    ///
    /// # Returns
    ///
    /// 履歴の最後の要素。履歴が空なら `None`
    pub async fn execute(&self) -> Result<Option<ReportRecord>, TransportError> {
        let mut history = self.repository.fetch_history(self.context.user_id()).await?;
        info!(
            "Loaded {} history records for {}",
            history.len(),
            self.context.user_id()
        );
        Ok(history.pop())
    }
}
