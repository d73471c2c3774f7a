//! # ReportRecord Entity
//!
//! 履歴に保存された要約レポート

use serde::{Deserialize, Serialize};

const DEFAULT_FILENAME: &str = "report.pdf";
const NO_CLINICAL_NOTES: &str = "No clinical notes available.";

/// 要約レポート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub filename: Option<String>,
    pub upload_date: Option<String>,
    pub summary_text: String,
    pub recommendations: Vec<String>,
}

impl ReportRecord {
    /// 表示用ファイル名（未設定なら `report.pdf`）
    pub fn display_filename(&self) -> &str {
        self.filename
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILENAME)
    }

    /// 推奨事項をまとめた臨床メモ
    pub fn clinical_notes(&self) -> String {
        if self.recommendations.is_empty() {
            NO_CLINICAL_NOTES.to_string()
        } else {
            self.recommendations.join(", ")
        }
    }
}
