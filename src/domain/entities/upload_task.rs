//! # UploadTask Entity
//!
//! ドキュメント1件のアップロード→要約ライフサイクル

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// アップロード対象のドキュメント
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl DocumentFile {
    /// 新しいドキュメントを作成
    ///
    /// # Arguments
    ///
    /// * `name` - ファイル名
    /// * `mime_type` - MIMEタイプ
    /// * `bytes` - ファイル内容
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// バイト数
    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// タスクのフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Selected,
    Uploading,
    Summarizing,
    Completed,
    Failed,
}

impl UploadPhase {
    /// ネットワーク処理中かどうか
    pub fn is_in_flight(self) -> bool {
        matches!(self, UploadPhase::Uploading | UploadPhase::Summarizing)
    }

    /// 終端フェーズかどうか
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadPhase::Completed | UploadPhase::Failed)
    }
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadPhase::Idle => "idle",
            UploadPhase::Selected => "selected",
            UploadPhase::Uploading => "uploading",
            UploadPhase::Summarizing => "summarizing",
            UploadPhase::Completed => "completed",
            UploadPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 不正な状態遷移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {from}")]
pub struct TransitionError {
    pub from: UploadPhase,
    pub action: &'static str,
}

impl TransitionError {
    pub fn new(from: UploadPhase, action: &'static str) -> Self {
        Self { from, action }
    }
}

/// アップロードタスク
///
/// フェーズが `Completed` / `Failed` のとき、`summary_text` と `error_message` の
/// どちらか一方だけが存在する。それ以外のフェーズでは両方とも存在しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadTask {
    file: Option<DocumentFile>,
    phase: UploadPhase,
    progress: u8,
    document_id: Option<String>,
    summary_text: Option<String>,
    error_message: Option<String>,
}

impl UploadTask {
    /// `Idle` のタスクを作成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&DocumentFile> {
        self.file.as_ref()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// 進捗（%）。処理中以外では意味を持たない
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.summary_text.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// 進捗を上書きしたコピーを返す
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    /// ファイルを選択する
    ///
    /// `Idle` / `Failed` / `Completed` からのみ可能。前回の結果はすべて破棄される。
    ///
    /// # Errors
    ///
    /// 他のフェーズから呼ばれた場合に `TransitionError` を返す
    pub fn select(&mut self, file: DocumentFile) -> Result<(), TransitionError> {
        match self.phase {
            UploadPhase::Idle | UploadPhase::Failed | UploadPhase::Completed => {
                *self = Self {
                    file: Some(file),
                    phase: UploadPhase::Selected,
                    ..Self::default()
                };
                Ok(())
            }
            from => Err(TransitionError::new(from, "select a file")),
        }
    }

    /// `Selected` → `Uploading`
    pub fn begin_upload(&mut self) -> Result<(), TransitionError> {
        if self.phase != UploadPhase::Selected || self.file.is_none() {
            return Err(TransitionError::new(self.phase, "start processing"));
        }
        self.phase = UploadPhase::Uploading;
        self.progress = 0;
        Ok(())
    }

    /// `Uploading` → `Summarizing`（ドキュメントIDを保持）
    pub fn mark_uploaded(&mut self, document_id: String) -> Result<(), TransitionError> {
        if self.phase != UploadPhase::Uploading {
            return Err(TransitionError::new(self.phase, "record an upload"));
        }
        self.document_id = Some(document_id);
        self.phase = UploadPhase::Summarizing;
        Ok(())
    }

    /// `Summarizing` → `Completed`
    pub fn complete(&mut self, summary_text: String) -> Result<(), TransitionError> {
        if self.phase != UploadPhase::Summarizing {
            return Err(TransitionError::new(self.phase, "complete"));
        }
        self.summary_text = Some(summary_text);
        self.error_message = None;
        self.progress = 100;
        self.phase = UploadPhase::Completed;
        Ok(())
    }

    /// `Selected` / `Uploading` / `Summarizing` → `Failed`
    ///
    /// ドキュメントIDは保持する（要約段階での失敗でもアップロード済みのため）
    pub fn fail(&mut self, message: String) -> Result<(), TransitionError> {
        match self.phase {
            UploadPhase::Selected | UploadPhase::Uploading | UploadPhase::Summarizing => {
                self.summary_text = None;
                self.error_message = Some(message);
                self.phase = UploadPhase::Failed;
                Ok(())
            }
            from => Err(TransitionError::new(from, "fail")),
        }
    }

    /// `Completed` / `Failed` → `Idle`
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        if !self.phase.is_terminal() {
            return Err(TransitionError::new(self.phase, "reset"));
        }
        *self = Self::default();
        Ok(())
    }

    /// `Selected` / `Uploading` / `Summarizing` → `Idle`
    pub fn discard(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            UploadPhase::Selected | UploadPhase::Uploading | UploadPhase::Summarizing => {
                *self = Self::default();
                Ok(())
            }
            from => Err(TransitionError::new(from, "discard")),
        }
    }
}
