//! # Upload Pipeline Use Case
//!
//! アップロード→要約の2段階処理と進捗シグナルを管理するステートマシン

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::{debug, info, warn};
use thiserror::Error;

use crate::application::dto::user_context::UserContext;
use crate::domain::entities::upload_task::{DocumentFile, TransitionError, UploadPhase, UploadTask};
use crate::domain::errors::ValidationError;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::document_policy::DocumentPolicy;
use crate::domain::services::progress::{ProgressConfig, ProgressSignal};

/// 処理が完了前に中断されたときのエラーメッセージ
pub const INTERRUPTED_MESSAGE: &str = "Processing was interrupted";

/// ファイル選択のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

#[derive(Debug, Default)]
struct PipelineState {
    task: UploadTask,
    progress: Option<ProgressSignal>,
    /// 処理の世代。リセット・破棄・新規開始のたびに進み、古い応答を無効化する
    generation: u64,
}

impl PipelineState {
    fn snapshot(&self, now: Instant) -> UploadTask {
        let progress = self.progress.map(|p| p.value_at(now)).unwrap_or(0);
        self.task.clone().with_progress(progress)
    }

    fn settle_failure(&mut self, message: String, now: Instant) {
        if let Some(progress) = self.progress.as_mut() {
            progress.freeze(now);
        }
        if let Err(e) = self.task.fail(message) {
            warn!("Could not record failure: {}", e);
        }
    }
}

fn lock(state: &Mutex<PipelineState>) -> MutexGuard<'_, PipelineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// 実行中の処理
///
/// 決着前に破棄された場合（Futureのドロップ）はタスクを `Failed` にする
struct InFlightRun<'a> {
    state: &'a Mutex<PipelineState>,
    generation: u64,
    settled: bool,
}

impl<'a> InFlightRun<'a> {
    fn new(state: &'a Mutex<PipelineState>, generation: u64) -> Self {
        Self {
            state,
            generation,
            settled: false,
        }
    }

    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for InFlightRun<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut state = lock(self.state);
        if state.generation == self.generation && state.task.phase().is_in_flight() {
            warn!("Upload run {} dropped before settling", self.generation);
            state.settle_failure(INTERRUPTED_MESSAGE.to_string(), now());
        }
    }
}

/// アップロードパイプライン
///
/// `Idle → Selected → Uploading → Summarizing → Completed`、失敗時は `Failed`。
/// 1タスクにつき同時に走る処理は1つだけ（フェーズによるガード）。
pub struct UploadPipeline<R: DocumentRepository> {
    repository: Arc<R>,
    context: UserContext,
    progress_config: ProgressConfig,
    state: Mutex<PipelineState>,
}

impl<R: DocumentRepository> UploadPipeline<R> {
    /// 新しいパイプラインを作成
    ///
    /// # Arguments
    ///
    /// * `repository` - ドキュメントリポジトリ
    /// * `context` - ユーザーコンテキスト
    /// * `progress_config` - 進捗の刻み設定
    pub fn new(repository: Arc<R>, context: UserContext, progress_config: ProgressConfig) -> Self {
        Self {
            repository,
            context,
            progress_config,
            state: Mutex::new(PipelineState::default()),
        }
    }

    /// 現在のタスクのスナップショット（進捗は呼び出し時点で計算）
    pub fn snapshot(&self) -> UploadTask {
        lock(&self.state).snapshot(now())
    }

    /// ファイルを選択する
    ///
    /// # Errors
    ///
    /// - 検証に失敗した場合は `SelectError::Validation`（フェーズは変わらない）
    /// - `Idle` / `Failed` / `Completed` 以外から呼ばれた場合は `SelectError::Transition`
    pub fn select_file(&self, file: DocumentFile) -> Result<(), SelectError> {
        DocumentPolicy::validate(&file)?;

        let mut state = lock(&self.state);
        state.task.select(file)?;
        state.progress = None;

        info!("Selected document");
        Ok(())
    }

    /// アップロードと要約を順に実行する
    ///
    /// アップロードが失敗した場合、要約は依頼しない。処理中に `discard` された場合、
    /// 遅れて届いた応答は破棄され、タスクは変更されない。
    ///
    /// # Returns
    ///
    /// 処理後のタスクのスナップショット
    ///
    /// # Errors
    ///
    /// `Selected` 以外から呼ばれた場合（処理中の二重実行を含む）。タスクは変更されない。
    pub async fn start_processing(&self) -> Result<UploadTask, TransitionError> {
        let (generation, document) = {
            let mut state = lock(&self.state);

            let document = match (state.task.phase(), state.task.file()) {
                (UploadPhase::Selected, Some(file)) => file.clone(),
                (phase, _) => return Err(TransitionError::new(phase, "start processing")),
            };

            // 選択後にポリシーを満たさなくなったファイルは送信しない
            if let Err(e) = DocumentPolicy::validate(&document) {
                warn!("Selected document failed pre-flight validation: {}", e);
                state.task.fail(e.to_string())?;
                return Ok(state.snapshot(now()));
            }

            state.task.begin_upload()?;
            state.generation += 1;
            state.progress = Some(ProgressSignal::start(self.progress_config, now()));
            (state.generation, document)
        };

        let mut run = InFlightRun::new(&self.state, generation);
        info!("Uploading {} ({} bytes)", document.name(), document.size());

        let uploaded = self
            .repository
            .submit_document(self.context.user_id(), &document)
            .await;

        let document_id = {
            let mut state = lock(&self.state);
            if state.generation != generation {
                debug!("Discarding stale upload response for run {}", generation);
                run.settle();
                return Ok(state.snapshot(now()));
            }

            match uploaded {
                Ok(document_id) => {
                    info!("Upload accepted as document {}", document_id);
                    state.task.mark_uploaded(document_id.clone())?;
                    document_id
                }
                Err(e) => {
                    warn!("Upload failed: {}", e);
                    state.settle_failure(e.to_string(), now());
                    run.settle();
                    return Ok(state.snapshot(now()));
                }
            }
        };

        let summary = self.repository.request_summary(&document_id).await;

        let mut state = lock(&self.state);
        run.settle();
        if state.generation != generation {
            debug!("Discarding stale summary response for run {}", generation);
            return Ok(state.snapshot(now()));
        }

        match summary {
            Ok(summary_text) => {
                state.task.complete(summary_text)?;
                if let Some(progress) = state.progress.as_mut() {
                    progress.complete();
                }
                info!("Document {} summarized", document_id);
            }
            Err(e) => {
                warn!("Summarization of {} failed: {}", document_id, e);
                state.settle_failure(e.to_string(), now());
            }
        }

        Ok(state.snapshot(now()))
    }

    /// `Completed` / `Failed` から `Idle` に戻す
    pub fn reset(&self) -> Result<(), TransitionError> {
        let mut state = lock(&self.state);
        state.task.reset()?;
        state.progress = None;
        state.generation += 1;
        info!("Upload task reset");
        Ok(())
    }

    /// 選択中・処理中のタスクを破棄して `Idle` に戻す
    ///
    /// 処理中の場合、その応答は届いても無視される
    pub fn discard(&self) -> Result<(), TransitionError> {
        let mut state = lock(&self.state);
        state.task.discard()?;
        state.progress = None;
        state.generation += 1;
        info!("Upload task discarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    use crate::domain::errors::{GatewayError, TransportError, TransportErrorKind};
    use crate::domain::repositories::document_repository::MockDocumentRepository;

    fn create_test_file(name: &str, mime_type: &str, size: usize) -> DocumentFile {
        DocumentFile::new(name, mime_type, vec![0u8; size])
    }

    fn report_pdf() -> DocumentFile {
        create_test_file("report.pdf", "application/pdf", 2 * 1024 * 1024)
    }

    fn create_pipeline<R: DocumentRepository>(repo: R) -> UploadPipeline<R> {
        UploadPipeline::new(
            Arc::new(repo),
            UserContext::new("test123"),
            ProgressConfig::default(),
        )
    }

    /// 応答をテスト側から解放できるリポジトリ
    struct GatedRepository {
        upload: std::sync::Mutex<Option<oneshot::Receiver<Result<String, GatewayError>>>>,
        summary: std::sync::Mutex<Option<oneshot::Receiver<Result<String, TransportError>>>>,
        summary_calls: AtomicUsize,
    }

    impl GatedRepository {
        fn new(
            upload: oneshot::Receiver<Result<String, GatewayError>>,
            summary: oneshot::Receiver<Result<String, TransportError>>,
        ) -> Self {
            Self {
                upload: std::sync::Mutex::new(Some(upload)),
                summary: std::sync::Mutex::new(Some(summary)),
                summary_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentRepository for GatedRepository {
        async fn submit_document(
            &self,
            _user_id: &str,
            _document: &DocumentFile,
        ) -> Result<String, GatewayError> {
            let gate = self.upload.lock().unwrap().take().expect("upload requested twice");
            gate.await
                .unwrap_or_else(|_| Err(TransportError::network("gate closed").into()))
        }

        async fn request_summary(&self, _document_id: &str) -> Result<String, TransportError> {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.summary.lock().unwrap().take().expect("summary requested twice");
            gate.await
                .unwrap_or_else(|_| Err(TransportError::network("gate closed")))
        }
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_upload_and_summarize_success() {
        let mut repo = MockDocumentRepository::new();
        repo.expect_submit_document()
            .times(1)
            .withf(|user_id, document| user_id == "test123" && document.name() == "report.pdf")
            .returning(|_, _| Ok("doc1".to_string()));
        repo.expect_request_summary()
            .times(1)
            .withf(|document_id| document_id == "doc1")
            .returning(|_| Ok("ok".to_string()));

        let pipeline = create_pipeline(repo);
        pipeline.select_file(report_pdf()).unwrap();
        assert_eq!(pipeline.snapshot().phase(), UploadPhase::Selected);

        let task = pipeline.start_processing().await.unwrap();

        assert_eq!(task.phase(), UploadPhase::Completed);
        assert_eq!(task.summary_text(), Some("ok"));
        assert_eq!(task.document_id(), Some("doc1"));
        assert!(task.error_message().is_none());
        assert_eq!(task.progress(), 100);
    }

    #[test]
    fn test_select_rejects_unsupported_type() {
        let pipeline = create_pipeline(MockDocumentRepository::new());

        let result = pipeline.select_file(create_test_file("a.zip", "application/zip", 10));

        assert!(matches!(
            result,
            Err(SelectError::Validation(ValidationError::UnsupportedMimeType { .. }))
        ));
        assert_eq!(pipeline.snapshot().phase(), UploadPhase::Idle);
    }

    #[test]
    fn test_select_rejects_oversized_file_without_failing() {
        let pipeline = create_pipeline(MockDocumentRepository::new());
        let result = pipeline.select_file(create_test_file(
            "big.pdf",
            "application/pdf",
            10 * 1024 * 1024 + 1,
        ));

        assert!(matches!(
            result,
            Err(SelectError::Validation(ValidationError::FileTooLarge { .. }))
        ));
        let task = pipeline.snapshot();
        assert_eq!(task.phase(), UploadPhase::Idle);
        assert!(task.error_message().is_none());
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_document_id() {
        let mut repo = MockDocumentRepository::new();
        repo.expect_submit_document()
            .times(1)
            .returning(|_, _| Ok("doc1".to_string()));
        repo.expect_request_summary()
            .times(1)
            .returning(|_| Err(TransportError::server_error("Summarization failed")));

        let pipeline = create_pipeline(repo);
        pipeline.select_file(report_pdf()).unwrap();
        let task = pipeline.start_processing().await.unwrap();

        assert_eq!(task.phase(), UploadPhase::Failed);
        assert_eq!(task.document_id(), Some("doc1"));
        assert!(task.summary_text().is_none());
        assert_eq!(task.error_message(), Some("Summarization failed"));
        assert!(task.progress() < 100);
    }

    #[tokio::test]
    async fn test_upload_failure_never_requests_summary() {
        let mut repo = MockDocumentRepository::new();
        repo.expect_submit_document()
            .times(1)
            .returning(|_, _| Err(TransportError::bad_request("Invalid file").into()));
        repo.expect_request_summary().never();

        let pipeline = create_pipeline(repo);
        pipeline.select_file(report_pdf()).unwrap();
        let task = pipeline.start_processing().await.unwrap();

        assert_eq!(task.phase(), UploadPhase::Failed);
        assert_eq!(task.error_message(), Some("Invalid file"));
        assert!(task.document_id().is_none());
    }

    #[tokio::test]
    async fn test_start_processing_requires_selection() {
        let pipeline = create_pipeline(MockDocumentRepository::new());

        let err = pipeline.start_processing().await.unwrap_err();

        assert_eq!(err.from, UploadPhase::Idle);
        assert_eq!(pipeline.snapshot(), UploadTask::new());
    }

    #[tokio::test]
    async fn test_reset_after_completion_and_failure() {
        let mut repo = MockDocumentRepository::new();
        let mut calls = 0;
        repo.expect_submit_document().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok("doc1".to_string())
            } else {
                Err(TransportError::network("unreachable").into())
            }
        });
        repo.expect_request_summary()
            .times(1)
            .returning(|_| Ok("ok".to_string()));

        let pipeline = create_pipeline(repo);

        pipeline.select_file(report_pdf()).unwrap();
        pipeline.start_processing().await.unwrap();
        pipeline.reset().unwrap();
        let task = pipeline.snapshot();
        assert_eq!(task.phase(), UploadPhase::Idle);
        assert!(task.file().is_none());
        assert!(task.summary_text().is_none());

        pipeline.select_file(report_pdf()).unwrap();
        let failed = pipeline.start_processing().await.unwrap();
        assert_eq!(failed.phase(), UploadPhase::Failed);
        pipeline.reset().unwrap();
        let task = pipeline.snapshot();
        assert_eq!(task.phase(), UploadPhase::Idle);
        assert!(task.file().is_none());
        assert!(task.error_message().is_none());
    }

    #[test]
    fn test_reset_rejected_when_not_terminal() {
        let pipeline = create_pipeline(MockDocumentRepository::new());
        pipeline.select_file(report_pdf()).unwrap();

        assert!(pipeline.reset().is_err());
        assert_eq!(pipeline.snapshot().phase(), UploadPhase::Selected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_monotonic_and_capped() {
        let (upload_tx, upload_rx) = oneshot::channel();
        let (summary_tx, summary_rx) = oneshot::channel();
        let pipeline = create_pipeline(GatedRepository::new(upload_rx, summary_rx));
        pipeline.select_file(report_pdf()).unwrap();

        let observer = async {
            settle().await;
            let mut seen = Vec::new();
            for _ in 0..8 {
                tokio::time::advance(Duration::from_millis(300)).await;
                let task = pipeline.snapshot();
                assert_eq!(task.phase(), UploadPhase::Uploading);
                seen.push(task.progress());
            }

            upload_tx.send(Ok("doc1".to_string())).unwrap();
            settle().await;
            assert_eq!(pipeline.snapshot().phase(), UploadPhase::Summarizing);

            for _ in 0..8 {
                tokio::time::advance(Duration::from_millis(300)).await;
                seen.push(pipeline.snapshot().progress());
            }

            summary_tx.send(Ok("ok".to_string())).unwrap();
            seen
        };

        let (result, seen) = tokio::join!(pipeline.start_processing(), observer);
        let task = result.unwrap();

        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
        assert!(seen.iter().all(|p| *p <= 99), "{:?}", seen);
        assert_eq!(seen[0], 10);
        assert_eq!(*seen.last().unwrap(), 99);
        assert_eq!(task.phase(), UploadPhase::Completed);
        assert_eq!(task.progress(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_freezes_on_failure() {
        let (upload_tx, upload_rx) = oneshot::channel();
        let (_summary_tx, summary_rx) = oneshot::channel();
        let pipeline = create_pipeline(GatedRepository::new(upload_rx, summary_rx));
        pipeline.select_file(report_pdf()).unwrap();

        let observer = async {
            settle().await;
            tokio::time::advance(Duration::from_millis(900)).await;
            upload_tx
                .send(Err(TransportError::server_error("Upload failed").into()))
                .unwrap();
        };

        let (result, _) = tokio::join!(pipeline.start_processing(), observer);
        let task = result.unwrap();
        assert_eq!(task.phase(), UploadPhase::Failed);
        assert_eq!(task.progress(), 30);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(pipeline.snapshot().progress(), 30);
    }

    #[tokio::test]
    async fn test_second_start_while_in_flight_has_no_effect() {
        let (upload_tx, upload_rx) = oneshot::channel();
        let (summary_tx, summary_rx) = oneshot::channel();
        let pipeline = create_pipeline(GatedRepository::new(upload_rx, summary_rx));
        pipeline.select_file(report_pdf()).unwrap();

        let observer = async {
            settle().await;
            let before = pipeline.snapshot();
            assert_eq!(before.phase(), UploadPhase::Uploading);

            let err = pipeline.start_processing().await.unwrap_err();
            assert_eq!(err.from, UploadPhase::Uploading);
            assert_eq!(pipeline.snapshot(), before);

            upload_tx.send(Ok("doc1".to_string())).unwrap();
            settle().await;

            let err = pipeline.start_processing().await.unwrap_err();
            assert_eq!(err.from, UploadPhase::Summarizing);

            summary_tx.send(Ok("ok".to_string())).unwrap();
        };

        let (result, _) = tokio::join!(pipeline.start_processing(), observer);
        assert_eq!(result.unwrap().phase(), UploadPhase::Completed);
    }

    #[tokio::test]
    async fn test_discard_ignores_stale_response() {
        let (upload_tx, upload_rx) = oneshot::channel();
        let (_summary_tx, summary_rx) = oneshot::channel();
        let repo = Arc::new(GatedRepository::new(upload_rx, summary_rx));
        let pipeline = UploadPipeline::new(
            repo.clone(),
            UserContext::new("test123"),
            ProgressConfig::default(),
        );
        pipeline.select_file(report_pdf()).unwrap();

        let observer = async {
            settle().await;
            pipeline.discard().unwrap();
            upload_tx.send(Ok("doc1".to_string())).unwrap();
        };

        let (result, _) = tokio::join!(pipeline.start_processing(), observer);
        let task = result.unwrap();

        assert_eq!(task.phase(), UploadPhase::Idle);
        assert!(task.document_id().is_none());
        assert_eq!(pipeline.snapshot().phase(), UploadPhase::Idle);
        assert_eq!(repo.summary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_run_marks_task_failed() {
        let (_upload_tx, upload_rx) = oneshot::channel();
        let (_summary_tx, summary_rx) = oneshot::channel();
        let pipeline = create_pipeline(GatedRepository::new(upload_rx, summary_rx));
        pipeline.select_file(report_pdf()).unwrap();

        let result =
            tokio::time::timeout(Duration::from_millis(650), pipeline.start_processing()).await;
        assert!(result.is_err());

        let task = pipeline.snapshot();
        assert_eq!(task.phase(), UploadPhase::Failed);
        assert_eq!(task.error_message(), Some(INTERRUPTED_MESSAGE));
        assert_eq!(task.progress(), 20);
    }

    #[tokio::test]
    async fn test_transport_validation_error_fails_task() {
        let mut repo = MockDocumentRepository::new();
        repo.expect_submit_document()
            .times(1)
            .returning(|_, _| Err(ValidationError::EmptyMessage.into()));
        repo.expect_request_summary().never();

        let pipeline = create_pipeline(repo);
        pipeline.select_file(report_pdf()).unwrap();
        let task = pipeline.start_processing().await.unwrap();

        assert_eq!(task.phase(), UploadPhase::Failed);
        assert!(task.error_message().is_some());
    }

    #[test]
    fn test_select_error_kinds() {
        let error: SelectError = TransitionError::new(UploadPhase::Uploading, "select a file").into();
        assert_eq!(error.to_string(), "cannot select a file while uploading");

        let transport = TransportError::new(TransportErrorKind::Network, "x");
        assert_eq!(transport.kind, TransportErrorKind::Network);
    }
}
