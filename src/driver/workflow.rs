//! Workflow Orchestration
//!
//! 依存性注入とコマンドの実行

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{FixedOffset, Local};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::adapter::config::Config;
use crate::adapter::http::HttpTransport;
use crate::application::dto::user_context::UserContext;
use crate::application::use_cases::chat_session::{ChatSession, SubmitError};
use crate::application::use_cases::export_report::ExportReportUseCase;
use crate::application::use_cases::load_current_report::LoadCurrentReportUseCase;
use crate::application::use_cases::upload_pipeline::UploadPipeline;
use crate::domain::entities::chat_turn::ChatTurn;
use crate::domain::entities::report_record::ReportRecord;
use crate::domain::entities::upload_task::{DocumentFile, UploadPhase, UploadTask};
use crate::domain::services::document_policy::DocumentPolicy;

use super::cli::{Args, Command};
use super::presenter;

/// 対話モードを終了するコマンド
pub const QUIT_COMMAND: &str = "/quit";

/// ファイルを読み込んで `DocumentFile` を作る（MIMEタイプは拡張子から推定）
pub async fn read_document(path: &Path) -> Result<DocumentFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(DocumentFile::new(name, DocumentPolicy::mime_type_for(path), bytes))
}

fn local_offset() -> FixedOffset {
    *Local::now().offset()
}

/// SymptoScan Workflow
pub struct SymptoScanWorkflow {
    config: Config,
    pipeline: UploadPipeline<HttpTransport>,
    chat: ChatSession<HttpTransport>,
    load_report: LoadCurrentReportUseCase<HttpTransport>,
    export: ExportReportUseCase<HttpTransport>,
}

impl SymptoScanWorkflow {
    /// Create a new workflow instance with dependency injection
    pub fn new(config: Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::from_config(&config)?);
        let context = UserContext::new(config.user_id.clone());

        let pipeline = UploadPipeline::new(
            transport.clone(),
            context.clone(),
            config.progress_config(),
        );
        let chat = ChatSession::new(transport.clone(), context.clone());
        let load_report = LoadCurrentReportUseCase::new(transport.clone(), context);
        let export = ExportReportUseCase::new(transport);

        Ok(Self {
            config,
            pipeline,
            chat,
            load_report,
            export,
        })
    }

    /// Execute a command
    pub async fn execute(&self, args: Args) -> Result<()> {
        info!("Running {:?} as user {}", args.command, self.config.user_id);

        match args.command {
            Command::Upload { file } => {
                let task = self.upload(&file).await?;
                if task.phase() == UploadPhase::Failed {
                    bail!(
                        "Processing failed: {}",
                        task.error_message().unwrap_or_default()
                    );
                }
            }
            Command::Chat { messages } if messages.is_empty() => self.chat_interactive().await?,
            Command::Chat { messages } => {
                self.chat(&messages).await?;
            }
            Command::Report => match self.current_report().await? {
                Some(record) => println!("{}", presenter::render_report(&record)),
                None => println!("⚠ No reports found for user {}", self.config.user_id),
            },
            Command::Export { summary_id, output } => {
                self.export_pdf(&summary_id, &output).await?;
            }
            Command::Speak { output } => {
                self.speak(&output).await?;
            }
        }

        Ok(())
    }

    /// ファイルをアップロードし、要約が終わるまで進捗を表示する
    ///
    /// # Returns
    ///
    /// 処理後のタスク（`Completed` または `Failed`）
    ///
    /// # Errors
    ///
    /// ファイルが読めない、または送信前の検証に失敗した場合
    pub async fn upload(&self, path: &Path) -> Result<UploadTask> {
        let document = read_document(path).await?;

        if self.pipeline.snapshot().phase().is_terminal() {
            self.pipeline.reset()?;
        }
        self.pipeline
            .select_file(document)
            .with_context(|| format!("Cannot upload {}", path.display()))?;
        println!("✓ {}", presenter::render_task(&self.pipeline.snapshot()));

        let run = self.pipeline.start_processing();
        tokio::pin!(run);
        let mut ticker = tokio::time::interval(self.config.progress_config().interval);

        let task = loop {
            tokio::select! {
                result = &mut run => break result?,
                _ = ticker.tick() => {
                    print!("\r  {}", presenter::render_task(&self.pipeline.snapshot()));
                    std::io::stdout().flush().ok();
                }
            }
        };
        println!();

        match task.phase() {
            UploadPhase::Completed => println!("✓ {}", presenter::render_task(&task)),
            _ => println!("✗ {}", presenter::render_task(&task)),
        }

        Ok(task)
    }

    /// メッセージを順に送信し、会話ログを返す
    pub async fn chat(&self, messages: &[String]) -> Result<Vec<ChatTurn>> {
        let offset = local_offset();
        println!("{}", presenter::render_greeting());

        for message in messages {
            match self.chat.submit(message).await {
                Ok(_) => {}
                Err(SubmitError::Validation(e)) => {
                    println!("⚠ {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let turns = self.chat.turns();
        for turn in &turns {
            println!("{}", presenter::render_turn(turn, &offset));
        }
        Ok(turns)
    }

    async fn chat_interactive(&self) -> Result<()> {
        let offset = local_offset();
        println!("{}", presenter::render_greeting());
        println!("(type {} to exit)", QUIT_COMMAND);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
                break;
            };
            let line = line.trim();
            if line == QUIT_COMMAND {
                break;
            }

            match self.chat.submit(line).await {
                Ok(reply) => println!("{}", presenter::render_turn(&reply, &offset)),
                Err(SubmitError::Validation(_)) => continue,
                Err(e) => println!("⚠ {}", e),
            }
        }

        info!(
            "Chat session {} ended with {} turns",
            self.chat.session_id(),
            self.chat.turns().len()
        );
        Ok(())
    }

    pub async fn current_report(&self) -> Result<Option<ReportRecord>> {
        self.load_report
            .execute()
            .await
            .context("Failed to load the current report")
    }

    /// PDFを取得してファイルに保存する
    pub async fn export_pdf(&self, summary_id: &str, output: &Path) -> Result<()> {
        let bytes = self
            .export
            .export_pdf(summary_id)
            .await
            .with_context(|| format!("Failed to export summary {}", summary_id))?;

        tokio::fs::write(output, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("✓ Saved {} ({} bytes)", output.display(), bytes.len());
        Ok(())
    }

    /// 現在のレポートの要約を音声化してファイルに保存する
    pub async fn speak(&self, output: &Path) -> Result<()> {
        let Some(record) = self.current_report().await? else {
            bail!("No report available to read aloud");
        };

        let audio = self
            .export
            .narrate(&record.summary_text)
            .await
            .context("Failed to synthesize speech")?;

        tokio::fs::write(output, &audio)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("✓ Saved audio for {} to {}", record.display_filename(), output.display());
        Ok(())
    }
}
