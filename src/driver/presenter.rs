//! Presenter
//!
//! タスク・会話・レポートのテキスト表示（副作用なし）

use chrono::FixedOffset;

use crate::domain::entities::chat_turn::{ChatTurn, Role};
use crate::domain::entities::report_record::ReportRecord;
use crate::domain::entities::upload_task::{UploadPhase, UploadTask};

/// チャット開始時のあいさつ（会話ログには含めない）
pub const GREETING: &str = "Hello! I'm your AI health assistant. Please describe your symptoms \
and I'll help assess them. Remember, this is for informational purposes only and not a \
substitute for professional medical advice.";

const BAR_WIDTH: usize = 20;

/// 進捗バー
pub fn render_progress(progress: u8) -> String {
    let progress = progress.min(100);
    let filled = usize::from(progress) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress
    )
}

/// アップロードタスクの状態
pub fn render_task(task: &UploadTask) -> String {
    let file_label = task
        .file()
        .map(|f| format!("{} ({} bytes)", f.name(), f.size()))
        .unwrap_or_default();

    match task.phase() {
        UploadPhase::Idle => "No file selected".to_string(),
        UploadPhase::Selected => format!("Selected {}", file_label),
        UploadPhase::Uploading => format!("Uploading...   {}", render_progress(task.progress())),
        UploadPhase::Summarizing => {
            format!("Summarizing... {}", render_progress(task.progress()))
        }
        UploadPhase::Completed => format!(
            "Summary Preview\n{}",
            task.summary_text().unwrap_or_default()
        ),
        UploadPhase::Failed => format!(
            "{}\nRun the upload again to retry.",
            task.error_message().unwrap_or_default()
        ),
    }
}

/// 会話の1ターン
///
/// 時刻は `offset` のローカル時刻で `HH:MM` 表示
pub fn render_turn(turn: &ChatTurn, offset: &FixedOffset) -> String {
    let time = turn.created_at.with_timezone(offset).format("%H:%M");
    let speaker = match turn.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };

    let mut lines = vec![format!("[{}] {}: {}", time, speaker, turn.text)];

    if let Some(assessment) = &turn.assessment {
        lines.push(format!(
            "  {} PRIORITY",
            assessment.urgency.as_str().to_uppercase()
        ));
        if !assessment.conditions.is_empty() {
            lines.push("  Possible Conditions:".to_string());
            lines.push(format!("    {}", assessment.conditions.join(", ")));
        }
        if !assessment.recommendations.is_empty() {
            lines.push("  Recommendations:".to_string());
            for recommendation in &assessment.recommendations {
                lines.push(format!("    • {}", recommendation));
            }
        }
    }

    lines.join("\n")
}

pub fn render_greeting() -> String {
    format!("Assistant: {}", GREETING)
}

/// 現在のレポート
pub fn render_report(record: &ReportRecord) -> String {
    let mut lines = vec![
        "Report Summary".to_string(),
        format!("  ID:       {}", record.id),
        format!("  File:     {}", record.display_filename()),
    ];
    if let Some(date) = &record.upload_date {
        lines.push(format!("  Uploaded: {}", date));
    }
    lines.push(String::new());
    lines.push("Summary".to_string());
    lines.push(format!("  {}", record.summary_text));
    lines.push(String::new());
    lines.push("Clinical Notes".to_string());
    lines.push(format!("  {}", record.clinical_notes()));
    lines.join("\n")
}
