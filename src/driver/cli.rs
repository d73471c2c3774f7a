//! CLI Argument Parsing
//!
//! CLIの引数解析

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapter::config::DEFAULT_CONFIG_PATH;

/// 医療レポートの要約と症状チャットのCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "symptoscan")]
#[command(about = "Summarize medical reports and assess symptoms", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Upload a report and print its summary
    Upload {
        /// PDF, TXT, JPEG or PNG file (max 10MB)
        file: PathBuf,
    },

    /// Describe symptoms to the assistant
    Chat {
        /// Message to send (repeatable); omit for an interactive session
        #[arg(short, long = "message")]
        messages: Vec<String>,
    },

    /// Show the most recent report
    Report,

    /// Download a report as PDF
    Export {
        summary_id: String,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Read the current report summary aloud to an audio file
    Speak {
        #[arg(short, long, default_value = "summary.mp3")]
        output: PathBuf,
    },
}
