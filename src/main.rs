//! SymptoScan CLI
//!
//! 医療レポートの要約と症状チャット

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::{Context, Result};
use clap::Parser;

use symptoscan::adapter::config::Config;
use symptoscan::driver::{Args, SymptoScanWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Missing or invalid configuration is fatal before any command runs
    let config = Config::load(&args.config).context("Invalid configuration")?;

    // Create workflow with injected dependencies
    let workflow = SymptoScanWorkflow::new(config)?;

    workflow.execute(args).await
}
