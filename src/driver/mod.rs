//! # Driver Layer (Presentation)
//!
//! CLIやその他の外部インターフェースを提供
//!
//! ## 特徴
//!
//! - Use Caseを呼び出してビジネスフローを起動
//! - 依存性注入（DI）を行い、全てを組み立てる
//! - ユーザーとのインターフェース
//!
//! ## 構成要素
//!
//! - **cli**: CLI引数のパース
//! - **presenter**: タスク・会話・レポートのテキスト表示
//! - **workflow**: コマンドのオーケストレーション

pub mod cli;
pub mod presenter;
pub mod workflow;

pub use cli::{Args, Command};
pub use workflow::SymptoScanWorkflow;
