//! # SymptoScan
//!
//! 医療レポートのアップロード→要約パイプラインと、症状チャットのクライアント
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: 状態遷移・検証ルールとエンティティ（HTTPに依存しない）
//! - **Application層**: アップロードパイプライン、チャットセッションなどのユースケース
//! - **Adapter層**: バックエンドAPI（HTTP）と設定ファイルとの統合
//! - **Driver層**: CLI、表示、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
