//! # Domain Layer
//!
//! このモジュールはビジネスの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - HTTPやCLIについて何も知らない
//! - 状態遷移とバリデーションのルールだけを持つ
//!
//! ## 構成要素
//!
//! - **entities**: ビジネスエンティティ（UploadTask, ChatTurn, ReportRecordなど）
//! - **errors**: 検証エラーと通信エラーの分類
//! - **repositories**: Repository trait（インターフェース定義のみ）
//! - **services**: Domain Service（ドキュメントポリシー、進捗計算）

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
