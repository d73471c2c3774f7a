//! # Domain Services
//!
//! エンティティに属さないビジネスルール

pub mod document_policy;
pub mod progress;
