//! HTTP Integration
//!
//! バックエンドAPIとの統合

pub mod client;
pub mod errors;
pub mod models;

pub use client::HttpTransport;
