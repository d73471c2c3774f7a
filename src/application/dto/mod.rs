//! Data Transfer Objects

pub mod user_context;
