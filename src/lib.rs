//! FPL Assistant — Fantasy Premier League chat assistant.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod fixtures;
pub mod llm;
pub mod recommend;
pub mod rules;
pub mod server;
pub mod storage;
pub mod types;
