//! Data models for receipts, patterns, accounts, and configuration.

pub mod catalog;
pub mod config;
pub mod receipt;
