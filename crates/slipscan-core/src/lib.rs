//! Core library for mobile-payment receipt capture.
//!
//! This crate provides:
//! - OCR collaborator seam with a pure Rust engine implementation
//! - Pattern-driven field extraction from receipt text
//! - Receiving-account reconciliation (exact and suffix matching)
//! - Validation warnings and agent commission calculation
//! - A pattern/account catalog and a file-backed receipt store

pub mod catalog;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod receipt;
pub mod store;

pub use catalog::{Catalog, PatternRepository};
pub use error::{Result, SlipscanError};
pub use models::catalog::{ExtractionPattern, PaymentAccount};
pub use models::config::SlipscanConfig;
pub use models::receipt::{ExtractedReceipt, ReceiptField, ReceiptStatus, TransactionType};
pub use ocr::{OcrResult, TextBox, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{CaptureOutcome, ReceiptPipeline};
pub use receipt::{
    calculate_commission, match_account, select_best_extraction, validate_receipt,
    CompiledPattern, Selection,
};
pub use store::{FileReceiptStore, ReceiptImage, ReceiptStore, StoredReceipt};
