//! Error types for the slipscan-core library.

use thiserror::Error;

/// Main error type for the slipscan library.
#[derive(Error, Debug)]
pub enum SlipscanError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Pattern/account catalog error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Receipt persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to a single extraction pattern.
///
/// These never abort a capture; the selection engine logs them and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    /// A stored regex did not compile.
    #[error("invalid regex for {field}: {reason}")]
    InvalidRegex { field: String, reason: String },

    /// A required regex (amount, reference, date) is empty.
    #[error("pattern {pattern} has no {field} regex")]
    MissingRegex { pattern: String, field: String },
}

/// Errors from the pattern/account repository.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read or written.
    #[error("failed to access catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog document is malformed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to upload/copy the receipt image.
    #[error("failed to upload image: {0}")]
    Image(String),

    /// Failed to write the receipt record.
    #[error("failed to save receipt: {0}")]
    Write(String),

    /// The receipt is missing data the store needs.
    #[error("receipt is incomplete: {0}")]
    Incomplete(String),
}

/// Result type for the slipscan library.
pub type Result<T> = std::result::Result<T, SlipscanError>;
