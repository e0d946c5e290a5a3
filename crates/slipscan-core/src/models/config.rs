//! Configuration structures for the capture pipeline.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::ExtractionPattern;
use super::receipt::ReceiptField;
use crate::error::{Result, SlipscanError};

/// Main configuration for slipscan.
///
/// Passed explicitly into every capture; nothing here is process-global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlipscanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Agent commission rates.
    pub commission: CommissionConfig,

    /// Catalog and receipt storage locations.
    pub storage: StorageConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fields that must be present; missing ones become warnings.
    pub required_fields: Vec<ReceiptField>,

    /// Regex defaults offered for new patterns and used by the pattern tester.
    pub default_rules: ExtractionRules,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            required_fields: ReceiptField::DEFAULT_REQUIRED.to_vec(),
            default_rules: ExtractionRules::default(),
        }
    }
}

/// Administrator-editable regex defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionRules {
    pub account_type: String,
    pub amount_pattern: String,
    pub reference_pattern: String,
    pub date_pattern: String,
    pub sender_pattern: String,
    pub receiver_pattern: String,
    pub phone_pattern: String,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        let stock = ExtractionPattern::gcash_default();
        Self {
            account_type: stock.account_type,
            amount_pattern: stock.amount_pattern,
            reference_pattern: stock.reference_pattern,
            date_pattern: stock.date_pattern,
            sender_pattern: stock.sender_pattern.unwrap_or_default(),
            receiver_pattern: stock.receiver_pattern.unwrap_or_default(),
            phone_pattern: stock.phone_pattern.unwrap_or_default(),
        }
    }
}

impl ExtractionRules {
    /// Materialize the rules as an ad-hoc pattern.
    pub fn to_pattern(&self, pattern_name: &str) -> ExtractionPattern {
        let mut pattern = ExtractionPattern::new(
            pattern_name,
            self.account_type.clone(),
            self.amount_pattern.clone(),
            self.reference_pattern.clone(),
            self.date_pattern.clone(),
        );
        pattern.sender_pattern = Some(self.sender_pattern.clone());
        pattern.receiver_pattern = Some(self.receiver_pattern.clone());
        pattern.phone_pattern = Some(self.phone_pattern.clone());
        pattern
    }
}

/// Commission rates in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionConfig {
    /// Share of the service portion (amount minus tip).
    pub service_rate: Decimal,

    /// Share of the customer tip.
    pub tip_rate: Decimal,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            service_rate: Decimal::from(20),
            tip_rate: Decimal::from(50),
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Pattern/account catalog file.
    pub catalog_path: PathBuf,

    /// Directory receiving saved receipts and images.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("catalog.json"),
            data_dir: PathBuf::from("receipts"),
        }
    }
}

impl SlipscanConfig {
    /// Load configuration from a JSON file.
    ///
    /// A file that is not valid configuration JSON is a
    /// [`SlipscanError::Config`] naming the path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SlipscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SlipscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
