//! Extraction patterns and payment accounts managed by an administrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::receipt::ReceiptField;

/// Default priority assigned to new patterns.
pub const DEFAULT_PRIORITY: i32 = 100;

/// A named, prioritized bundle of regular expressions for one receipt layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionPattern {
    /// Repository identifier.
    pub id: String,

    /// Human-readable pattern name.
    pub pattern_name: String,

    /// Account type this layout belongs to (e.g. "gcash", "paymaya", "bank").
    pub account_type: String,

    /// Payment provider name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    /// Regex capturing the transaction amount.
    pub amount_pattern: String,

    /// Regex capturing the reference number.
    pub reference_pattern: String,

    /// Regex capturing the transaction date and time.
    pub date_pattern: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_pattern: Option<String>,

    /// Regex capturing a bank account number; wins over `phone_pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name_pattern: Option<String>,

    /// When this pattern should be used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Lower values are tried first.
    #[serde(default = "default_priority")]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl ExtractionPattern {
    /// Create an active pattern with the three required regexes.
    pub fn new(
        pattern_name: impl Into<String>,
        account_type: impl Into<String>,
        amount_pattern: impl Into<String>,
        reference_pattern: impl Into<String>,
        date_pattern: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pattern_name: pattern_name.into(),
            account_type: account_type.into(),
            provider_name: None,
            amount_pattern: amount_pattern.into(),
            reference_pattern: reference_pattern.into(),
            date_pattern: date_pattern.into(),
            sender_pattern: None,
            receiver_pattern: None,
            phone_pattern: None,
            account_number_pattern: None,
            bank_name_pattern: None,
            description: None,
            is_active: true,
            priority: DEFAULT_PRIORITY,
            created_at: Some(Utc::now()),
            updated_at: None,
            created_by: None,
        }
    }

    /// The stock GCash layout offered when an administrator creates a pattern.
    pub fn gcash_default() -> Self {
        let mut pattern = Self::new(
            "GCash Standard",
            "gcash",
            r"(?:Amount|Total Amount Sent)\s*[£₱]?\s*([0-9,]+\.?[0-9]*)",
            r"(?:Ref No\.|Reference|Transaction)\s*([0-9]+)",
            r"([A-Za-z]{3}\s+[0-9]{1,2},\s+[0-9]{4}\s+[0-9]{1,2}:[0-9]{2}\s*[AP]M)",
        );
        pattern.provider_name = Some("GCash".to_string());
        pattern.sender_pattern = Some(r"(?:From|Sender|Sent by)[:\s]*([A-Za-z\s]+)".to_string());
        pattern.receiver_pattern = Some(r"(?:To|Receiver|Received by)[:\s]*([A-Za-z\s]+)".to_string());
        pattern.phone_pattern =
            Some(r"(\+63\s*[0-9]{3}\s*[0-9]{3}\s*[0-9]{4}|09[0-9]{9})".to_string());
        pattern
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_phone_pattern(mut self, regex: impl Into<String>) -> Self {
        self.phone_pattern = Some(regex.into());
        self
    }

    pub fn with_account_number_pattern(mut self, regex: impl Into<String>) -> Self {
        self.account_number_pattern = Some(regex.into());
        self
    }

    pub fn with_sender_pattern(mut self, regex: impl Into<String>) -> Self {
        self.sender_pattern = Some(regex.into());
        self
    }

    /// Configured regexes in extraction order as `(rule, field, regex)`,
    /// skipping empty ones.
    ///
    /// Phone precedes account number so that an account-number match
    /// overwrites the receiver identifier.
    pub fn field_regexes(&self) -> Vec<(&'static str, ReceiptField, &str)> {
        [
            ("amount_pattern", ReceiptField::Amount, Some(self.amount_pattern.as_str())),
            ("reference_pattern", ReceiptField::ReferenceNumber, Some(self.reference_pattern.as_str())),
            ("date_pattern", ReceiptField::DateTime, Some(self.date_pattern.as_str())),
            ("sender_pattern", ReceiptField::SenderName, self.sender_pattern.as_deref()),
            ("receiver_pattern", ReceiptField::ReceiverName, self.receiver_pattern.as_deref()),
            ("phone_pattern", ReceiptField::ReceiverNumber, self.phone_pattern.as_deref()),
            ("account_number_pattern", ReceiptField::ReceiverNumber, self.account_number_pattern.as_deref()),
            ("bank_name_pattern", ReceiptField::BankName, self.bank_name_pattern.as_deref()),
        ]
        .into_iter()
        .filter_map(|(rule, field, regex)| {
            regex
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(|r| (rule, field, r))
        })
        .collect()
    }
}

/// A receiving account the business controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAccount {
    /// Repository identifier.
    pub id: String,

    /// Same categorical domain as [`ExtractionPattern::account_type`].
    pub account_type: String,

    /// Display name.
    pub account_name: String,

    /// Phone number, bank account, or wallet address.
    pub account_number: String,

    /// Name shown on receipts sent to this account.
    pub account_holder_name: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_primary: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl PaymentAccount {
    pub fn new(
        account_type: impl Into<String>,
        account_name: impl Into<String>,
        account_number: impl Into<String>,
        account_holder_name: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_type: account_type.into(),
            account_name: account_name.into(),
            account_number: account_number.into(),
            account_holder_name: account_holder_name.into(),
            is_active: true,
            is_primary: false,
            created_at: Some(Utc::now()),
            updated_at: None,
            created_by: None,
        }
    }
}
