//! Receipt data produced by the extraction pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of the payment relative to the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received by the business ("Sent via GCash" receipts).
    #[default]
    Receive,
    Send,
}

/// Processing status of a captured receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Fields that can be extracted from receipt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReceiptField {
    Amount,
    ReferenceNumber,
    DateTime,
    SenderName,
    ReceiverName,
    /// Phone number or account number of the receiver.
    ReceiverNumber,
    BankName,
}

impl ReceiptField {
    /// Fields required by default before a receipt is considered complete.
    pub const DEFAULT_REQUIRED: [ReceiptField; 3] = [
        ReceiptField::Amount,
        ReceiptField::ReferenceNumber,
        ReceiptField::DateTime,
    ];

    /// The camelCase key used in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::ReferenceNumber => "referenceNumber",
            Self::DateTime => "dateTime",
            Self::SenderName => "senderName",
            Self::ReceiverName => "receiverName",
            Self::ReceiverNumber => "receiverNumber",
            Self::BankName => "bankName",
        }
    }

    /// Lower-case words for messages ("reference number").
    pub fn label(&self) -> String {
        let mut label = String::new();
        for c in self.key().chars() {
            if c.is_ascii_uppercase() {
                label.push(' ');
            }
            label.push(c.to_ascii_lowercase());
        }
        label
    }
}

impl fmt::Display for ReceiptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReceiptField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amount" => Ok(Self::Amount),
            "referenceNumber" | "reference_number" => Ok(Self::ReferenceNumber),
            "dateTime" | "date_time" => Ok(Self::DateTime),
            "senderName" | "sender_name" => Ok(Self::SenderName),
            "receiverName" | "receiver_name" => Ok(Self::ReceiverName),
            "receiverNumber" | "receiver_number" => Ok(Self::ReceiverNumber),
            "bankName" | "bank_name" => Ok(Self::BankName),
            other => Err(format!("unknown receipt field: {}", other)),
        }
    }
}

/// Fields pulled out of receipt text by a single extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialReceipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,

    #[serde(default, with = "minute_format", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<NaiveDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
}

impl PartialReceipt {
    /// A candidate is usable only when it has a non-zero amount and a
    /// reference. A captured `0.00` does not count.
    pub fn is_usable(&self) -> bool {
        self.amount.is_some_and(|amount| !amount.is_zero()) && has_text(&self.reference_number)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A fully processed receipt ready for review and persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReceipt {
    /// Transaction amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// Provider reference number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,

    /// Local transaction time, minute precision.
    #[serde(default, with = "minute_format", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<NaiveDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// Receiver name; the matched account's holder name when one matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,

    /// Phone or account number the payment was sent to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    pub transaction_type: TransactionType,

    pub status: ReceiptStatus,

    /// True if and only if a configured payment account matched.
    pub is_valid_account: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_tip: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_commission: Option<Decimal>,

    /// Name of the pattern that produced the fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,

    /// Name of the matched payment account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ExtractedReceipt {
    /// Whether a field carries a value (blank strings count as absent).
    pub fn has_field(&self, field: ReceiptField) -> bool {
        match field {
            ReceiptField::Amount => self.amount.is_some(),
            ReceiptField::ReferenceNumber => has_text(&self.reference_number),
            ReceiptField::DateTime => self.date_time.is_some(),
            ReceiptField::SenderName => has_text(&self.sender_name),
            ReceiptField::ReceiverName => has_text(&self.receiver_name),
            ReceiptField::ReceiverNumber => has_text(&self.receiver_number),
            ReceiptField::BankName => has_text(&self.bank_name),
        }
    }

    /// Date-time in the `YYYY-MM-DDTHH:MM` form shown to users.
    pub fn date_time_string(&self) -> Option<String> {
        self.date_time
            .map(|dt| dt.format(minute_format::FORMAT).to_string())
    }
}

impl From<PartialReceipt> for ExtractedReceipt {
    fn from(partial: PartialReceipt) -> Self {
        Self {
            amount: partial.amount,
            reference_number: partial.reference_number,
            date_time: partial.date_time,
            sender_name: partial.sender_name,
            receiver_name: partial.receiver_name,
            receiver_number: partial.receiver_number,
            bank_name: partial.bank_name,
            ..Self::default()
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Serde adapter for minute-precision local timestamps.
pub mod minute_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_field_labels() {
        assert_eq!(ReceiptField::Amount.label(), "amount");
        assert_eq!(ReceiptField::ReferenceNumber.label(), "reference number");
        assert_eq!(ReceiptField::DateTime.label(), "date time");
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("referenceNumber".parse::<ReceiptField>(), Ok(ReceiptField::ReferenceNumber));
        assert_eq!("date_time".parse::<ReceiptField>(), Ok(ReceiptField::DateTime));
        assert!("nope".parse::<ReceiptField>().is_err());
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let receipt = ExtractedReceipt {
            reference_number: Some("  ".to_string()),
            amount: Some(Decimal::ZERO),
            ..Default::default()
        };

        assert!(!receipt.has_field(ReceiptField::ReferenceNumber));
        assert!(receipt.has_field(ReceiptField::Amount));
    }

    #[test]
    fn test_zero_amount_is_not_usable() {
        let mut partial = PartialReceipt {
            amount: Some(Decimal::ZERO),
            reference_number: Some("42".to_string()),
            ..Default::default()
        };
        assert!(!partial.is_usable());

        partial.amount = Some(Decimal::new(1050, 2));
        assert!(partial.is_usable());

        partial.reference_number = Some("  ".to_string());
        assert!(!partial.is_usable());
    }

    #[test]
    fn test_date_time_serializes_to_minutes() {
        let receipt = ExtractedReceipt {
            date_time: NaiveDate::from_ymd_opt(2025, 8, 5)
                .and_then(|d| d.and_hms_opt(0, 33, 0)),
            ..Default::default()
        };

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["date_time"], "2025-08-05T00:33");

        let back: ExtractedReceipt = serde_json::from_value(json).unwrap();
        assert_eq!(back.date_time, receipt.date_time);
    }
}
