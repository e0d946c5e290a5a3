//! Single-pattern field extraction.
//!
//! Stored regexes come from an administrator and are untrusted, so they are
//! compiled once into a [`CompiledPattern`] that keeps a per-field result
//! instead of failing as a whole.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PatternError;
use crate::models::catalog::ExtractionPattern;
use crate::models::receipt::{PartialReceipt, ReceiptField};

use super::rules::{parse_amount, parse_receipt_datetime};

/// One configured regex of a pattern after compilation.
#[derive(Debug, Clone)]
pub struct CompiledField {
    /// Pattern attribute the regex came from (e.g. `"amount_pattern"`).
    pub rule: &'static str,
    pub field: ReceiptField,
    pub source: String,
    pub regex: Result<Regex, PatternError>,
}

/// An extraction pattern with its regexes compiled case-insensitively.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pattern: ExtractionPattern,
    fields: Vec<CompiledField>,
}

impl CompiledPattern {
    /// Compile every non-empty regex on `pattern`. Never fails; broken
    /// regexes are kept as errors on their field.
    pub fn compile(pattern: ExtractionPattern) -> Self {
        let fields = pattern
            .field_regexes()
            .into_iter()
            .map(|(rule, field, source)| CompiledField {
                rule,
                field,
                source: source.to_string(),
                regex: compile_regex(rule, source),
            })
            .collect();

        Self { pattern, fields }
    }

    pub fn compile_all(patterns: impl IntoIterator<Item = ExtractionPattern>) -> Vec<Self> {
        patterns.into_iter().map(Self::compile).collect()
    }

    pub fn name(&self) -> &str {
        &self.pattern.pattern_name
    }

    pub fn account_type(&self) -> &str {
        &self.pattern.account_type
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    /// Problems found while compiling, including missing required regexes.
    pub fn errors(&self) -> Vec<PatternError> {
        let mut errors: Vec<PatternError> = ReceiptField::DEFAULT_REQUIRED
            .iter()
            .filter(|required| !self.fields.iter().any(|f| f.field == **required))
            .map(|required| PatternError::MissingRegex {
                pattern: self.pattern.pattern_name.clone(),
                field: required.label(),
            })
            .collect();

        errors.extend(self.fields.iter().filter_map(|f| f.regex.as_ref().err().cloned()));
        errors
    }

    /// A pattern can only yield a usable candidate when its amount and
    /// reference regexes both compiled.
    pub fn check_viable(&self) -> Result<(), PatternError> {
        for required in [ReceiptField::Amount, ReceiptField::ReferenceNumber] {
            match self.fields.iter().find(|f| f.field == required) {
                Some(f) => {
                    if let Err(e) = &f.regex {
                        return Err(e.clone());
                    }
                }
                None => {
                    return Err(PatternError::MissingRegex {
                        pattern: self.pattern.pattern_name.clone(),
                        field: required.label(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn is_viable(&self) -> bool {
        self.check_viable().is_ok()
    }
}

fn compile_regex(rule: &str, source: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| PatternError::InvalidRegex {
            field: rule.to_string(),
            reason: e.to_string(),
        })
}

/// Apply one pattern to the full receipt text.
///
/// Each field takes capture group 1 of the first match. Fields whose regex
/// failed to compile, does not match, or captures something unparseable
/// are left unset.
pub fn extract_with_pattern(text: &str, pattern: &CompiledPattern) -> PartialReceipt {
    let mut partial = PartialReceipt::default();

    for compiled in &pattern.fields {
        let regex = match &compiled.regex {
            Ok(regex) => regex,
            Err(e) => {
                debug!("Pattern '{}': skipping {}: {}", pattern.name(), compiled.rule, e);
                continue;
            }
        };

        let Some(captured) = first_group(regex, text) else {
            continue;
        };

        assign_field(&mut partial, compiled.field, captured);
    }

    partial
}

fn first_group<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn assign_field(partial: &mut PartialReceipt, field: ReceiptField, captured: &str) {
    let trimmed = captured.trim();

    match field {
        ReceiptField::Amount => partial.amount = parse_amount(captured),
        ReceiptField::ReferenceNumber => partial.reference_number = Some(trimmed.to_string()),
        ReceiptField::DateTime => {
            partial.date_time = parse_receipt_datetime(captured);
            if partial.date_time.is_none() {
                debug!("Unparseable date: '{}'", trimmed);
            }
        }
        ReceiptField::SenderName => partial.sender_name = Some(trimmed.to_string()),
        ReceiptField::ReceiverName => partial.receiver_name = Some(trimmed.to_string()),
        ReceiptField::ReceiverNumber => partial.receiver_number = Some(trimmed.to_string()),
        ReceiptField::BankName => partial.bank_name = Some(trimmed.to_string()),
    }
}

/// Outcome of testing one regex of a pattern against sample text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldProbe {
    pub rule: &'static str,
    pub field: ReceiptField,
    pub found: bool,

    /// Capture group 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Whole matched text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_match: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run every configured regex of `pattern` against `text` and report what
/// each one captured, for administrators tuning patterns.
pub fn probe_pattern(text: &str, pattern: &ExtractionPattern) -> Vec<FieldProbe> {
    pattern
        .field_regexes()
        .into_iter()
        .map(|(rule, field, source)| match compile_regex(rule, source) {
            Ok(regex) => {
                let caps = regex.captures(text);
                FieldProbe {
                    rule,
                    field,
                    found: caps.is_some(),
                    value: caps
                        .as_ref()
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str().to_string()),
                    full_match: caps
                        .as_ref()
                        .and_then(|c| c.get(0))
                        .map(|m| m.as_str().to_string()),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Invalid regex pattern for {}: {}", rule, e);
                FieldProbe {
                    rule,
                    field,
                    found: false,
                    value: None,
                    full_match: None,
                    error: Some("Invalid regex pattern".to_string()),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SAMPLE: &str = "Amount 2,080.00 Total Amount Sent £2080.00 Ref No. 8031350663152 Aug 5, 2025 12:33 AM";

    #[test]
    fn test_default_gcash_pattern() {
        let compiled = CompiledPattern::compile(ExtractionPattern::gcash_default());
        let partial = extract_with_pattern(SAMPLE, &compiled);

        assert_eq!(partial.amount, Some(Decimal::from_str("2080.00").unwrap()));
        assert_eq!(partial.reference_number.as_deref(), Some("8031350663152"));
        assert_eq!(
            partial.date_time,
            NaiveDate::from_ymd_opt(2025, 8, 5).and_then(|d| d.and_hms_opt(0, 33, 0))
        );
        assert!(partial.is_usable());
    }

    #[test]
    fn test_case_insensitive_and_trimmed() {
        let pattern = ExtractionPattern::new(
            "Bank",
            "bank",
            r"php\s*([0-9,.]+)",
            r"ref:([ 0-9]+)",
            r"date:\s*(\S+)",
        )
        .with_sender_pattern(r"from:([a-z ]+)\.");

        let partial = extract_with_pattern(
            "PHP 1,500.50 REF: 12 34 FROM: Juan Dela Cruz .",
            &CompiledPattern::compile(pattern),
        );

        assert_eq!(partial.amount, Some(Decimal::from_str("1500.50").unwrap()));
        assert_eq!(partial.reference_number.as_deref(), Some("12 34"));
        assert_eq!(partial.sender_name.as_deref(), Some("Juan Dela Cruz"));
        assert_eq!(partial.date_time, None);
    }

    #[test]
    fn test_full_month_name_date() {
        let pattern = ExtractionPattern::new(
            "Maya",
            "paymaya",
            r"PHP\s*([0-9,.]+)",
            r"Ref\s*([0-9]+)",
            r"([A-Za-z]+\s+[0-9]{1,2},\s+[0-9]{4}(?:\s+[0-9]{1,2}:[0-9]{2}\s*[AP]M)?)",
        );
        let compiled = CompiledPattern::compile(pattern);

        let with_time = extract_with_pattern("PHP 75.00 Ref 991 August 15, 2025 11:59 PM", &compiled);
        assert_eq!(
            with_time.date_time,
            NaiveDate::from_ymd_opt(2025, 8, 15).and_then(|d| d.and_hms_opt(23, 59, 0))
        );

        let date_only = extract_with_pattern("PHP 75.00 Ref 991 August 15, 2025", &compiled);
        assert_eq!(
            date_only.date_time,
            NaiveDate::from_ymd_opt(2025, 8, 15).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_malformed_field_is_skipped() {
        let pattern = ExtractionPattern::gcash_default().with_sender_pattern(r"From ([A-Z");
        let compiled = CompiledPattern::compile(pattern);

        assert!(compiled.is_viable());
        assert_eq!(compiled.errors().len(), 1);

        let partial = extract_with_pattern(&format!("{} From Ana", SAMPLE), &compiled);
        assert_eq!(partial.reference_number.as_deref(), Some("8031350663152"));
        assert!(partial.amount.is_some());
        assert_eq!(partial.sender_name, None);
    }

    #[test]
    fn test_malformed_amount_is_not_viable() {
        let mut pattern = ExtractionPattern::gcash_default();
        pattern.amount_pattern = "Amount ([0-9".to_string();

        let compiled = CompiledPattern::compile(pattern);
        assert!(!compiled.is_viable());
        assert!(matches!(
            compiled.check_viable(),
            Err(PatternError::InvalidRegex { ref field, .. }) if field == "amount_pattern"
        ));
    }

    #[test]
    fn test_account_number_overrides_phone() {
        let pattern = ExtractionPattern::gcash_default()
            .with_account_number_pattern(r"Account No\.?\s*([0-9 ]+[0-9])");

        let text = format!("{} to 09156429591 Account No. 1234 5678", SAMPLE);
        let partial = extract_with_pattern(&text, &CompiledPattern::compile(pattern));

        assert_eq!(partial.receiver_number.as_deref(), Some("1234 5678"));
    }

    #[test]
    fn test_unparseable_amount_left_unset() {
        let pattern = ExtractionPattern::new("p", "gcash", r"Amount (\S+)", r"Ref (\d+)", r"(x)");
        let partial = extract_with_pattern("Amount ??? Ref 42", &CompiledPattern::compile(pattern));

        assert_eq!(partial.amount, None);
        assert_eq!(partial.reference_number.as_deref(), Some("42"));
        assert!(!partial.is_usable());
    }

    #[test]
    fn test_probe_pattern() {
        let pattern = ExtractionPattern::gcash_default().with_sender_pattern("(unclosed");
        let probes = probe_pattern(SAMPLE, &pattern);

        let amount = &probes[0];
        assert_eq!(amount.field, ReceiptField::Amount);
        assert!(amount.found);
        assert_eq!(amount.value.as_deref(), Some("2,080.00"));
        assert_eq!(amount.full_match.as_deref(), Some("Amount 2,080.00"));

        let sender = probes.iter().find(|p| p.rule == "sender_pattern").unwrap();
        assert!(!sender.found);
        assert_eq!(sender.error.as_deref(), Some("Invalid regex pattern"));
    }
}
