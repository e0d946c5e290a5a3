//! Heuristic extractor used when no configured pattern yields a candidate.
//!
//! Works on whitespace-collapsed text with the fixed regex lists from
//! [`super::rules::patterns`], independent of the pattern catalog.

use tracing::debug;

use crate::models::catalog::PaymentAccount;
use crate::models::receipt::PartialReceipt;

use super::matcher::{match_exact, normalize_account_number, MatchTier};
use super::rules::patterns::{
    collapse_whitespace, first_capture, LEGACY_AMOUNT, LEGACY_DATE, LEGACY_PHONE,
    LEGACY_REFERENCE, LEGACY_SENDER,
};
use super::rules::{parse_amount, parse_receipt_datetime};
use super::selection::{Candidate, ExtractionStrategy, StrategyKind};

/// Extract whatever the hard-coded regexes find.
pub fn extract_legacy(text: &str) -> PartialReceipt {
    let clean = collapse_whitespace(text);
    let trimmed = |s: &str| s.trim().to_string();

    let partial = PartialReceipt {
        amount: first_capture(&LEGACY_AMOUNT, &clean).and_then(parse_amount),
        reference_number: first_capture(&LEGACY_REFERENCE, &clean).map(trimmed),
        date_time: first_capture(&LEGACY_DATE, &clean).and_then(parse_receipt_datetime),
        sender_name: first_capture(&LEGACY_SENDER, &clean).map(trimmed),
        receiver_number: first_capture(&LEGACY_PHONE, &clean).map(trimmed),
        ..PartialReceipt::default()
    };

    debug!("Legacy extraction: {:?}", partial);
    partial
}

/// Second stage of selection: legacy extraction plus exact-only account
/// validation against every active account, regardless of type.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStrategy;

impl ExtractionStrategy for LegacyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Legacy
    }

    fn extract(&self, text: &str, accounts: &[PaymentAccount]) -> Option<Candidate> {
        let partial = extract_legacy(text);

        let account = partial
            .receiver_number
            .as_deref()
            .map(normalize_account_number)
            .and_then(|normalized| match_exact(&normalized, accounts))
            .cloned();

        Some(Candidate {
            match_tier: account.as_ref().map(|_| MatchTier::Exact),
            partial,
            pattern: None,
            account,
        })
    }
}
