//! Pattern selection: pick the winning (pattern, account) pair for a text.
//!
//! Selection runs a fixed list of strategies and keeps the first that
//! returns a candidate: the configured patterns first, then the legacy
//! heuristics.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::catalog::{ExtractionPattern, PaymentAccount};
use crate::models::receipt::{ExtractedReceipt, PartialReceipt, ReceiptStatus, TransactionType};

use super::extractor::{extract_with_pattern, CompiledPattern};
use super::legacy::LegacyStrategy;
use super::matcher::{match_account, MatchTier};

/// Lower-cased text fragments marking a receipt for money the business received.
const RECEIVE_MARKERS: [&str; 2] = ["sent via", "sent"];

/// Which strategy produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Pattern,
    Legacy,
}

/// Raw result of one strategy.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub partial: PartialReceipt,
    pub pattern: Option<ExtractionPattern>,
    pub account: Option<PaymentAccount>,
    pub match_tier: Option<MatchTier>,
}

/// One stage of the fallback chain.
pub trait ExtractionStrategy {
    fn kind(&self) -> StrategyKind;

    /// Returns `None` when this stage has nothing to offer and the next
    /// stage should run.
    fn extract(&self, text: &str, accounts: &[PaymentAccount]) -> Option<Candidate>;
}

/// First stage: configured patterns in priority order.
///
/// The first pattern whose candidate matches an account of the pattern's
/// type wins outright. Without any account match, the first usable
/// candidate (amount and reference present) is returned.
#[derive(Debug, Clone, Copy)]
pub struct PatternStrategy<'p> {
    patterns: &'p [CompiledPattern],
}

impl<'p> PatternStrategy<'p> {
    pub fn new(patterns: &'p [CompiledPattern]) -> Self {
        Self { patterns }
    }
}

impl ExtractionStrategy for PatternStrategy<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pattern
    }

    fn extract(&self, text: &str, accounts: &[PaymentAccount]) -> Option<Candidate> {
        let mut best_fallback: Option<Candidate> = None;

        for compiled in self.patterns {
            if let Err(e) = compiled.check_viable() {
                warn!("Skipping pattern '{}': {}", compiled.name(), e);
                continue;
            }

            let partial = extract_with_pattern(text, compiled);
            if !partial.is_usable() {
                debug!("Pattern '{}' produced no usable candidate", compiled.name());
                continue;
            }

            let same_type = accounts
                .iter()
                .filter(|a| a.account_type == compiled.account_type());
            debug!(
                "Pattern '{}' matched, checking {} '{}' accounts",
                compiled.name(),
                same_type.clone().count(),
                compiled.account_type()
            );

            let matched = partial
                .receiver_number
                .as_deref()
                .and_then(|identifier| match_account(identifier, same_type));

            if let Some(found) = matched {
                info!(
                    "Pattern '{}' matched account '{}' ({:?})",
                    compiled.name(),
                    found.account.account_name,
                    found.tier
                );
                return Some(Candidate {
                    partial,
                    pattern: Some(compiled.pattern.clone()),
                    account: Some(found.account.clone()),
                    match_tier: Some(found.tier),
                });
            }

            if best_fallback.is_none() {
                best_fallback = Some(Candidate {
                    partial,
                    pattern: Some(compiled.pattern.clone()),
                    account: None,
                    match_tier: None,
                });
            }
        }

        if let Some(candidate) = &best_fallback {
            if let Some(pattern) = &candidate.pattern {
                info!("No account matched, using pattern '{}'", pattern.pattern_name);
            }
        }

        best_fallback
    }
}

/// The finished extraction for one text.
#[derive(Debug, Clone)]
pub struct Selection {
    pub receipt: ExtractedReceipt,
    pub pattern: Option<ExtractionPattern>,
    pub account: Option<PaymentAccount>,
    pub strategy: StrategyKind,
    pub match_tier: Option<MatchTier>,
}

/// Select the best extraction for `text`.
///
/// `patterns` must already be active-only and in priority order; `accounts`
/// active-only.
pub fn select_best_extraction(
    text: &str,
    patterns: &[CompiledPattern],
    accounts: &[PaymentAccount],
) -> Selection {
    let pattern_stage = PatternStrategy::new(patterns);
    let strategies: [&dyn ExtractionStrategy; 2] = [&pattern_stage, &LegacyStrategy];

    let (strategy, candidate) = strategies
        .iter()
        .find_map(|stage| stage.extract(text, accounts).map(|c| (stage.kind(), c)))
        .unwrap_or((StrategyKind::Legacy, Candidate::default()));

    if strategy == StrategyKind::Legacy {
        info!("No pattern produced amount and reference, used legacy extraction");
    }

    finalize(text, strategy, candidate)
}

fn finalize(text: &str, strategy: StrategyKind, candidate: Candidate) -> Selection {
    let Candidate { partial, pattern, account, match_tier } = candidate;
    let mut receipt = ExtractedReceipt::from(partial);

    let lowered = text.to_lowercase();
    receipt.transaction_type = if RECEIVE_MARKERS.iter().any(|m| lowered.contains(m)) {
        TransactionType::Receive
    } else {
        TransactionType::Send
    };
    receipt.status = ReceiptStatus::Completed;

    receipt.is_valid_account = account.is_some();
    if let Some(account) = &account {
        receipt.receiver_name = Some(account.account_holder_name.clone());
        receipt.matched_account = Some(account.account_name.clone());
    }
    receipt.matched_pattern = pattern.as_ref().map(|p| p.pattern_name.clone());

    Selection {
        receipt,
        pattern,
        account,
        strategy,
        match_tier,
    }
}
