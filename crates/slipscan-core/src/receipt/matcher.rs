//! Receiving-account reconciliation.
//!
//! OCR often drops leading digits or formatting from phone numbers but
//! keeps the tail, so an exact comparison is followed by a last-four match.

use serde::Serialize;
use tracing::debug;

use crate::models::catalog::PaymentAccount;

use super::rules::patterns::ACCOUNT_NUMBER_NOISE;

/// Number of trailing characters compared by the suffix tier.
pub const SUFFIX_LEN: usize = 4;

/// How an account was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Suffix,
}

/// An account found for a receiver identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountMatch<'a> {
    pub account: &'a PaymentAccount,
    pub tier: MatchTier,
}

/// Normalize an account number or receiver identifier for comparison.
///
/// Whitespace, `+`, `-` and parentheses are removed and the result is
/// lower-cased. A 12-digit Philippine number written with the `63` country
/// code is folded to its local `0` form, so `+63 915 642 9591` and
/// `09156429591` compare equal.
pub fn normalize_account_number(raw: &str) -> String {
    let stripped = ACCOUNT_NUMBER_NOISE.replace_all(raw, "").to_lowercase();

    match stripped.strip_prefix("63") {
        Some(local) if stripped.len() == 12 && stripped.chars().all(|c| c.is_ascii_digit()) => {
            format!("0{}", local)
        }
        _ => stripped,
    }
}

/// Find the account an identifier refers to.
///
/// Candidates are scanned in the given order. The first exact match on the
/// normalized numbers wins; failing that, when the normalized identifier
/// has at least four characters, the first account sharing its last four
/// characters wins.
pub fn match_account<'a, I>(identifier: &str, candidates: I) -> Option<AccountMatch<'a>>
where
    I: IntoIterator<Item = &'a PaymentAccount>,
    I::IntoIter: Clone,
{
    let normalized = normalize_account_number(identifier);
    if normalized.is_empty() {
        return None;
    }

    let candidates = candidates.into_iter();

    if let Some(account) = match_exact(&normalized, candidates.clone()) {
        return Some(AccountMatch { account, tier: MatchTier::Exact });
    }

    let tail = suffix(&normalized)?;
    candidates
        .into_iter()
        .find(|account| {
            let other = normalize_account_number(&account.account_number);
            let hit = suffix(&other) == Some(tail);
            debug!(
                "Suffix check '{}': '{}' vs '{}' = {}",
                account.account_name, other, normalized, hit
            );
            hit
        })
        .map(|account| AccountMatch { account, tier: MatchTier::Suffix })
}

/// Exact comparison only, against an already-normalized identifier.
pub fn match_exact<'a>(
    normalized: &str,
    candidates: impl IntoIterator<Item = &'a PaymentAccount>,
) -> Option<&'a PaymentAccount> {
    candidates.into_iter().find(|account| {
        let other = normalize_account_number(&account.account_number);
        debug!("Exact check '{}': '{}' vs '{}'", account.account_name, other, normalized);
        other == normalized
    })
}

fn suffix(normalized: &str) -> Option<&str> {
    let count = normalized.chars().count();
    if count < SUFFIX_LEN {
        return None;
    }
    normalized
        .char_indices()
        .nth(count - SUFFIX_LEN)
        .map(|(i, _)| &normalized[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Vec<PaymentAccount> {
        vec![
            PaymentAccount::new("gcash", "Main", "+63 915 642 9591", "Maria Santos"),
            PaymentAccount::new("gcash", "Backup", "0917 111 2222", "Jose Rizal"),
        ]
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_account_number("+63 915 642 9591"), "09156429591");
        assert_eq!(normalize_account_number("0917-111-2222"), "09171112222");
        assert_eq!(normalize_account_number("(02) 8123 4567"), "0281234567");
        assert_eq!(normalize_account_number("ABC 12-34"), "abc1234");
        assert_eq!(normalize_account_number("6312"), "6312");
    }

    #[test]
    fn test_exact_match_across_formats() {
        let accounts = accounts();
        let found = match_account("09156429591", &accounts).unwrap();

        assert_eq!(found.account.account_name, "Main");
        assert_eq!(found.tier, MatchTier::Exact);
    }

    #[test]
    fn test_suffix_match_when_leading_digit_lost() {
        let accounts = accounts();
        let found = match_account("156429591", &accounts).unwrap();

        assert_eq!(found.account.account_name, "Main");
        assert_eq!(found.tier, MatchTier::Suffix);
    }

    #[test]
    fn test_exact_preferred_over_earlier_suffix() {
        let accounts = vec![
            PaymentAccount::new("gcash", "Tail", "0999 000 2222", "A"),
            PaymentAccount::new("gcash", "Whole", "0917 111 2222", "B"),
        ];

        let found = match_account("09171112222", &accounts).unwrap();
        assert_eq!(found.account.account_name, "Whole");
    }

    #[test]
    fn test_short_identifier_has_no_suffix_tier() {
        let accounts = accounts();
        assert!(match_account("591", &accounts).is_none());
        assert!(match_account("", &accounts).is_none());
        assert!(match_account("+ -", &accounts).is_none());
    }

    #[test]
    fn test_no_match() {
        let accounts = accounts();
        assert!(match_account("09181234567", &accounts).is_none());
    }
}
