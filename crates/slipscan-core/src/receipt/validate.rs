//! Review warnings for an extracted receipt.
//!
//! Nothing here is fatal: the caller shows the warnings and may still save.

use rust_decimal::Decimal;

use crate::models::catalog::PaymentAccount;
use crate::models::receipt::{ExtractedReceipt, ReceiptField};

/// Check an extracted receipt and return human-readable warnings.
///
/// Warnings are emitted in this order: missing required fields (in the
/// order given), a non-positive amount, then a receiver identifier that
/// matched no configured account.
pub fn validate_receipt(
    receipt: &ExtractedReceipt,
    required_fields: &[ReceiptField],
    accounts: &[PaymentAccount],
) -> Vec<String> {
    let mut warnings: Vec<String> = required_fields
        .iter()
        .filter(|field| !receipt.has_field(**field))
        .map(|field| format!("{} is required but not found", field.label()))
        .collect();

    if receipt.amount.is_some_and(|amount| amount <= Decimal::ZERO) {
        warnings.push("Amount must be greater than 0".to_string());
    }

    if let Some(receiver) = receipt.receiver_number.as_deref().filter(|r| !r.trim().is_empty()) {
        if !receipt.is_valid_account {
            warnings.push(account_mismatch(receiver, accounts));
        }
    }

    warnings
}

fn account_mismatch(receiver: &str, accounts: &[PaymentAccount]) -> String {
    let expected: Vec<&str> = accounts
        .iter()
        .filter(|a| a.is_active)
        .map(|a| a.account_number.as_str())
        .collect();

    if expected.is_empty() {
        format!("Payment was sent to {}, but no accounts are configured", receiver)
    } else {
        format!(
            "Payment was sent to {}, but expected one of: {}",
            receiver,
            expected.join(", ")
        )
    }
}
