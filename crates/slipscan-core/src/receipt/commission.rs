//! Agent commission.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::config::CommissionConfig;

/// Commission earned by an agent on one transaction.
///
/// `(amount - tip) * service_rate / 100 + tip * tip_rate / 100`, rates in
/// percent. Not rounded; a tip larger than the amount yields a negative
/// service contribution.
pub fn calculate_commission(
    amount: Decimal,
    tip: Decimal,
    service_rate: Decimal,
    tip_rate: Decimal,
) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    let service_portion = amount - tip;
    service_portion * service_rate / hundred + tip * tip_rate / hundred
}

/// [`calculate_commission`] with the configured rates.
pub fn commission_for(amount: Decimal, tip: Decimal, rates: &CommissionConfig) -> Decimal {
    calculate_commission(amount, tip, rates.service_rate, rates.tip_rate)
}

/// Round to cents for display and persistence.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_with_tip() {
        let commission = calculate_commission(
            Decimal::from(1000),
            Decimal::from(100),
            Decimal::from(20),
            Decimal::from(50),
        );
        assert_eq!(commission, Decimal::from(230));
    }

    #[test]
    fn test_commission_without_tip() {
        let commission = commission_for(Decimal::from(500), Decimal::ZERO, &CommissionConfig::default());
        assert_eq!(commission, Decimal::from(100));
    }

    #[test]
    fn test_tip_exceeding_amount_is_negative_service() {
        // (100 - 300) * 0.2 + 300 * 0.5 = -40 + 150
        let commission = commission_for(Decimal::from(100), Decimal::from(300), &CommissionConfig::default());
        assert_eq!(commission, Decimal::from(110));

        let commission = calculate_commission(
            Decimal::from(100),
            Decimal::from(300),
            Decimal::from(20),
            Decimal::ZERO,
        );
        assert_eq!(commission, Decimal::from(-40));
    }

    #[test]
    fn test_round_currency() {
        let commission = calculate_commission(
            Decimal::new(33333, 2),
            Decimal::ZERO,
            Decimal::from(15),
            Decimal::from(50),
        );
        // 333.33 * 0.15 = 49.9995
        assert_eq!(commission, Decimal::new(499995, 4));
        assert_eq!(round_currency(commission), Decimal::new(5000, 2));
    }
}
