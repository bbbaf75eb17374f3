//! Month-by-month envelope rollover
//!
//! An envelope's history is a sparse set of months that carry transactions or
//! a month config. The balance is computed by walking every calendar month
//! from the earliest of those through the target, folding each month into a
//! running balance with the carry/reset rule in [`roll_month`].

use std::collections::BTreeMap;

use tracing::trace;

use crate::models::{Money, Month, OverspendMode};

/// Everything recorded for one envelope in one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthActivity {
    /// Incoming minus outgoing transaction amounts
    pub net: Money,
    pub allocation: Money,
    pub overspend_mode: OverspendMode,
}

/// Sparse per-month history of one envelope
#[derive(Debug, Clone, Default)]
pub struct EnvelopeHistory {
    months: BTreeMap<Month, MonthActivity>,
}

impl EnvelopeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction amount, positive for money flowing in
    pub fn add_flow(&mut self, month: Month, signed_amount: Money) {
        self.months.entry(month).or_default().net += signed_amount;
    }

    /// Record the month config of `month`
    pub fn set_config(&mut self, month: Month, allocation: Money, overspend_mode: OverspendMode) {
        let activity = self.months.entry(month).or_default();
        activity.allocation = allocation;
        activity.overspend_mode = overspend_mode;
    }

    pub fn first_month(&self) -> Option<Month> {
        self.months.keys().next().copied()
    }

    pub fn get(&self, month: Month) -> Option<&MonthActivity> {
        self.months.get(&month)
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Balance at the end of `target`
    ///
    /// Months after `target` are ignored. An empty history is zero.
    pub fn balance(&self, target: Month) -> Money {
        let Some(first) = self.first_month() else {
            return Money::ZERO;
        };

        first
            .iter_through(target)
            .fold(Money::ZERO, |running, month| {
                let next = roll_month(running, self.get(month), month == target);
                trace!(%month, %running, %next, "rollover");
                next
            })
    }
}

/// Fold one calendar month into the running balance
///
/// A month without any record cannot carry a deficit, so a negative running
/// balance resets to zero. Otherwise the month's net flow and allocation are
/// added; a negative result survives only under `AffectEnvelope` or when the
/// month is the target being reported.
pub fn roll_month(running: Money, activity: Option<&MonthActivity>, is_target: bool) -> Money {
    let Some(activity) = activity else {
        return if running.is_negative() {
            Money::ZERO
        } else {
            running
        };
    };

    let sum = running + activity.net + activity.allocation;
    if !sum.is_negative() {
        return sum;
    }

    match activity.overspend_mode {
        OverspendMode::AffectEnvelope => sum,
        OverspendMode::AffectAvailable if is_target => sum,
        OverspendMode::AffectAvailable => Money::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn m(year: i32, month: i32) -> Month {
        Month::new(year, month)
    }

    fn money(amount: rust_decimal::Decimal) -> Money {
        Money::from(amount)
    }

    #[test]
    fn test_empty_history_is_zero() {
        let history = EnvelopeHistory::new();
        assert_eq!(history.balance(m(2025, 6)), Money::ZERO);
    }

    #[test]
    fn test_allocation_only() {
        let mut history = EnvelopeHistory::new();
        history.set_config(m(2025, 1), money(dec!(50)), OverspendMode::AffectAvailable);

        assert_eq!(history.balance(m(2025, 1)), money(dec!(50)));
        assert_eq!(history.balance(m(2025, 4)), money(dec!(50)));
    }

    #[test]
    fn test_target_month_deficit_exposed() {
        let mut history = EnvelopeHistory::new();
        history.set_config(m(2025, 1), money(dec!(50)), OverspendMode::AffectAvailable);
        history.add_flow(m(2025, 1), money(dec!(-80)));

        assert_eq!(history.balance(m(2025, 1)), money(dec!(-30)));
    }

    #[test]
    fn test_deficit_absorbed_after_target() {
        let mut history = EnvelopeHistory::new();
        history.set_config(m(2025, 1), money(dec!(50)), OverspendMode::AffectAvailable);
        history.add_flow(m(2025, 1), money(dec!(-80)));

        assert_eq!(history.balance(m(2025, 2)), Money::ZERO);
    }

    #[test]
    fn test_affect_envelope_carries_deficit() {
        let mut history = EnvelopeHistory::new();
        history.set_config(m(2025, 1), money(dec!(50)), OverspendMode::AffectEnvelope);
        history.add_flow(m(2025, 1), money(dec!(-80)));
        history.set_config(m(2025, 2), money(dec!(40)), OverspendMode::AffectAvailable);

        assert_eq!(history.balance(m(2025, 2)), money(dec!(10)));
    }

    #[test]
    fn test_affect_envelope_carries_across_configured_months() {
        let mut history = EnvelopeHistory::new();
        history.add_flow(m(2025, 1), money(dec!(-100)));
        history.set_config(m(2025, 1), Money::ZERO, OverspendMode::AffectEnvelope);
        history.set_config(m(2025, 2), money(dec!(30)), OverspendMode::AffectEnvelope);
        history.set_config(m(2025, 3), money(dec!(30)), OverspendMode::AffectEnvelope);

        assert_eq!(history.balance(m(2025, 2)), money(dec!(-70)));
        assert_eq!(history.balance(m(2025, 3)), money(dec!(-40)));
    }

    #[test]
    fn test_silent_month_clears_carried_deficit() {
        let mut history = EnvelopeHistory::new();
        history.add_flow(m(2025, 1), money(dec!(-100)));
        history.set_config(m(2025, 1), Money::ZERO, OverspendMode::AffectEnvelope);
        history.set_config(m(2025, 3), money(dec!(30)), OverspendMode::AffectAvailable);

        // February has no records, so January's deficit does not reach March
        assert_eq!(history.balance(m(2025, 3)), money(dec!(30)));
    }

    #[test]
    fn test_positive_balance_survives_gaps() {
        let mut history = EnvelopeHistory::new();
        history.set_config(m(2024, 11), money(dec!(25.50)), OverspendMode::AffectAvailable);
        history.add_flow(m(2025, 2), money(dec!(-5.25)));

        assert_eq!(history.balance(m(2025, 2)), money(dec!(20.25)));
    }

    #[test]
    fn test_target_before_first_month() {
        let mut history = EnvelopeHistory::new();
        history.set_config(m(2025, 5), money(dec!(10)), OverspendMode::AffectAvailable);

        assert_eq!(history.balance(m(2025, 4)), Money::ZERO);
    }

    #[test]
    fn test_roll_month_silent() {
        assert_eq!(roll_month(money(dec!(-5)), None, false), Money::ZERO);
        assert_eq!(roll_month(money(dec!(-5)), None, true), Money::ZERO);
        assert_eq!(roll_month(money(dec!(5)), None, false), money(dec!(5)));
    }
}
