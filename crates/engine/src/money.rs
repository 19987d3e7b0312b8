use std::fmt;

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (loan principals,
/// repayments, outstanding balances) to avoid floating-point drift.
///
/// Principals and repayments are always positive and at most
/// [`MoneyCents::MAX_AMOUNT`]; derived values such as a net balance can be
/// negative:
/// - positive = the friend owes the user
/// - negative = the user owes the friend
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// assert_eq!(amount.checked_sub(MoneyCents::new(34)), Some(MoneyCents::new(12_00)));
/// assert_eq!(MoneyCents::new(i64::MAX).checked_add(amount), None);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest principal or repayment accepted: one billion units.
    pub const MAX_AMOUNT: MoneyCents = MoneyCents(1_000_000_000_00);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Addition clamped to the `i64` range.
    #[must_use]
    pub const fn saturating_add(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_add(rhs.0))
    }

    /// Subtraction clamped to the `i64` range.
    #[must_use]
    pub const fn saturating_sub(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
        assert_eq!(MoneyCents::new(i64::MIN).to_string(), "-92233720368547758.08");
    }

    #[test]
    fn arithmetic_never_wraps() {
        let max = MoneyCents::new(i64::MAX);
        let min = MoneyCents::new(i64::MIN);

        assert_eq!(max.checked_add(MoneyCents::new(1)), None);
        assert_eq!(min.checked_sub(MoneyCents::new(1)), None);
        assert_eq!(max.saturating_add(MoneyCents::new(1)), max);
        assert_eq!(min.saturating_sub(MoneyCents::new(1)), min);
        assert_eq!(
            MoneyCents::MAX_AMOUNT.checked_add(MoneyCents::MAX_AMOUNT),
            Some(MoneyCents::new(2_000_000_000_00))
        );
    }
}
