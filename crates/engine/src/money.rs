use std::fmt;

use crate::{EngineError, ResultEngine};

/// Money amount represented as **integer minor units** (cents).
///
/// Every amount the engine stores or sums goes through this type so totals
/// never accumulate binary floating-point error.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Adds `rhs` and reports overflow as an engine error.
    pub fn try_add(self, rhs: Money) -> ResultEngine<Money> {
        self.checked_add(rhs)
            .ok_or_else(|| EngineError::InvalidAmount("total too large".to_string()))
    }

    /// Sums every amount, failing on overflow.
    pub fn try_sum<I>(amounts: I) -> ResultEngine<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.try_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(7).to_string(), "0.07");
        assert_eq!(Money::new(1550).to_string(), "15.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn try_sum_reports_overflow() {
        let amounts = [Money::new(i64::MAX), Money::new(1)];
        assert!(matches!(
            Money::try_sum(amounts),
            Err(EngineError::InvalidAmount(_))
        ));
        assert_eq!(
            Money::try_sum([Money::new(1000), Money::new(550)]).unwrap(),
            Money::new(1550)
        );
    }
}
