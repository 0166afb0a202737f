//! Tax bracket ranges and the rate-weighted bracket schedule.
//!
//! A [`Bracket`] is a range of amounts `[lower, upper]`; an unbounded top
//! bracket has no upper bound. [`WeightedBrackets`] maps a rate to the
//! bracket it applies to and computes the total marginal charge for a given
//! amount. Rates may be negative, which encodes a tax-free allowance as a
//! "negative bracket" baked into the schedule itself.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use cantax_core::models::{Bracket, WeightedBrackets};
//!
//! let mut rates = WeightedBrackets::new();
//! rates.insert(dec!(0.15), Bracket::between(dec!(0), dec!(50000)));
//! rates.insert(dec!(0.26), Bracket::above(dec!(50000)));
//!
//! // 0.15 * 50000 + 0.26 * 20000
//! assert_eq!(rates.apply(dec!(70000)), dec!(12700));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors describing a malformed bracket.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    /// The upper bound is below the lower bound.
    #[error("upper bound {upper} is below lower bound {lower}")]
    UpperBelowLower { lower: Decimal, upper: Decimal },

    /// The bracket is the degenerate `[0, 0]` range.
    #[error("bracket spans no amounts")]
    Empty,
}

/// Errors describing a malformed bracket schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// A bracket within the schedule failed validation, keyed by its rate.
    #[error("bracket at rate {rate}: {reason}")]
    InvalidBracket { rate: Decimal, reason: BracketError },
}

/// A range of amounts a single rate applies to.
///
/// `upper` of `None` means the bracket is unbounded above, as in the top
/// bracket of a progressive schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
}

impl Bracket {
    /// A bracket covering `[lower, upper]`.
    pub fn between(
        lower: Decimal,
        upper: Decimal,
    ) -> Self {
        Self {
            lower,
            upper: Some(upper),
        }
    }

    /// A bracket covering everything from `lower` upward.
    pub fn above(lower: Decimal) -> Self {
        Self { lower, upper: None }
    }

    /// Checks that the bounds describe a usable range.
    pub fn validate(&self) -> Result<(), BracketError> {
        if let Some(upper) = self.upper {
            if upper < self.lower {
                return Err(BracketError::UpperBelowLower {
                    lower: self.lower,
                    upper,
                });
            }
            if self.lower.is_zero() && upper.is_zero() {
                return Err(BracketError::Empty);
            }
        }
        Ok(())
    }

    /// The portion of `amount` that falls inside this bracket.
    pub fn amount_within(&self, amount: Decimal) -> Decimal {
        if amount <= self.lower {
            return Decimal::ZERO;
        }
        match self.upper {
            Some(upper) if amount >= upper => upper - self.lower,
            _ => amount - self.lower,
        }
    }
}

/// A rate-keyed collection of brackets.
///
/// One bracket per rate. No ordering or contiguity is required: brackets may
/// overlap or leave gaps, and overlapping brackets are additive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedBrackets(BTreeMap<Decimal, Bracket>);

impl WeightedBrackets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bracket` under `rate`, replacing any bracket already at
    /// that rate.
    pub fn insert(
        &mut self,
        rate: Decimal,
        bracket: Bracket,
    ) -> Option<Bracket> {
        self.0.insert(rate, bracket)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks every bracket in the schedule.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for (rate, bracket) in &self.0 {
            bracket
                .validate()
                .map_err(|reason| ScheduleError::InvalidBracket {
                    rate: *rate,
                    reason,
                })?;
        }
        Ok(())
    }

    /// Slices `amount` across every bracket and sums `rate × slice`.
    pub fn apply(&self, amount: Decimal) -> Decimal {
        self.0
            .iter()
            .map(|(rate, bracket)| *rate * bracket.amount_within(amount))
            .sum()
    }
}

impl FromIterator<(Decimal, Bracket)> for WeightedBrackets {
    fn from_iter<I: IntoIterator<Item = (Decimal, Bracket)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
