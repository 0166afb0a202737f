//! Combines same-year calculators into one payable-tax figure.

use std::rc::Rc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calc::calculator::Calculator;
use crate::finance::{Financer, Person};
use crate::models::{Credit, Region};

/// The minimum number of calculators an aggregation makes sense for.
const MIN_CALCULATORS: usize = 2;

/// Errors rejecting an aggregator configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    /// Fewer calculators than an aggregation requires.
    #[error("aggregation requires at least {min} calculators, got {got}")]
    TooFewCalculators { min: usize, got: usize },

    /// Member calculators are configured for different tax years.
    #[error("calculators span tax years {first} and {other}; members must share one year")]
    MultipleTaxYears { first: i32, other: i32 },
}

/// Runs several single-jurisdiction calculators (e.g. federal plus
/// provincial) as one unit.
///
/// Setters fan out to every member, so all members evaluate the same
/// finances, spouse, dependents and credit pool; each member still keeps
/// only the credits it owns.
#[derive(Debug)]
pub struct Aggregator {
    calculators: Vec<Calculator>,
}

impl Aggregator {
    /// Builds an aggregator over at least two same-year calculators.
    pub fn new(calculators: Vec<Calculator>) -> Result<Self, AggregatorError> {
        if calculators.len() < MIN_CALCULATORS {
            return Err(AggregatorError::TooFewCalculators {
                min: MIN_CALCULATORS,
                got: calculators.len(),
            });
        }
        let first = calculators[0].tax_year();
        if let Some(odd) = calculators.iter().find(|c| c.tax_year() != first) {
            return Err(AggregatorError::MultipleTaxYears {
                first,
                other: odd.tax_year(),
            });
        }
        Ok(Self { calculators })
    }

    /// The tax year every member is configured for.
    pub fn tax_year(&self) -> i32 {
        self.calculators[0].tax_year()
    }

    /// The regions of the members, in member order.
    pub fn regions(&self) -> Vec<Region> {
        self.calculators.iter().map(Calculator::region).collect()
    }

    pub fn set_finances(&mut self, finances: Option<Rc<dyn Financer>>) {
        for calculator in &mut self.calculators {
            calculator.set_finances(finances.clone());
        }
    }

    pub fn set_spouse_finances(&mut self, finances: Option<Rc<dyn Financer>>) {
        for calculator in &mut self.calculators {
            calculator.set_spouse_finances(finances.clone());
        }
    }

    pub fn set_dependents(&mut self, dependents: &[Person]) {
        for calculator in &mut self.calculators {
            calculator.set_dependents(dependents);
        }
    }

    /// Offers the credits to every member; each keeps only its own.
    pub fn set_credits(&mut self, credits: &[Credit]) {
        for calculator in &mut self.calculators {
            calculator.set_credits(credits);
        }
    }

    /// Sums each member's net tax and concatenates their leftover credits.
    ///
    /// Leftovers come back in member order, each member's own order
    /// preserved.
    pub fn tax_payable(&mut self) -> (Decimal, Vec<Credit>) {
        let mut total = Decimal::ZERO;
        let mut leftovers = Vec::new();
        for calculator in &mut self.calculators {
            let (tax, credits) = calculator.tax_payable();
            debug!(region = %calculator.region(), tax = %tax, "aggregated member tax");
            total += tax;
            leftovers.extend(credits);
        }
        (total, leftovers)
    }
}
