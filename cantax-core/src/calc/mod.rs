//! The tax liability and credit-consumption engine.
//!
//! [`Formula`] turns net income into gross tax; [`ContraFormula`] turns a
//! taxpayer's data into credits; [`Calculator`] binds the two with an income
//! provider and consumes the credits against the liability; [`Aggregator`]
//! combines several same-year calculators into one payable-tax result.

mod aggregator;
mod calculator;
mod contra;
mod formula;

pub use aggregator::{Aggregator, AggregatorError};
pub use calculator::{CalcConfig, Calculator, ConfigError};
pub use contra::{
    ConstCreditor, ContraError, ContraFormula, Creditor, SpouseAllowanceCreditor, WeightedCreditor,
};
pub use formula::Formula;
