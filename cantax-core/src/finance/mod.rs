//! Boundary contracts for financial data and income adjustment.
//!
//! The engine never does its own bookkeeping. It reads raw amounts through
//! the [`Financer`] trait and obtains net income through the
//! [`IncomeCalculator`] trait; concrete implementations live outside this
//! crate (see the `cantax-finance` crate). [`NoFinances`] is the null
//! object installed when a calculator is explicitly given no data.
//!
//! Finances are shared as `Rc<dyn Financer>`: the engine is single-threaded,
//! synchronous arithmetic, and writes to a concrete ledger require `&mut`
//! access outside any shared handle. Every write bumps the ledger's
//! [`Financer::version`] counter, which credits record as provenance.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named source of money in an individual's finances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinancialSource {
    // Income sources.
    EarnedIncome,
    InterestIncome,
    CapitalGains,
    RrspWithdrawal,
    UccbIncome,
    // Deduction sources.
    RrspContribution,
    ChildCareExpense,
    // Miscellaneous credit-bearing amounts.
    MedicalExpense,
    CharitableDonation,
    TuitionFee,
}

/// The ledger a [`FinancialSource`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Income,
    Deduction,
    Misc,
}

impl FinancialSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::EarnedIncome
            | Self::InterestIncome
            | Self::CapitalGains
            | Self::RrspWithdrawal
            | Self::UccbIncome => SourceKind::Income,
            Self::RrspContribution | Self::ChildCareExpense => SourceKind::Deduction,
            Self::MedicalExpense | Self::CharitableDonation | Self::TuitionFee => SourceKind::Misc,
        }
    }
}

/// Read access to an individual's raw financial amounts.
pub trait Financer: fmt::Debug {
    /// Total of the given sources; zero for sources with no data.
    fn total_amount(&self, sources: &[FinancialSource]) -> Decimal;

    /// The income sources with recorded amounts.
    fn income_sources(&self) -> HashSet<FinancialSource>;

    /// The deduction sources with recorded amounts.
    fn deduction_sources(&self) -> HashSet<FinancialSource>;

    /// The miscellaneous sources with recorded amounts.
    fn misc_sources(&self) -> HashSet<FinancialSource>;

    /// Monotonic counter bumped by every write to the underlying data.
    fn version(&self) -> u64;
}

/// Null object standing in for "no financial data".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFinances;

impl Financer for NoFinances {
    fn total_amount(&self, _sources: &[FinancialSource]) -> Decimal {
        Decimal::ZERO
    }

    fn income_sources(&self) -> HashSet<FinancialSource> {
        HashSet::new()
    }

    fn deduction_sources(&self) -> HashSet<FinancialSource> {
        HashSet::new()
    }

    fn misc_sources(&self) -> HashSet<FinancialSource> {
        HashSet::new()
    }

    fn version(&self) -> u64 {
        0
    }
}

/// Computes net (adjusted) income from installed finances.
///
/// Supplied fully configured to a calculator; the calculator only ever calls
/// [`IncomeCalculator::net_income`] and forwards finances changes.
pub trait IncomeCalculator: fmt::Debug {
    /// Income after adjustments for the currently installed finances.
    fn net_income(&self) -> Decimal;

    /// Installs the finances that subsequent calls compute over.
    fn set_finances(&mut self, finances: Rc<dyn Financer>);
}

/// A dependent of the taxpayer.
///
/// Opaque to the engine: it is forwarded to contra-formulas untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age_months: u32,
}
