//! Tax credits and the rules governing how they are spent.
//!
//! A [`Credit`] is produced by a contra-formula during one evaluation and
//! consumed against computed tax by the calculator that produced it. The
//! producing calculator stamps each credit with its [`CalculatorId`]; a
//! calculator never touches a credit owned by another instance.

use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Region;

/// How a credit may be spent against computed tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditUsage {
    /// May reduce tax below zero, producing a refund.
    Cashable,
    /// The unused portion survives to a future tax period.
    CanCarryForward,
    /// The unused portion is lost at the end of the period.
    NotCarryForward,
}

/// Identifies what a credit is and how it may be spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRule {
    pub source: String,
    pub usage: CreditUsage,
}

impl CreditRule {
    pub fn new(
        source: impl Into<String>,
        usage: CreditUsage,
    ) -> Self {
        Self {
            source: source.into(),
            usage,
        }
    }
}

/// Opaque identity of a calculator instance, used to tag credit ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalculatorId(u64);

impl CalculatorId {
    /// Draws a fresh, process-unique id.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A single tax credit.
///
/// The amount only ever moves toward zero, and only inside
/// `Calculator::tax_payable` of the owning calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    amount: Decimal,
    rule: CreditRule,
    owner: Option<CalculatorId>,
    tax_year: i32,
    region: Region,
    finances_version: u64,
}

impl Credit {
    pub(crate) fn new(
        amount: Decimal,
        rule: CreditRule,
        tax_year: i32,
        region: Region,
        finances_version: u64,
    ) -> Self {
        Self {
            amount,
            rule,
            owner: None,
            tax_year,
            region,
            finances_version,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn rule(&self) -> &CreditRule {
        &self.rule
    }

    pub fn owner(&self) -> Option<CalculatorId> {
        self.owner
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Version of the finances the credit was generated from.
    pub fn finances_version(&self) -> u64 {
        self.finances_version
    }

    pub(crate) fn set_owner(&mut self, owner: CalculatorId) {
        self.owner = Some(owner);
    }

    pub(crate) fn set_amount(&mut self, amount: Decimal) {
        self.amount = amount;
    }
}
