//! The single-jurisdiction tax calculator and its credit-consumption
//! algorithm.
//!
//! A [`Calculator`] binds one [`Formula`], one [`ContraFormula`] and one
//! income provider. `tax_payable` computes gross tax, generates credits,
//! merges them with credits carried over from an earlier call, and consumes
//! the pool against the liability in priority order.
//!
//! # Consumption rules
//!
//! Credits are consumed in priority order (the creditor's position in the
//! contra-formula). Per credit:
//!
//! - `CanCarryForward` with no liability left: untouched, it fully carries
//!   forward.
//! - `NotCarryForward` with no liability left: zeroed, it is forfeited.
//! - `Cashable`, or liability covers the full amount: fully consumed;
//!   cashable credits may drive the result negative (a refund).
//! - Otherwise the credit is partially consumed down to the liability; a
//!   `NotCarryForward` residual is then forfeited. This branch zeroes the
//!   remaining liability, so it fires at most once per call.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use rust_decimal::Decimal;
//! use rust_decimal_macros::dec;
//! use cantax_core::calc::{CalcConfig, Calculator, ConstCreditor, ContraFormula, Formula};
//! use cantax_core::finance::{Financer, IncomeCalculator, NoFinances};
//! use cantax_core::models::{Bracket, CreditRule, CreditUsage, Region, WeightedBrackets};
//!
//! #[derive(Debug)]
//! struct FixedIncome(Decimal);
//!
//! impl IncomeCalculator for FixedIncome {
//!     fn net_income(&self) -> Decimal {
//!         self.0
//!     }
//!     fn set_finances(&mut self, _finances: Rc<dyn Financer>) {}
//! }
//!
//! let mut rates = WeightedBrackets::new();
//! rates.insert(dec!(0.15), Bracket::between(dec!(0), dec!(50000)));
//! rates.insert(dec!(0.26), Bracket::above(dec!(50000)));
//!
//! let config = CalcConfig {
//!     income_calc: Box::new(FixedIncome(dec!(70000))),
//!     tax_formula: Formula::new(2025, Region::Federal, rates),
//!     contra_formula: ContraFormula::new(
//!         2025,
//!         Region::Federal,
//!         vec![Box::new(ConstCreditor {
//!             amount: dec!(15000),
//!             rule: CreditRule::new("refundable-abatement", CreditUsage::Cashable),
//!         })],
//!     ),
//! };
//!
//! let mut calculator = Calculator::new(config).unwrap();
//! calculator.set_finances(None); // install the no-data object
//! let (net_tax, _leftovers) = calculator.tax_payable();
//!
//! // 12700 gross, 15000 cashable credit: a 2300 refund.
//! assert_eq!(net_tax, dec!(-2300));
//! ```

use std::rc::Rc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calc::contra::{ContraError, ContraFormula};
use crate::calc::formula::Formula;
use crate::finance::{Financer, IncomeCalculator, NoFinances, Person};
use crate::models::{CalculatorId, Credit, CreditUsage, Region, ScheduleError, TaxPayer};

/// Errors rejecting a calculator configuration.
///
/// Raised at construction only; a correctly constructed calculator never
/// fails at evaluation time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The tax formula's bracket schedule is malformed.
    #[error("tax formula: {0}")]
    InvalidFormula(ScheduleError),

    /// The contra-formula's creditor list is malformed.
    #[error("contra-formula: {0}")]
    InvalidContraFormula(ContraError),

    /// Formula and contra-formula are configured for different tax years.
    #[error("tax formula is for year {formula}, contra-formula for year {contra}")]
    TaxYearMismatch { formula: i32, contra: i32 },

    /// Formula and contra-formula are configured for different regions.
    #[error("tax formula is for region {formula}, contra-formula for region {contra}")]
    RegionMismatch { formula: Region, contra: Region },
}

/// Everything needed to construct a [`Calculator`].
#[derive(Debug)]
pub struct CalcConfig {
    pub income_calc: Box<dyn IncomeCalculator>,
    pub tax_formula: Formula,
    pub contra_formula: ContraFormula,
}

/// Computes net payable tax for one jurisdiction.
///
/// Not safe for concurrent use: `tax_payable` both reads and rewrites the
/// owned-credit list. One instance serves one tax run at a time.
#[derive(Debug)]
pub struct Calculator {
    id: CalculatorId,
    formula: Formula,
    contra_formula: ContraFormula,
    income_calc: Box<dyn IncomeCalculator>,
    finances: Option<Rc<dyn Financer>>,
    spouse_finances: Option<Rc<dyn Financer>>,
    dependents: Vec<Person>,
    credits: Vec<Credit>,
}

impl Calculator {
    /// Builds a calculator, rejecting inconsistent configuration.
    ///
    /// Checks, in order: formula validity, contra-formula validity, tax-year
    /// agreement, region agreement. Taking the config by value gives the
    /// calculator sole ownership of its formulas; later changes to anything
    /// the caller kept cannot leak in.
    pub fn new(config: CalcConfig) -> Result<Self, ConfigError> {
        config
            .tax_formula
            .validate()
            .map_err(ConfigError::InvalidFormula)?;
        config
            .contra_formula
            .validate()
            .map_err(ConfigError::InvalidContraFormula)?;
        if config.tax_formula.tax_year() != config.contra_formula.tax_year() {
            return Err(ConfigError::TaxYearMismatch {
                formula: config.tax_formula.tax_year(),
                contra: config.contra_formula.tax_year(),
            });
        }
        if config.tax_formula.region() != config.contra_formula.region() {
            return Err(ConfigError::RegionMismatch {
                formula: config.tax_formula.region(),
                contra: config.contra_formula.region(),
            });
        }

        Ok(Self {
            id: CalculatorId::next(),
            formula: config.tax_formula,
            contra_formula: config.contra_formula,
            income_calc: config.income_calc,
            finances: None,
            spouse_finances: None,
            dependents: Vec::new(),
            credits: Vec::new(),
        })
    }

    pub fn id(&self) -> CalculatorId {
        self.id
    }

    pub fn tax_year(&self) -> i32 {
        self.formula.tax_year()
    }

    pub fn region(&self) -> Region {
        self.formula.region()
    }

    /// Installs the taxpayer's finances and forwards them to the income
    /// provider. `None` installs the no-data object rather than erroring.
    pub fn set_finances(&mut self, finances: Option<Rc<dyn Financer>>) {
        let finances = finances.unwrap_or_else(|| Rc::new(NoFinances) as Rc<dyn Financer>);
        self.income_calc.set_finances(Rc::clone(&finances));
        self.finances = Some(finances);
    }

    /// Installs the spouse's finances, or removes them.
    pub fn set_spouse_finances(&mut self, finances: Option<Rc<dyn Financer>>) {
        self.spouse_finances = finances;
    }

    pub fn set_dependents(&mut self, dependents: &[Person]) {
        self.dependents = dependents.to_vec();
    }

    /// Installs carried-over credits for the next `tax_payable` call.
    ///
    /// Only credits this calculator produced are kept; credits owned by
    /// another calculator, or never owned at all, are silently dropped. The
    /// kept credits are cloned, never aliased.
    pub fn set_credits(&mut self, credits: &[Credit]) {
        self.credits = credits
            .iter()
            .filter(|credit| credit.owner() == Some(self.id))
            .cloned()
            .collect();
    }

    /// Computes net payable tax and the credits left over after consumption.
    ///
    /// The returned credits carry their post-consumption amounts; the
    /// internal owned list is emptied, and feeding leftovers back into a
    /// later call is the caller's decision via [`Calculator::set_credits`].
    pub fn tax_payable(&mut self) -> (Decimal, Vec<Credit>) {
        let taxpayer = self.taxpayer_snapshot();
        let gross_tax = self.formula.apply(taxpayer.net_income);
        debug!(
            year = self.tax_year(),
            region = %self.region(),
            net_income = %taxpayer.net_income,
            gross_tax = %gross_tax,
            "computed gross tax",
        );

        let mut new_credits = self.contra_formula.apply(&taxpayer);
        for credit in &mut new_credits {
            credit.set_owner(self.id);
        }

        // Owned credits from a previous cycle go first, then fresh ones.
        let mut pool = std::mem::take(&mut self.credits);
        pool.extend(new_credits);
        // Consumption assumes priority order; sorting here keeps that a
        // calculator-internal concern rather than a caller obligation.
        self.contra_formula.filter_and_sort(&mut pool);

        let net_tax = consume(gross_tax, &mut pool);
        debug!(net_tax = %net_tax, leftover_credits = pool.len(), "consumed credits");
        (net_tax, pool)
    }

    /// Builds the read-only taxpayer view handed to the contra-formula.
    fn taxpayer_snapshot(&mut self) -> TaxPayer {
        let net_income = self.income_calc.net_income();
        let spouse_net_income = self.spouse_net_income();
        TaxPayer {
            finances: self.finances.clone(),
            net_income,
            spouse_finances: self.spouse_finances.clone(),
            spouse_net_income,
            dependents: self.dependents.clone(),
        }
    }

    /// Net income of the spouse, computed by pointing the shared income
    /// provider at the spouse finances and restoring afterwards.
    fn spouse_net_income(&mut self) -> Option<Decimal> {
        let spouse_finances = self.spouse_finances.clone()?;
        self.income_calc.set_finances(spouse_finances);
        let net_income = self.income_calc.net_income();

        let own: Rc<dyn Financer> = match &self.finances {
            Some(finances) => Rc::clone(finances),
            None => Rc::new(NoFinances),
        };
        self.income_calc.set_finances(own);
        Some(net_income)
    }
}

/// Consumes `credits` against `gross_tax` in list order and returns the
/// remaining tax.
fn consume(
    gross_tax: Decimal,
    credits: &mut [Credit],
) -> Decimal {
    let mut remaining = gross_tax;
    for credit in credits.iter_mut() {
        let amount = credit.amount();
        let usage = credit.rule().usage;
        match usage {
            CreditUsage::CanCarryForward if remaining <= Decimal::ZERO => {
                // Nothing left to offset; the credit carries forward whole.
            }
            CreditUsage::NotCarryForward if remaining <= Decimal::ZERO => {
                warn!(
                    source = %credit.rule().source,
                    amount = %amount,
                    "credit forfeited: no liability left and it cannot carry forward",
                );
                credit.set_amount(Decimal::ZERO);
            }
            _ if usage == CreditUsage::Cashable || remaining >= amount => {
                remaining -= amount;
                credit.set_amount(Decimal::ZERO);
            }
            _ => {
                // Partial consumption. Remaining hits zero here, so this
                // branch fires at most once per call.
                credit.set_amount(amount - remaining);
                remaining = Decimal::ZERO;
                if usage == CreditUsage::NotCarryForward {
                    credit.set_amount(Decimal::ZERO);
                }
            }
        }
    }
    remaining
}
