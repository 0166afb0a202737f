//! Credit-generating strategies and the ordered collection that runs them.
//!
//! A [`ContraFormula`] is the mirror image of a tax formula: where the
//! formula turns net income into a liability, the contra-formula turns a
//! taxpayer's data into credits that offset it. Creditor order matters — a
//! creditor's position in the list is its consumption priority.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::finance::FinancialSource;
use crate::models::{Credit, CreditRule, Region, TaxPayer};

/// Errors describing a misconfigured contra-formula.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContraError {
    /// Two creditors registered the same credit source.
    #[error("credit source {0:?} is registered by more than one creditor")]
    DuplicateCreditSource(String),
}

/// A strategy producing a single credit amount for a taxpayer.
pub trait Creditor: fmt::Debug {
    /// The credit amount this strategy grants the given taxpayer.
    fn tax_credit(&self, taxpayer: &TaxPayer) -> Decimal;

    /// The rule describing what the credit is and how it may be spent.
    fn rule(&self) -> &CreditRule;

    /// A value-independent copy with no shared mutable state.
    fn clone_boxed(&self) -> Box<dyn Creditor>;
}

impl Clone for Box<dyn Creditor> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Grants a fixed amount regardless of the taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstCreditor {
    pub amount: Decimal,
    pub rule: CreditRule,
}

impl Creditor for ConstCreditor {
    fn tax_credit(&self, _taxpayer: &TaxPayer) -> Decimal {
        self.amount
    }

    fn rule(&self) -> &CreditRule {
        &self.rule
    }

    fn clone_boxed(&self) -> Box<dyn Creditor> {
        Box::new(self.clone())
    }
}

/// Grants a weighted proportion of the amounts in named financial sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedCreditor {
    pub weight: Decimal,
    pub sources: Vec<FinancialSource>,
    pub rule: CreditRule,
}

impl Creditor for WeightedCreditor {
    fn tax_credit(&self, taxpayer: &TaxPayer) -> Decimal {
        match &taxpayer.finances {
            Some(finances) => self.weight * finances.total_amount(&self.sources),
            None => Decimal::ZERO,
        }
    }

    fn rule(&self) -> &CreditRule {
        &self.rule
    }

    fn clone_boxed(&self) -> Box<dyn Creditor> {
        Box::new(self.clone())
    }
}

/// Grants the spousal allowance to the higher-earning partner.
///
/// The credit is `weight × max(0, base_amount − spouse net income)`, claimed
/// only when a spouse exists and the taxpayer earns at least as much as the
/// spouse. A tie goes to the calling taxpayer, never to both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseAllowanceCreditor {
    pub weight: Decimal,
    pub base_amount: Decimal,
    pub rule: CreditRule,
}

impl Creditor for SpouseAllowanceCreditor {
    fn tax_credit(&self, taxpayer: &TaxPayer) -> Decimal {
        let Some(spouse_net_income) = taxpayer.spouse_net_income else {
            return Decimal::ZERO;
        };
        if taxpayer.net_income < spouse_net_income {
            // The spouse is the higher earner and claims it instead.
            return Decimal::ZERO;
        }
        self.weight * (self.base_amount - spouse_net_income).max(Decimal::ZERO)
    }

    fn rule(&self) -> &CreditRule {
        &self.rule
    }

    fn clone_boxed(&self) -> Box<dyn Creditor> {
        Box::new(self.clone())
    }
}

/// An ordered collection of creditors for one year and region.
#[derive(Debug, Clone)]
pub struct ContraFormula {
    tax_year: i32,
    region: Region,
    creditors: Vec<Box<dyn Creditor>>,
}

impl ContraFormula {
    pub fn new(
        tax_year: i32,
        region: Region,
        creditors: Vec<Box<dyn Creditor>>,
    ) -> Self {
        Self {
            tax_year,
            region,
            creditors,
        }
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Checks that no two creditors share a credit source.
    pub fn validate(&self) -> Result<(), ContraError> {
        let mut seen = HashSet::new();
        for creditor in &self.creditors {
            let source = &creditor.rule().source;
            if !seen.insert(source.clone()) {
                return Err(ContraError::DuplicateCreditSource(source.clone()));
            }
        }
        Ok(())
    }

    /// Runs every creditor in list order and returns the resulting credits.
    ///
    /// Returns no credits when the taxpayer has no finances. A creditor
    /// granting exactly zero is dropped rather than materialized.
    pub fn apply(&self, taxpayer: &TaxPayer) -> Vec<Credit> {
        let Some(finances) = &taxpayer.finances else {
            return Vec::new();
        };
        let finances_version = finances.version();

        let mut credits = Vec::with_capacity(self.creditors.len());
        for creditor in &self.creditors {
            let amount = creditor.tax_credit(taxpayer);
            if amount.is_zero() {
                trace!(source = %creditor.rule().source, "dropped zero credit");
                continue;
            }
            credits.push(Credit::new(
                amount,
                creditor.rule().clone(),
                self.tax_year,
                self.region,
                finances_version,
            ));
        }
        credits
    }

    /// Keeps only credits from recognized sources and orders them by
    /// consumption priority.
    ///
    /// Priority is the creditor's position in this contra-formula's list;
    /// earlier creditors are applied first. The sort is stable, so credits
    /// sharing a source keep their relative input order.
    pub fn filter_and_sort(&self, credits: &mut Vec<Credit>) {
        let priority: HashMap<&str, usize> = self
            .creditors
            .iter()
            .enumerate()
            .map(|(position, creditor)| (creditor.rule().source.as_str(), position))
            .collect();

        credits.retain(|credit| priority.contains_key(credit.rule().source.as_str()));
        credits.sort_by_key(|credit| priority[credit.rule().source.as_str()]);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::finance::Financer;
    use crate::models::CreditUsage;

    /// A financer answering a fixed amount for every queried source.
    #[derive(Debug)]
    struct FlatFinances {
        per_source: Decimal,
        version: u64,
    }

    impl Financer for FlatFinances {
        fn total_amount(&self, sources: &[FinancialSource]) -> Decimal {
            self.per_source * Decimal::from(sources.len() as i64)
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
            self.version
        }
    }

    fn taxpayer_with(per_source: Decimal) -> TaxPayer {
        TaxPayer {
            finances: Some(Rc::new(FlatFinances {
                per_source,
                version: 7,
            })),
            net_income: dec!(70000),
            spouse_finances: None,
            spouse_net_income: None,
            dependents: Vec::new(),
        }
    }

    fn const_creditor(
        source: &str,
        amount: Decimal,
    ) -> Box<dyn Creditor> {
        Box::new(ConstCreditor {
            amount,
            rule: CreditRule::new(source, CreditUsage::NotCarryForward),
        })
    }

    // =========================================================================
    // Creditor variants
    // =========================================================================

    #[test]
    fn const_creditor_ignores_the_taxpayer() {
        let creditor = ConstCreditor {
            amount: dec!(1721),
            rule: CreditRule::new("basic-amount", CreditUsage::NotCarryForward),
        };

        assert_eq!(creditor.tax_credit(&taxpayer_with(dec!(0))), dec!(1721));
    }

    #[test]
    fn weighted_creditor_scales_source_total() {
        let creditor = WeightedCreditor {
            weight: dec!(0.15),
            sources: vec![FinancialSource::TuitionFee],
            rule: CreditRule::new("tuition", CreditUsage::CanCarryForward),
        };

        assert_eq!(creditor.tax_credit(&taxpayer_with(dec!(8000))), dec!(1200));
    }

    #[test]
    fn weighted_creditor_without_finances_grants_nothing() {
        let creditor = WeightedCreditor {
            weight: dec!(0.15),
            sources: vec![FinancialSource::TuitionFee],
            rule: CreditRule::new("tuition", CreditUsage::CanCarryForward),
        };
        let mut taxpayer = taxpayer_with(dec!(8000));
        taxpayer.finances = None;

        assert_eq!(creditor.tax_credit(&taxpayer), dec!(0));
    }

    #[test]
    fn spouse_creditor_pays_the_higher_earner() {
        let creditor = SpouseAllowanceCreditor {
            weight: dec!(0.15),
            base_amount: dec!(12000),
            rule: CreditRule::new("spousal-amount", CreditUsage::NotCarryForward),
        };
        let mut taxpayer = taxpayer_with(dec!(0));
        taxpayer.spouse_net_income = Some(dec!(4000));

        // 0.15 * (12000 - 4000)
        assert_eq!(creditor.tax_credit(&taxpayer), dec!(1200));
    }

    #[test]
    fn spouse_creditor_without_spouse_grants_nothing() {
        let creditor = SpouseAllowanceCreditor {
            weight: dec!(0.15),
            base_amount: dec!(12000),
            rule: CreditRule::new("spousal-amount", CreditUsage::NotCarryForward),
        };

        assert_eq!(creditor.tax_credit(&taxpayer_with(dec!(0))), dec!(0));
    }

    #[test]
    fn spouse_creditor_lower_earner_grants_nothing() {
        let creditor = SpouseAllowanceCreditor {
            weight: dec!(0.15),
            base_amount: dec!(12000),
            rule: CreditRule::new("spousal-amount", CreditUsage::NotCarryForward),
        };
        let mut taxpayer = taxpayer_with(dec!(0));
        taxpayer.net_income = dec!(30000);
        taxpayer.spouse_net_income = Some(dec!(45000));

        assert_eq!(creditor.tax_credit(&taxpayer), dec!(0));
    }

    #[test]
    fn spouse_creditor_tie_goes_to_the_caller() {
        let creditor = SpouseAllowanceCreditor {
            weight: dec!(0.15),
            base_amount: dec!(12000),
            rule: CreditRule::new("spousal-amount", CreditUsage::NotCarryForward),
        };
        let mut taxpayer = taxpayer_with(dec!(0));
        taxpayer.net_income = dec!(10000);
        taxpayer.spouse_net_income = Some(dec!(10000));

        // 0.15 * (12000 - 10000)
        assert_eq!(creditor.tax_credit(&taxpayer), dec!(300));
    }

    #[test]
    fn spouse_creditor_caps_allowance_at_zero() {
        let creditor = SpouseAllowanceCreditor {
            weight: dec!(0.15),
            base_amount: dec!(12000),
            rule: CreditRule::new("spousal-amount", CreditUsage::NotCarryForward),
        };
        let mut taxpayer = taxpayer_with(dec!(0));
        taxpayer.net_income = dec!(70000);
        taxpayer.spouse_net_income = Some(dec!(50000));

        assert_eq!(creditor.tax_credit(&taxpayer), dec!(0));
    }

    // =========================================================================
    // ContraFormula::validate
    // =========================================================================

    #[test]
    fn validate_accepts_distinct_sources() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![
                const_creditor("basic-amount", dec!(1721)),
                const_creditor("age-amount", dec!(500)),
            ],
        );

        assert_eq!(contra.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_duplicate_sources() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![
                const_creditor("basic-amount", dec!(1721)),
                const_creditor("basic-amount", dec!(500)),
            ],
        );

        assert_eq!(
            contra.validate(),
            Err(ContraError::DuplicateCreditSource("basic-amount".into()))
        );
    }

    // =========================================================================
    // ContraFormula::apply
    // =========================================================================

    #[test]
    fn apply_tags_credits_with_rule_year_region_and_version() {
        let contra = ContraFormula::new(
            2025,
            Region::Ontario,
            vec![const_creditor("basic-amount", dec!(1721))],
        );

        let credits = contra.apply(&taxpayer_with(dec!(0)));

        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].amount(), dec!(1721));
        assert_eq!(credits[0].rule().source, "basic-amount");
        assert_eq!(credits[0].tax_year(), 2025);
        assert_eq!(credits[0].region(), Region::Ontario);
        assert_eq!(credits[0].finances_version(), 7);
        assert_eq!(credits[0].owner(), None);
    }

    #[test]
    fn apply_without_finances_generates_nothing() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![const_creditor("basic-amount", dec!(1721))],
        );
        let mut taxpayer = taxpayer_with(dec!(0));
        taxpayer.finances = None;

        assert_eq!(contra.apply(&taxpayer), Vec::new());
    }

    #[test]
    fn apply_drops_exact_zero_credits() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![
                const_creditor("basic-amount", dec!(1721)),
                const_creditor("age-amount", dec!(0)),
            ],
        );

        let credits = contra.apply(&taxpayer_with(dec!(0)));

        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].rule().source, "basic-amount");
    }

    #[test]
    fn apply_preserves_creditor_order() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![
                const_creditor("first", dec!(1)),
                const_creditor("second", dec!(2)),
                const_creditor("third", dec!(3)),
            ],
        );

        let credits = contra.apply(&taxpayer_with(dec!(0)));
        let sources: Vec<_> = credits.iter().map(|c| c.rule().source.clone()).collect();

        assert_eq!(sources, vec!["first", "second", "third"]);
    }

    // =========================================================================
    // ContraFormula::filter_and_sort
    // =========================================================================

    #[test]
    fn filter_and_sort_orders_by_creditor_position() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![
                const_creditor("first", dec!(1)),
                const_creditor("second", dec!(2)),
            ],
        );
        let mut credits = contra.apply(&taxpayer_with(dec!(0)));
        credits.reverse();

        contra.filter_and_sort(&mut credits);
        let sources: Vec<_> = credits.iter().map(|c| c.rule().source.clone()).collect();

        assert_eq!(sources, vec!["first", "second"]);
    }

    #[test]
    fn filter_and_sort_drops_unrecognized_sources() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![const_creditor("basic-amount", dec!(1721))],
        );
        let other = ContraFormula::new(
            2025,
            Region::Federal,
            vec![const_creditor("foreign-amount", dec!(99))],
        );

        let mut credits = contra.apply(&taxpayer_with(dec!(0)));
        credits.extend(other.apply(&taxpayer_with(dec!(0))));
        contra.filter_and_sort(&mut credits);

        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].rule().source, "basic-amount");
    }

    #[test]
    fn filter_and_sort_is_stable_for_duplicate_sources() {
        let contra = ContraFormula::new(
            2025,
            Region::Federal,
            vec![
                const_creditor("carried", dec!(500)),
                const_creditor("basic-amount", dec!(1721)),
            ],
        );

        // Two credits sharing a source, e.g. one carried over and one fresh.
        let mut credits = contra.apply(&taxpayer_with(dec!(0)));
        credits.extend(contra.apply(&taxpayer_with(dec!(0))));
        contra.filter_and_sort(&mut credits);

        let amounts: Vec<_> = credits.iter().map(Credit::amount).collect();
        assert_eq!(amounts, vec![dec!(500), dec!(500), dec!(1721), dec!(1721)]);
    }
}
