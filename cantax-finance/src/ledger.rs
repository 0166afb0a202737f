//! An in-memory ledger of an individual's raw financial amounts.

use std::collections::{HashMap, HashSet};

use cantax_core::finance::{Financer, FinancialSource, SourceKind};
use rust_decimal::Decimal;

/// Per-source amounts for one individual, split across the income,
/// deduction and miscellaneous ledgers.
///
/// Every write bumps the version counter. The counter is optimistic
/// tracking only; nothing here synchronizes concurrent access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndividualFinances {
    version: u64,
    income: HashMap<FinancialSource, Decimal>,
    deductions: HashMap<FinancialSource, Decimal>,
    misc: HashMap<FinancialSource, Decimal>,
}

impl IndividualFinances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the running total of `source`.
    pub fn add_amount(
        &mut self,
        source: FinancialSource,
        amount: Decimal,
    ) {
        *self.store_mut(source).entry(source).or_default() += amount;
        self.version += 1;
    }

    /// Overwrites the total of `source`.
    pub fn set_amount(
        &mut self,
        source: FinancialSource,
        amount: Decimal,
    ) {
        self.store_mut(source).insert(source, amount);
        self.version += 1;
    }

    /// Removes all data for `source`. A no-op (and no version bump) when the
    /// source has no data.
    pub fn remove(&mut self, source: FinancialSource) {
        if self.store_mut(source).remove(&source).is_some() {
            self.version += 1;
        }
    }

    fn store_mut(
        &mut self,
        source: FinancialSource,
    ) -> &mut HashMap<FinancialSource, Decimal> {
        match source.kind() {
            SourceKind::Income => &mut self.income,
            SourceKind::Deduction => &mut self.deductions,
            SourceKind::Misc => &mut self.misc,
        }
    }

    fn store(
        &self,
        source: FinancialSource,
    ) -> &HashMap<FinancialSource, Decimal> {
        match source.kind() {
            SourceKind::Income => &self.income,
            SourceKind::Deduction => &self.deductions,
            SourceKind::Misc => &self.misc,
        }
    }
}

impl Financer for IndividualFinances {
    fn total_amount(&self, sources: &[FinancialSource]) -> Decimal {
        sources
            .iter()
            .map(|source| {
                self.store(*source)
                    .get(source)
                    .copied()
                    .unwrap_or_default()
            })
            .sum()
    }

    fn income_sources(&self) -> HashSet<FinancialSource> {
        self.income.keys().copied().collect()
    }

    fn deduction_sources(&self) -> HashSet<FinancialSource> {
        self.deductions.keys().copied().collect()
    }

    fn misc_sources(&self) -> HashSet<FinancialSource> {
        self.misc.keys().copied().collect()
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn add_amount_accumulates() {
        let mut finances = IndividualFinances::new();
        finances.add_amount(FinancialSource::EarnedIncome, dec!(40000));
        finances.add_amount(FinancialSource::EarnedIncome, dec!(30000));

        assert_eq!(
            finances.total_amount(&[FinancialSource::EarnedIncome]),
            dec!(70000)
        );
    }

    #[test]
    fn total_amount_spans_multiple_sources() {
        let mut finances = IndividualFinances::new();
        finances.add_amount(FinancialSource::EarnedIncome, dec!(40000));
        finances.add_amount(FinancialSource::InterestIncome, dec!(500));

        assert_eq!(
            finances.total_amount(&[
                FinancialSource::EarnedIncome,
                FinancialSource::InterestIncome,
            ]),
            dec!(40500)
        );
    }

    #[test]
    fn total_amount_of_absent_source_is_zero() {
        let finances = IndividualFinances::new();

        assert_eq!(
            finances.total_amount(&[FinancialSource::CapitalGains]),
            dec!(0)
        );
    }

    #[test]
    fn sources_are_routed_by_kind() {
        let mut finances = IndividualFinances::new();
        finances.add_amount(FinancialSource::EarnedIncome, dec!(40000));
        finances.add_amount(FinancialSource::RrspContribution, dec!(5000));
        finances.add_amount(FinancialSource::TuitionFee, dec!(8000));

        assert_eq!(
            finances.income_sources(),
            [FinancialSource::EarnedIncome].into_iter().collect()
        );
        assert_eq!(
            finances.deduction_sources(),
            [FinancialSource::RrspContribution].into_iter().collect()
        );
        assert_eq!(
            finances.misc_sources(),
            [FinancialSource::TuitionFee].into_iter().collect()
        );
    }

    #[test]
    fn every_write_bumps_the_version() {
        let mut finances = IndividualFinances::new();
        assert_eq!(finances.version(), 0);

        finances.add_amount(FinancialSource::EarnedIncome, dec!(40000));
        assert_eq!(finances.version(), 1);

        finances.set_amount(FinancialSource::EarnedIncome, dec!(50000));
        assert_eq!(finances.version(), 2);

        finances.remove(FinancialSource::EarnedIncome);
        assert_eq!(finances.version(), 3);
    }

    #[test]
    fn removing_an_absent_source_keeps_the_version() {
        let mut finances = IndividualFinances::new();
        finances.remove(FinancialSource::EarnedIncome);

        assert_eq!(finances.version(), 0);
    }
}
