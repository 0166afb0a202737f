//! A plain income-adjustment calculator: income minus deductions.

use std::rc::Rc;

use cantax_core::finance::{Financer, IncomeCalculator};
use rust_decimal::Decimal;

/// Computes net income as the total of all income sources minus the total
/// of all deduction sources of the installed finances.
///
/// Net income may be negative when deductions exceed income; the engine
/// never assumes otherwise.
#[derive(Debug)]
pub struct NetIncomeCalculator {
    finances: Rc<dyn Financer>,
}

impl NetIncomeCalculator {
    pub fn new(finances: Rc<dyn Financer>) -> Self {
        Self { finances }
    }
}

impl IncomeCalculator for NetIncomeCalculator {
    fn net_income(&self) -> Decimal {
        let income: Vec<_> = self.finances.income_sources().into_iter().collect();
        let deductions: Vec<_> = self.finances.deduction_sources().into_iter().collect();
        self.finances.total_amount(&income) - self.finances.total_amount(&deductions)
    }

    fn set_finances(&mut self, finances: Rc<dyn Financer>) {
        self.finances = finances;
    }
}
