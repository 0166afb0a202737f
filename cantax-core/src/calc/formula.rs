use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Region, ScheduleError, WeightedBrackets};

/// The progressive-bracket formula producing gross payable tax before
/// credits.
///
/// The year and region tags carry no arithmetic; they exist so a calculator
/// can refuse a formula/contra-formula pairing that mixes jurisdictions or
/// years. Cloning deep-copies the bracket schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    tax_year: i32,
    region: Region,
    rates: WeightedBrackets,
}

impl Formula {
    pub fn new(
        tax_year: i32,
        region: Region,
        rates: WeightedBrackets,
    ) -> Self {
        Self {
            tax_year,
            region,
            rates,
        }
    }

    /// Gross payable tax on `net_income`, before any credits.
    pub fn apply(&self, net_income: Decimal) -> Decimal {
        self.rates.apply(net_income)
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        self.rates.validate()
    }
}
