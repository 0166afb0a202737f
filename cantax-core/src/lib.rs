//! Canadian personal income tax engine: progressive-bracket liability,
//! credit generation, and rule-ordered credit consumption across one or more
//! jurisdictions.

pub mod calc;
pub mod finance;
pub mod models;

pub use calc::{
    Aggregator, AggregatorError, CalcConfig, Calculator, ConfigError, ConstCreditor, ContraError,
    ContraFormula, Creditor, Formula, SpouseAllowanceCreditor, WeightedCreditor,
};
pub use finance::{FinancialSource, Financer, IncomeCalculator, NoFinances, Person, SourceKind};
pub use models::*;
