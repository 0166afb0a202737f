//! Concrete financial-data collaborators for the `cantax-core` engine: an
//! in-memory ledger implementing `Financer` and a plain net-income
//! calculator implementing `IncomeCalculator`.

mod ledger;
mod net_income;

pub use ledger::IndividualFinances;
pub use net_income::NetIncomeCalculator;
