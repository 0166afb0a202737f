mod bracket;
mod credit;
mod region;
mod taxpayer;

pub use bracket::{Bracket, BracketError, ScheduleError, WeightedBrackets};
pub use credit::{CalculatorId, Credit, CreditRule, CreditUsage};
pub use region::Region;
pub use taxpayer::TaxPayer;
