use std::rc::Rc;

use rust_decimal::Decimal;

use crate::finance::{Financer, Person};

/// Read-only snapshot of a taxpayer handed to creditors during one
/// evaluation.
///
/// Built fresh by the calculator on every `tax_payable` call; nothing in the
/// engine mutates it. `finances` of `None` means the calculator was never
/// given financial data, in which case no credits are generated.
#[derive(Debug, Clone)]
pub struct TaxPayer {
    pub finances: Option<Rc<dyn Financer>>,
    pub net_income: Decimal,
    pub spouse_finances: Option<Rc<dyn Financer>>,
    pub spouse_net_income: Option<Decimal>,
    pub dependents: Vec<Person>,
}
