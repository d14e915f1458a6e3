use crate::record::PurchaseRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Below this threshold a residual balance is treated as fully paid, so
/// floating-point rounding never resurrects a settled invoice. Every place
/// the system asks "is this unpaid?" goes through this constant.
pub const UNPAID_EPSILON: f64 = 0.01;

/// A purchase record together with its computed outstanding balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidRecord {
    #[serde(flatten)]
    pub record: PurchaseRecord,
    pub unpaid_amount: f64,
}

/// Rollup of all outstanding balances: the grand total plus explicit
/// two-level department → company mappings, and the enriched record list for
/// downstream detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidSummary {
    pub total_unpaid: f64,
    pub by_department: BTreeMap<String, f64>,
    pub by_dept_company: BTreeMap<String, BTreeMap<String, f64>>,
    pub records: Vec<UnpaidRecord>,
}

/// Outstanding balance of a record: invoice amount minus whatever has been
/// paid, with the paid amount defaulting to 0.
pub fn unpaid_amount(record: &PurchaseRecord) -> f64 {
    record.invoice_amount - record.actual_paid_amount.unwrap_or(0.0)
}

/// Whether a record still carries a balance above [`UNPAID_EPSILON`].
pub fn is_unpaid(record: &PurchaseRecord) -> bool {
    unpaid_amount(record) > UNPAID_EPSILON
}

/// Filters the unpaid records out of `records` and rolls their balances up
/// by department and by department → company. Sums are order-independent;
/// only the BTreeMap key order of the output is fixed.
pub fn aggregate_unpaid(records: &[PurchaseRecord]) -> UnpaidSummary {
    let mut total_unpaid = 0.0;
    let mut by_department: BTreeMap<String, f64> = BTreeMap::new();
    let mut by_dept_company: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut enriched = Vec::new();

    for record in records.iter().filter(|r| is_unpaid(r)) {
        let amount = unpaid_amount(record);

        total_unpaid += amount;
        *by_department.entry(record.department.clone()).or_insert(0.0) += amount;
        *by_dept_company
            .entry(record.department.clone())
            .or_default()
            .entry(record.company_name.clone())
            .or_insert(0.0) += amount;

        enriched.push(UnpaidRecord {
            record: record.clone(),
            unpaid_amount: amount,
        });
    }

    UnpaidSummary {
        total_unpaid,
        by_department,
        by_dept_company,
        records: enriched,
    }
}
