use crate::record::PurchaseRecord;
use crate::utils::days_between;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payment-cycle statistics for one company (optionally within one
/// department), computed from records where both the invoice date and the
/// check date are known.
///
/// Negative day counts (check written before the invoice date) are a
/// data-quality condition: they are excluded from every statistic but
/// surfaced through `negative_day_count` so they stay visible for debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCycleMetric {
    /// `None` when the caller requested company-only grouping.
    pub department: Option<String>,
    pub company_name: String,
    /// Number of records that entered the statistics.
    pub invoice_count: usize,
    /// Sum of invoice amounts over the counted records.
    pub total_amount: f64,
    pub median_days: f64,
    pub min_days: i64,
    pub max_days: i64,
    pub avg_days: f64,
    /// Paid records in the group whose check date preceded the invoice date.
    pub negative_day_count: usize,
}

/// How paid records are grouped before computing cycle statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleGrouping {
    /// One metric per distinct (department, company) pair.
    DepartmentCompany,
    /// One metric per company, ignoring departments. Used for forecasting:
    /// a company's historical payment speed is assumed department-agnostic.
    Company,
}

/// Computes payment-cycle metrics over the paid subset of `records`.
///
/// Groups with no non-negative day count are omitted — no metric is ever
/// emitted with `invoice_count == 0`. Output order follows the BTreeMap
/// grouping key and is therefore deterministic.
pub fn cycle_metrics(records: &[PurchaseRecord], grouping: CycleGrouping) -> Vec<PaymentCycleMetric> {
    let mut groups: BTreeMap<(Option<String>, String), Vec<&PurchaseRecord>> = BTreeMap::new();

    for record in records.iter().filter(|r| r.check_date.is_some()) {
        let key = match grouping {
            CycleGrouping::DepartmentCompany => {
                (Some(record.department.clone()), record.company_name.clone())
            }
            CycleGrouping::Company => (None, record.company_name.clone()),
        };
        groups.entry(key).or_default().push(record);
    }

    let mut metrics = Vec::with_capacity(groups.len());

    for ((department, company_name), group) in groups {
        let mut days: Vec<i64> = Vec::with_capacity(group.len());
        let mut negative_day_count = 0;
        let mut total_amount = 0.0;

        for record in &group {
            // Guarded by the filter above.
            let check_date = match record.check_date {
                Some(d) => d,
                None => continue,
            };
            let d = days_between(record.invoice_date, check_date);
            if d < 0 {
                negative_day_count += 1;
            } else {
                days.push(d);
                total_amount += record.invoice_amount;
            }
        }

        if days.is_empty() {
            continue;
        }

        days.sort_unstable();

        metrics.push(PaymentCycleMetric {
            department,
            company_name,
            invoice_count: days.len(),
            total_amount,
            median_days: median(&days),
            min_days: days[0],
            max_days: days[days.len() - 1],
            avg_days: days.iter().sum::<i64>() as f64 / days.len() as f64,
            negative_day_count,
        });
    }

    metrics
}

/// Cycle metrics keyed by company name, for prediction lookups.
pub fn cycle_metrics_by_company(records: &[PurchaseRecord]) -> BTreeMap<String, PaymentCycleMetric> {
    cycle_metrics(records, CycleGrouping::Company)
        .into_iter()
        .map(|m| (m.company_name.clone(), m))
        .collect()
}

/// Exact statistical median of a sorted day-count sequence. Even-length
/// sequences return the average of the two middle values.
fn median(sorted_days: &[i64]) -> f64 {
    let n = sorted_days.len();
    if n % 2 == 1 {
        sorted_days[n / 2] as f64
    } else {
        (sorted_days[n / 2 - 1] + sorted_days[n / 2]) as f64 / 2.0
    }
}
