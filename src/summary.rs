use crate::record::PurchaseRecord;
use crate::utils::{month_key, week_range_label, week_start};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which side of the ledger a calendar summary is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryBasis {
    /// Bucket by invoice date, sum invoice amounts.
    Invoice,
    /// Bucket by check date, sum actually-paid amounts. Records without a
    /// check date are skipped.
    Payment,
}

fn basis_date_amount(record: &PurchaseRecord, basis: SummaryBasis) -> Option<(NaiveDate, f64)> {
    match basis {
        SummaryBasis::Invoice => Some((record.invoice_date, record.invoice_amount)),
        SummaryBasis::Payment => record
            .check_date
            .map(|d| (d, record.actual_paid_amount.unwrap_or(0.0))),
    }
}

/// One calendar month of activity with a per-department breakdown and the
/// contributing records attached for drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// "YYYY-MM" bucket key.
    pub month: String,
    pub total_amount: f64,
    pub by_department: BTreeMap<String, f64>,
    pub records: Vec<PurchaseRecord>,
}

/// One Monday-start week of activity broken down by department and company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// "YYYY-MM-DD ~ YYYY-MM-DD" display label.
    pub week_range: String,
    pub total_amount: f64,
    pub by_department: BTreeMap<String, f64>,
    pub by_company: BTreeMap<String, f64>,
}

/// One bubble in the company/week distribution chart: the company's amount
/// for that week, plus its all-time total for axis ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBubbleData {
    pub company_name: String,
    pub week_start: NaiveDate,
    pub week_range: String,
    pub amount: f64,
    pub total_company_amount: f64,
}

/// Monthly totals by department, sorted by month.
pub fn monthly_summaries(records: &[PurchaseRecord], basis: SummaryBasis) -> Vec<MonthlySummary> {
    let mut buckets: BTreeMap<String, MonthlySummary> = BTreeMap::new();

    for record in records {
        let Some((date, amount)) = basis_date_amount(record, basis) else {
            continue;
        };
        let key = month_key(date);
        let bucket = buckets.entry(key.clone()).or_insert_with(|| MonthlySummary {
            month: key,
            total_amount: 0.0,
            by_department: BTreeMap::new(),
            records: Vec::new(),
        });
        bucket.total_amount += amount;
        *bucket
            .by_department
            .entry(record.department.clone())
            .or_insert(0.0) += amount;
        bucket.records.push(record.clone());
    }

    buckets.into_values().collect()
}

/// Weekly totals by department and company, sorted by week start.
pub fn weekly_summaries(records: &[PurchaseRecord], basis: SummaryBasis) -> Vec<WeeklySummary> {
    let mut buckets: BTreeMap<NaiveDate, WeeklySummary> = BTreeMap::new();

    for record in records {
        let Some((date, amount)) = basis_date_amount(record, basis) else {
            continue;
        };
        let start = week_start(date);
        let bucket = buckets.entry(start).or_insert_with(|| WeeklySummary {
            week_start: start,
            week_end: start.checked_add_days(Days::new(6)).unwrap_or(start),
            week_range: week_range_label(date),
            total_amount: 0.0,
            by_department: BTreeMap::new(),
            by_company: BTreeMap::new(),
        });
        bucket.total_amount += amount;
        *bucket
            .by_department
            .entry(record.department.clone())
            .or_insert(0.0) += amount;
        *bucket
            .by_company
            .entry(record.company_name.clone())
            .or_insert(0.0) += amount;
    }

    buckets.into_values().collect()
}

/// Per-company weekly amounts for the distribution bubble chart, ordered by
/// (company, week). Each bubble also carries the company's all-time total so
/// the chart can sort its axis by overall volume.
pub fn company_week_bubbles(
    records: &[PurchaseRecord],
    basis: SummaryBasis,
) -> Vec<CompanyBubbleData> {
    let mut per_company_week: BTreeMap<(String, NaiveDate), f64> = BTreeMap::new();
    let mut per_company: BTreeMap<String, f64> = BTreeMap::new();

    for record in records {
        let Some((date, amount)) = basis_date_amount(record, basis) else {
            continue;
        };
        let start = week_start(date);
        *per_company_week
            .entry((record.company_name.clone(), start))
            .or_insert(0.0) += amount;
        *per_company.entry(record.company_name.clone()).or_insert(0.0) += amount;
    }

    per_company_week
        .into_iter()
        .map(|((company_name, start), amount)| CompanyBubbleData {
            total_company_amount: per_company[&company_name],
            week_range: week_range_label(start),
            company_name,
            week_start: start,
            amount,
        })
        .collect()
}
