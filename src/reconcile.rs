use crate::forecast::PredictedPayment;
use crate::record::PurchaseRecord;
use crate::unpaid::UnpaidRecord;
use serde::{Deserialize, Serialize};

/// A row in the "all unpaid" ledger view: forward running cumulative of the
/// outstanding balance in invoice-date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidLedgerRow {
    #[serde(flatten)]
    pub record: UnpaidRecord,
    pub cumulative: f64,
}

/// Synthetic totals row shown under a filtered ledger table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalRow {
    pub invoice_amount: f64,
    pub unpaid_amount: f64,
}

/// The "all unpaid" view: rows ascending by invoice date, each carrying its
/// running cumulative. The totals row appears only when a company filter is
/// active; with no filter a grand total across all companies is suppressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidLedgerView {
    pub rows: Vec<UnpaidLedgerRow>,
    pub total: Option<TotalRow>,
}

/// A row in the "paid history" view. `diff` is the invoiced amount minus
/// what was actually paid; `cumulative` is accumulated oldest-to-newest, so
/// with the newest-first display order row 0 carries the all-time total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidHistoryRow {
    #[serde(flatten)]
    pub record: PurchaseRecord,
    pub diff: f64,
    pub cumulative: f64,
}

/// Outcome of reconciling invoiced against paid amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationStatus {
    /// Positive total diff: less was collected than invoiced.
    UnderCollected,
    /// Zero or negative total diff: fully reconciled (or overpaid).
    Reconciled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidHistoryView {
    /// Newest invoice first.
    pub rows: Vec<PaidHistoryRow>,
    /// Sum of all diffs, independent of the cumulative column.
    pub total_diff: f64,
    pub status: ReconciliationStatus,
}

/// The "predicted" detail view: predictions for one company, ascending by
/// invoice date. No cumulative column; the totals row follows the same
/// filter-only rule as the unpaid ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedView {
    pub rows: Vec<PredictedPayment>,
    pub total: Option<TotalRow>,
}

/// Forward running cumulative over `rows` in their current order. Both
/// ledger views go through this one fold; they differ only in sort order and
/// whether the rows are reversed for display afterwards.
fn running_cumulative<T>(rows: &[T], amount: impl Fn(&T) -> f64) -> Vec<f64> {
    let mut running = 0.0;
    rows.iter()
        .map(|row| {
            running += amount(row);
            running
        })
        .collect()
}

/// Builds the "predicted" detail table from forecast output, optionally
/// restricted to one company.
pub fn predicted_view(
    predictions: &[PredictedPayment],
    company_filter: Option<&str>,
) -> PredictedView {
    let mut rows: Vec<PredictedPayment> = predictions
        .iter()
        .filter(|p| company_filter.map_or(true, |c| p.record.company_name == c))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        a.record
            .invoice_date
            .cmp(&b.record.invoice_date)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });

    let total = if company_filter.is_some() && !rows.is_empty() {
        Some(TotalRow {
            invoice_amount: rows.iter().map(|p| p.record.invoice_amount).sum(),
            unpaid_amount: rows.iter().map(|p| p.unpaid_amount).sum(),
        })
    } else {
        None
    };

    PredictedView { rows, total }
}

/// Builds the "all unpaid" cumulative view from unpaid-enriched records,
/// optionally restricted to one company. Rows sort ascending by invoice date
/// (ISO order), ties broken by id for stability.
pub fn all_unpaid_view(records: &[UnpaidRecord], company_filter: Option<&str>) -> UnpaidLedgerView {
    let mut filtered: Vec<UnpaidRecord> = records
        .iter()
        .filter(|u| company_filter.map_or(true, |c| u.record.company_name == c))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| {
        a.record
            .invoice_date
            .cmp(&b.record.invoice_date)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });

    let cumulative = running_cumulative(&filtered, |u| u.unpaid_amount);

    let total = if company_filter.is_some() && !filtered.is_empty() {
        Some(TotalRow {
            invoice_amount: filtered.iter().map(|u| u.record.invoice_amount).sum(),
            unpaid_amount: filtered.iter().map(|u| u.unpaid_amount).sum(),
        })
    } else {
        None
    };

    let rows = filtered
        .into_iter()
        .zip(cumulative)
        .map(|(record, cumulative)| UnpaidLedgerRow { record, cumulative })
        .collect();

    UnpaidLedgerView { rows, total }
}

/// Builds the "paid history" view: records with a check date, newest invoice
/// first, with diffs accumulated from the chronologically earliest record so
/// the top row shows the all-time cumulative. Inconsistent amounts (paid more
/// than invoiced) surface as negative diffs, never hidden.
pub fn paid_history_view(
    records: &[PurchaseRecord],
    company_filter: Option<&str>,
) -> PaidHistoryView {
    let mut paid: Vec<PurchaseRecord> = records
        .iter()
        .filter(|r| r.is_paid())
        .filter(|r| company_filter.map_or(true, |c| r.company_name == c))
        .cloned()
        .collect();
    // Accumulate in ascending order, then flip for newest-first display.
    paid.sort_by(|a, b| {
        a.invoice_date
            .cmp(&b.invoice_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    let cumulative = running_cumulative(&paid, |r| {
        r.invoice_amount - r.actual_paid_amount.unwrap_or(0.0)
    });

    let mut rows: Vec<PaidHistoryRow> = paid
        .into_iter()
        .zip(cumulative)
        .map(|(record, cumulative)| {
            let diff = record.invoice_amount - record.actual_paid_amount.unwrap_or(0.0);
            PaidHistoryRow {
                record,
                diff,
                cumulative,
            }
        })
        .collect();
    rows.reverse();

    let total_diff: f64 = rows.iter().map(|r| r.diff).sum();
    let status = if total_diff > 0.0 {
        ReconciliationStatus::UnderCollected
    } else {
        ReconciliationStatus::Reconciled
    };

    PaidHistoryView {
        rows,
        total_diff,
        status,
    }
}

/// Rows paid with the given check number, ascending by invoice date. An
/// empty result is a normal displayable state, not an error.
pub fn check_search(records: &[PurchaseRecord], check_number: &str) -> Vec<PurchaseRecord> {
    let mut matched: Vec<PurchaseRecord> = records
        .iter()
        .filter(|r| r.check_number.as_deref() == Some(check_number))
        .cloned()
        .collect();
    matched.sort_by(|a, b| {
        a.invoice_date
            .cmp(&b.invoice_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    matched
}

/// Distinct check numbers present in the records, sorted, for search pickers.
pub fn check_numbers(records: &[PurchaseRecord]) -> Vec<String> {
    let mut numbers: Vec<String> = records
        .iter()
        .filter_map(|r| r.check_number.clone())
        .collect();
    numbers.sort();
    numbers.dedup();
    numbers
}
