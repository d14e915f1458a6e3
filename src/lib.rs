//! # Ledger Analytics
//!
//! A library for deriving financial dashboard views from a flat ledger of
//! purchase/invoice records: payment-cycle statistics per company,
//! unpaid-balance rollups, payment-date forecasts, reconciliation of
//! invoiced vs. actually-paid amounts, and monthly/weekly department
//! summaries — plus the navigation state machine that links summary views to
//! their drill-down detail tables.
//!
//! ## Core Concepts
//!
//! - **Purchase record**: one invoice row, optionally carrying the check that
//!   paid it. Normalized once, then treated as an immutable snapshot.
//! - **Payment cycle**: whole days from invoice date to check date; the
//!   per-company median drives payment-date prediction.
//! - **Unpaid amount**: invoice amount minus actually-paid amount, treated as
//!   zero below a fixed 0.01 epsilon.
//! - **Due this week**: a predicted payment date inside the current
//!   Monday–Sunday window.
//!
//! Every aggregation is a pure, deterministic fold over the full record set —
//! nothing is cached or mutated in place, so recomputing a view on demand is
//! always safe.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_analytics::*;
//! use chrono::NaiveDate;
//!
//! let rows = parse_records(&uploaded_json)?;
//! let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! let snapshot = LedgerAnalytics::analyze(&rows, today);
//!
//! println!("unpaid total: {}", snapshot.unpaid.total_unpaid);
//! for metric in &snapshot.cycle_by_company {
//!     println!("{}: median {} days", metric.company_name, metric.median_days);
//! }
//! ```

pub mod cycle;
pub mod error;
pub mod forecast;
pub mod navigation;
pub mod reconcile;
pub mod record;
pub mod summary;
pub mod unpaid;
pub mod utils;

pub use cycle::{cycle_metrics, cycle_metrics_by_company, CycleGrouping, PaymentCycleMetric};
pub use error::{LedgerError, Result};
pub use forecast::{ForecastSummary, Forecaster, PredictedPayment};
pub use navigation::{DetailMode, NavEvent, NavigationState};
pub use reconcile::{
    all_unpaid_view, check_numbers, check_search, paid_history_view, predicted_view,
    PaidHistoryRow, PaidHistoryView, PredictedView, ReconciliationStatus, TotalRow,
    UnpaidLedgerRow, UnpaidLedgerView,
};
pub use record::{
    normalize, parse_records, NormalizationReport, PurchaseRecord, RawPurchaseRecord, SkipReason,
    SkippedRow,
};
pub use summary::{
    company_week_bubbles, monthly_summaries, weekly_summaries, CompanyBubbleData, MonthlySummary,
    SummaryBasis, WeeklySummary,
};
pub use unpaid::{
    aggregate_unpaid, is_unpaid, unpaid_amount, UnpaidRecord, UnpaidSummary, UNPAID_EPSILON,
};
pub use utils::*;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Everything the dashboard needs, recomputed from one pass over the raw
/// rows. The rendering layer treats this as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Canonical records the aggregations were computed from.
    pub records: Vec<PurchaseRecord>,
    /// Rows rejected during normalization, with reasons.
    pub skipped: Vec<SkippedRow>,
    pub cycle_by_dept_company: Vec<PaymentCycleMetric>,
    pub cycle_by_company: Vec<PaymentCycleMetric>,
    pub unpaid: UnpaidSummary,
    pub forecast: ForecastSummary,
}

pub struct LedgerAnalytics;

impl LedgerAnalytics {
    /// Runs the full aggregation pipeline over `rows`. `today` anchors the
    /// "due this week" forecast window.
    pub fn analyze(rows: &[RawPurchaseRecord], today: NaiveDate) -> DashboardSnapshot {
        info!("Analyzing ledger of {} raw rows", rows.len());

        let report = normalize(rows);
        debug!(
            "Normalized {} records ({} skipped)",
            report.records.len(),
            report.skipped_count()
        );

        let cycle_by_dept_company =
            cycle_metrics(&report.records, CycleGrouping::DepartmentCompany);
        let metrics_by_company = cycle_metrics_by_company(&report.records);

        let unpaid = aggregate_unpaid(&report.records);
        debug!(
            "{} unpaid records totalling {:.2}",
            unpaid.records.len(),
            unpaid.total_unpaid
        );

        let forecaster = Forecaster::new(today);
        let predictions = forecaster.predict(&unpaid.records, &metrics_by_company);
        let forecast = forecaster.summarize(predictions);

        DashboardSnapshot {
            records: report.records,
            skipped: report.skipped,
            cycle_by_dept_company,
            cycle_by_company: metrics_by_company.into_values().collect(),
            unpaid,
            forecast,
        }
    }

    /// Parses a JSON array of raw rows and runs [`Self::analyze`]. Malformed
    /// JSON is the only hard failure; row-level problems are skipped and
    /// counted in the snapshot.
    pub fn analyze_json(json: &str, today: NaiveDate) -> Result<DashboardSnapshot> {
        let rows = parse_records(json)?;
        Ok(Self::analyze(&rows, today))
    }
}

/// Free-function convenience wrapper around [`LedgerAnalytics::analyze`].
pub fn analyze_ledger(rows: &[RawPurchaseRecord], today: NaiveDate) -> DashboardSnapshot {
    LedgerAnalytics::analyze(rows, today)
}
