use crate::cycle::PaymentCycleMetric;
use crate::record::PurchaseRecord;
use crate::unpaid::UnpaidRecord;
use crate::utils::{week_end, week_start};
use chrono::{Days, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An unpaid record enriched with a payment-date prediction borrowed from
/// the company's historical cycle statistics.
///
/// When the company has no paid history, `median_days` and `predicted_date`
/// stay `None` and `is_due_this_week` is false — no number is fabricated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedPayment {
    #[serde(flatten)]
    pub record: PurchaseRecord,
    pub unpaid_amount: f64,
    pub median_days: Option<f64>,
    pub predicted_date: Option<NaiveDate>,
    pub is_due_this_week: bool,
}

/// Rollup of predicted payments falling inside the current week, mirroring
/// the unpaid-summary grouping shape restricted to the due-this-week subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub total_due_this_week: f64,
    pub by_department: BTreeMap<String, f64>,
    pub by_dept_company: BTreeMap<String, BTreeMap<String, f64>>,
    /// Every prediction, due this week or not, for detail views.
    pub records: Vec<PredictedPayment>,
}

/// Predicts payment dates for unpaid records from per-company cycle medians.
///
/// The reference date is injected rather than read from the clock so the
/// "due this week" window is deterministic and testable.
pub struct Forecaster {
    week_start: NaiveDate,
    week_end: NaiveDate,
}

impl Forecaster {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            week_start: week_start(today),
            week_end: week_end(today),
        }
    }

    /// The Monday..=Sunday window predictions are tested against.
    pub fn week_window(&self) -> (NaiveDate, NaiveDate) {
        (self.week_start, self.week_end)
    }

    /// Enriches each unpaid record with the company's median cycle length
    /// and the resulting predicted payment date. `metrics_by_company` must
    /// be the company-only grouping — prediction deliberately ignores which
    /// department an invoice came from.
    ///
    /// Predictions are only built for records without a check date; a
    /// partially-paid record already has a payment against it, so its
    /// residual belongs in the unpaid views, not the forecast.
    pub fn predict(
        &self,
        unpaid: &[UnpaidRecord],
        metrics_by_company: &BTreeMap<String, PaymentCycleMetric>,
    ) -> Vec<PredictedPayment> {
        unpaid
            .iter()
            .filter(|u| u.record.check_date.is_none())
            .map(|u| self.predict_one(u, metrics_by_company.get(&u.record.company_name)))
            .collect()
    }

    fn predict_one(
        &self,
        unpaid: &UnpaidRecord,
        metric: Option<&PaymentCycleMetric>,
    ) -> PredictedPayment {
        let median_days = metric.map(|m| m.median_days);
        // Medians can be fractional (average of two middle values); predicted
        // dates are calendar dates, so round to the nearest whole day.
        let predicted_date = median_days.and_then(|days| {
            unpaid
                .record
                .invoice_date
                .checked_add_days(Days::new(days.round() as u64))
        });
        let is_due_this_week = predicted_date
            .map(|d| d >= self.week_start && d <= self.week_end)
            .unwrap_or(false);

        PredictedPayment {
            record: unpaid.record.clone(),
            unpaid_amount: unpaid.unpaid_amount,
            median_days,
            predicted_date,
            is_due_this_week,
        }
    }

    /// Rolls the due-this-week subset up by department and by
    /// department → company, keeping the full prediction list attached.
    pub fn summarize(&self, predictions: Vec<PredictedPayment>) -> ForecastSummary {
        let mut total_due_this_week = 0.0;
        let mut by_department: BTreeMap<String, f64> = BTreeMap::new();
        let mut by_dept_company: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

        for prediction in predictions.iter().filter(|p| p.is_due_this_week) {
            let amount = prediction.unpaid_amount;
            total_due_this_week += amount;
            *by_department
                .entry(prediction.record.department.clone())
                .or_insert(0.0) += amount;
            *by_dept_company
                .entry(prediction.record.department.clone())
                .or_default()
                .entry(prediction.record.company_name.clone())
                .or_insert(0.0) += amount;
        }

        debug!(
            "Forecast window {} ~ {}: {:.2} due across {} departments",
            self.week_start,
            self.week_end,
            total_due_this_week,
            by_department.len()
        );

        ForecastSummary {
            total_due_this_week,
            by_department,
            by_dept_company,
            records: predictions,
        }
    }
}
