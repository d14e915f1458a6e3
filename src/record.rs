use crate::error::Result;
use crate::utils::parse_iso_date;
use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A purchase row as it arrives from upload/storage, before validation.
/// Every field is optional so that a single malformed row deserializes
/// cleanly and can be rejected individually instead of failing the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawPurchaseRecord {
    #[schemars(description = "Unique record id (e.g. from storage or generated at upload)")]
    pub id: Option<String>,

    #[schemars(description = "Supplier/company name. Required; rows without one are skipped")]
    pub company_name: Option<String>,

    #[schemars(description = "Purchasing department the invoice belongs to")]
    pub department: Option<String>,

    #[schemars(description = "Invoice date as an ISO-8601 string (YYYY-MM-DD or full timestamp)")]
    pub invoice_date: Option<String>,

    #[schemars(description = "Invoice amount. Must be non-negative")]
    pub invoice_amount: Option<f64>,

    #[schemars(description = "Invoice number as printed on the document")]
    pub invoice_number: Option<String>,

    #[schemars(description = "Check number the invoice was paid with, if paid")]
    pub check_number: Option<String>,

    #[schemars(description = "Amount actually paid against this invoice")]
    pub actual_paid_amount: Option<f64>,

    #[schemars(description = "Total amount of the check covering this invoice")]
    pub check_total_amount: Option<f64>,

    #[schemars(description = "Date the check was written, ISO-8601")]
    pub check_date: Option<String>,

    #[schemars(description = "Date the check cleared the bank, ISO-8601")]
    pub bank_reconciliation_date: Option<String>,

    #[schemars(description = "TPS tax portion, carried through unchanged")]
    pub tps: Option<f64>,

    #[schemars(description = "TVQ tax portion, carried through unchanged")]
    pub tvq: Option<f64>,
}

impl RawPurchaseRecord {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RawPurchaseRecord)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// The canonical, validated purchase record every aggregation consumes.
///
/// Invariants enforced by [`normalize`]: `invoice_amount >= 0`;
/// if `check_date` is present then `actual_paid_amount` is present. A record
/// with check fields but no `bank_reconciliation_date` is the legal
/// paid-but-unreconciled transient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub company_name: String,
    pub department: String,
    pub invoice_date: NaiveDate,
    pub invoice_amount: f64,
    pub invoice_number: String,
    pub check_number: Option<String>,
    pub actual_paid_amount: Option<f64>,
    pub check_total_amount: Option<f64>,
    pub check_date: Option<NaiveDate>,
    pub bank_reconciliation_date: Option<NaiveDate>,
    pub tps: Option<f64>,
    pub tvq: Option<f64>,
}

impl PurchaseRecord {
    /// A record is paid once a check has been written against it.
    pub fn is_paid(&self) -> bool {
        self.check_date.is_some()
    }
}

/// Why a raw row was rejected during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingCompanyName,
    MissingInvoiceDate,
    UnparseableInvoiceDate(String),
    NegativeInvoiceAmount,
    CheckDateWithoutPaidAmount,
    UnparseableCheckDate(String),
    UnparseableReconciliationDate(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingCompanyName => write!(f, "missing company name"),
            SkipReason::MissingInvoiceDate => write!(f, "missing invoice date"),
            SkipReason::UnparseableInvoiceDate(v) => write!(f, "unparseable invoice date '{}'", v),
            SkipReason::NegativeInvoiceAmount => write!(f, "negative invoice amount"),
            SkipReason::CheckDateWithoutPaidAmount => {
                write!(f, "check date present without an actual paid amount")
            }
            SkipReason::UnparseableCheckDate(v) => write!(f, "unparseable check date '{}'", v),
            SkipReason::UnparseableReconciliationDate(v) => {
                write!(f, "unparseable bank reconciliation date '{}'", v)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Position of the row in the input batch.
    pub index: usize,
    pub reason: SkipReason,
}

/// Output of [`normalize`]: the accepted records plus every rejected row with
/// its reason. Skipped rows are surfaced, never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub records: Vec<PurchaseRecord>,
    pub skipped: Vec<SkippedRow>,
}

impl NormalizationReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Validates and shapes raw rows into canonical [`PurchaseRecord`]s.
///
/// Rejection policy: rows missing a company name or invoice date, carrying a
/// negative invoice amount, a date that does not parse, or a check date
/// without an actual paid amount are skipped and counted. Everything else is
/// accepted; missing amounts stay `None` and default to 0 only in downstream
/// arithmetic.
pub fn normalize(rows: &[RawPurchaseRecord]) -> NormalizationReport {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for (index, raw) in rows.iter().enumerate() {
        match normalize_row(index, raw) {
            Ok(record) => records.push(record),
            Err(reason) => {
                debug!("Skipping row {}: {}", index, reason);
                skipped.push(SkippedRow { index, reason });
            }
        }
    }

    NormalizationReport { records, skipped }
}

fn normalize_row(
    index: usize,
    raw: &RawPurchaseRecord,
) -> std::result::Result<PurchaseRecord, SkipReason> {
    let company_name = match raw.company_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(SkipReason::MissingCompanyName),
    };

    let invoice_date_str = raw
        .invoice_date
        .as_deref()
        .ok_or(SkipReason::MissingInvoiceDate)?;
    let invoice_date = parse_iso_date(invoice_date_str)
        .map_err(|_| SkipReason::UnparseableInvoiceDate(invoice_date_str.to_string()))?;

    let invoice_amount = raw.invoice_amount.unwrap_or(0.0);
    if invoice_amount < 0.0 {
        return Err(SkipReason::NegativeInvoiceAmount);
    }

    let check_date = match raw.check_date.as_deref() {
        Some(s) => Some(
            parse_iso_date(s).map_err(|_| SkipReason::UnparseableCheckDate(s.to_string()))?,
        ),
        None => None,
    };

    if check_date.is_some() && raw.actual_paid_amount.is_none() {
        return Err(SkipReason::CheckDateWithoutPaidAmount);
    }

    let bank_reconciliation_date = match raw.bank_reconciliation_date.as_deref() {
        Some(s) => Some(
            parse_iso_date(s)
                .map_err(|_| SkipReason::UnparseableReconciliationDate(s.to_string()))?,
        ),
        None => None,
    };

    Ok(PurchaseRecord {
        id: raw
            .id
            .clone()
            .unwrap_or_else(|| format!("row-{}", index)),
        company_name,
        department: raw
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("Unassigned")
            .to_string(),
        invoice_date,
        invoice_amount,
        invoice_number: raw.invoice_number.clone().unwrap_or_default(),
        check_number: raw.check_number.clone(),
        actual_paid_amount: raw.actual_paid_amount,
        check_total_amount: raw.check_total_amount,
        check_date,
        bank_reconciliation_date,
        tps: raw.tps,
        tvq: raw.tvq,
    })
}

/// Deserializes a JSON array of raw rows. Malformed JSON (including a
/// non-numeric amount field) is the one condition that fails hard with a
/// typed error; row-level data-quality problems are handled by [`normalize`].
pub fn parse_records(json: &str) -> Result<Vec<RawPurchaseRecord>> {
    Ok(serde_json::from_str(json)?)
}
