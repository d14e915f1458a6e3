use anyhow::Result;
use chrono::NaiveDate;
use ledger_analytics::*;
use std::io::Write;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn raw_row(
    id: &str,
    company: &str,
    dept: &str,
    invoice_date: &str,
    invoice_amount: f64,
    check: Option<(&str, &str, f64)>,
) -> RawPurchaseRecord {
    RawPurchaseRecord {
        id: Some(id.to_string()),
        company_name: Some(company.to_string()),
        department: Some(dept.to_string()),
        invoice_date: Some(invoice_date.to_string()),
        invoice_amount: Some(invoice_amount),
        invoice_number: Some(format!("INV-{}", id)),
        check_number: check.map(|(n, _, _)| n.to_string()),
        check_date: check.map(|(_, d, _)| d.to_string()),
        actual_paid_amount: check.map(|(_, _, paid)| paid),
        ..Default::default()
    }
}

/// A small but representative ledger: two departments, three companies,
/// a mix of paid, partially-paid, and open invoices.
fn sample_ledger() -> Vec<RawPurchaseRecord> {
    vec![
        // Acme history: paid in 4, 6, 8 days -> company median 6.
        raw_row("a1", "Acme", "Ops", "2024-01-01", 100.0, Some(("101", "2024-01-05", 100.0))),
        raw_row("a2", "Acme", "Ops", "2024-01-08", 150.0, Some(("102", "2024-01-14", 150.0))),
        // Partially paid: 5.00 residual stays in the unpaid set.
        raw_row("a3", "Acme", "IT", "2024-01-10", 80.0, Some(("103", "2024-01-18", 75.0))),
        // Acme open invoices.
        raw_row("a4", "Acme", "Ops", "2024-02-26", 200.0, None),
        raw_row("a5", "Acme", "Ops", "2024-03-01", 120.0, None),
        // Beta: one paid record (10 days), one open.
        raw_row("b1", "Beta", "Ops", "2024-01-05", 300.0, Some(("201", "2024-01-15", 300.0))),
        raw_row("b2", "Beta", "IT", "2024-02-20", 90.0, None),
        // Gamma has no payment history at all.
        raw_row("g1", "Gamma", "IT", "2024-02-28", 55.0, None),
    ]
}

#[test]
fn test_full_pipeline_over_sample_ledger() {
    // 2024-03-06 is a Wednesday; its week runs Mon 2024-03-04 ..= Sun 2024-03-10.
    let today = date("2024-03-06");
    let snapshot = LedgerAnalytics::analyze(&sample_ledger(), today);

    assert_eq!(snapshot.records.len(), 8);
    assert!(snapshot.skipped.is_empty());

    // Unpaid: a3 residual (5), a4 (200), a5 (120), b2 (90), g1 (55).
    assert_eq!(snapshot.unpaid.records.len(), 5);
    assert!((snapshot.unpaid.total_unpaid - 470.0).abs() < 1e-9);

    let dept_sum: f64 = snapshot.unpaid.by_department.values().sum();
    assert!((dept_sum - snapshot.unpaid.total_unpaid).abs() < 1e-9);

    // Acme company-level history: days [4, 6, 8], median 6.
    let acme = snapshot
        .cycle_by_company
        .iter()
        .find(|m| m.company_name == "Acme")
        .unwrap();
    assert_eq!(acme.invoice_count, 3);
    assert_eq!(acme.median_days, 6.0);
    assert_eq!(acme.min_days, 4);
    assert_eq!(acme.max_days, 8);

    // Department-level grouping splits Acme's Ops and IT history.
    let acme_ops = snapshot
        .cycle_by_dept_company
        .iter()
        .find(|m| m.department.as_deref() == Some("Ops") && m.company_name == "Acme")
        .unwrap();
    assert_eq!(acme_ops.invoice_count, 2);
    assert_eq!(acme_ops.median_days, 5.0);

    // Predictions exist only for records without a check; the partially-paid
    // a3 stays out of the forecast.
    assert_eq!(snapshot.forecast.records.len(), 4);
    assert!(snapshot
        .forecast
        .records
        .iter()
        .all(|p| p.record.id != "a3"));

    // a4: 2024-02-26 + 6 = 2024-03-03, the Sunday before the window.
    let a4 = snapshot
        .forecast
        .records
        .iter()
        .find(|p| p.record.id == "a4")
        .unwrap();
    assert_eq!(a4.median_days, Some(6.0));
    assert_eq!(a4.predicted_date, Some(date("2024-03-03")));
    assert!(!a4.is_due_this_week);

    // a5: 2024-03-01 + 6 = 2024-03-07, inside the window.
    let a5 = snapshot
        .forecast
        .records
        .iter()
        .find(|p| p.record.id == "a5")
        .unwrap();
    assert_eq!(a5.predicted_date, Some(date("2024-03-07")));
    assert!(a5.is_due_this_week);
    assert!((a5.unpaid_amount - 120.0).abs() < 1e-9);

    // b2: 2024-02-20 + 10 = 2024-03-01, already behind the window.
    let b2 = snapshot
        .forecast
        .records
        .iter()
        .find(|p| p.record.id == "b2")
        .unwrap();
    assert_eq!(b2.predicted_date, Some(date("2024-03-01")));
    assert!(!b2.is_due_this_week);

    let g1 = snapshot
        .forecast
        .records
        .iter()
        .find(|p| p.record.id == "g1")
        .unwrap();
    assert_eq!(g1.median_days, None);
    assert!(!g1.is_due_this_week);

    // Only a5 is due this week.
    assert!((snapshot.forecast.total_due_this_week - 120.0).abs() < 1e-9);
    assert_eq!(snapshot.forecast.by_dept_company["Ops"]["Acme"], 120.0);
}

#[test]
fn test_exact_median_on_even_and_odd_histories() {
    // Even-length day sequence [2,4,6,8] -> 5; odd [1,3,9] -> 3.
    let even: Vec<RawPurchaseRecord> = [2, 4, 6, 8]
        .iter()
        .enumerate()
        .map(|(i, days)| {
            let check = format!("2024-01-{:02}", 1 + days);
            raw_row(
                &format!("e{}", i),
                "Even Co",
                "Ops",
                "2024-01-01",
                10.0,
                Some(("1", check.as_str(), 10.0)),
            )
        })
        .collect();
    let snapshot = LedgerAnalytics::analyze(&even, date("2024-01-01"));
    assert_eq!(snapshot.cycle_by_company[0].median_days, 5.0);

    let odd: Vec<RawPurchaseRecord> = [1, 3, 9]
        .iter()
        .enumerate()
        .map(|(i, days)| {
            let check = format!("2024-01-{:02}", 1 + days);
            raw_row(
                &format!("o{}", i),
                "Odd Co",
                "Ops",
                "2024-01-01",
                10.0,
                Some(("1", check.as_str(), 10.0)),
            )
        })
        .collect();
    let snapshot = LedgerAnalytics::analyze(&odd, date("2024-01-01"));
    assert_eq!(snapshot.cycle_by_company[0].median_days, 3.0);
}

#[test]
fn test_paid_history_cumulative_against_ledger() {
    let today = date("2024-03-06");
    let snapshot = LedgerAnalytics::analyze(&sample_ledger(), today);

    let view = paid_history_view(&snapshot.records, Some("Acme"));
    // Paid Acme rows newest-first: a3 (diff 5), a2 (0), a1 (0). Row 0 carries
    // the all-time cumulative.
    let ids: Vec<&str> = view.rows.iter().map(|r| r.record.id.as_str()).collect();
    assert_eq!(ids, vec!["a3", "a2", "a1"]);

    let cumulative: Vec<f64> = view.rows.iter().map(|r| r.cumulative).collect();
    assert_eq!(cumulative, vec![5.0, 0.0, 0.0]);

    assert_eq!(view.total_diff, 5.0);
    assert_eq!(view.status, ReconciliationStatus::UnderCollected);

    // Fully-reconciled company reports success.
    let beta = paid_history_view(&snapshot.records, Some("Beta"));
    assert_eq!(beta.total_diff, 0.0);
    assert_eq!(beta.status, ReconciliationStatus::Reconciled);
}

#[test]
fn test_all_unpaid_view_against_ledger() {
    let today = date("2024-03-06");
    let snapshot = LedgerAnalytics::analyze(&sample_ledger(), today);

    // Acme unpaid ascending by invoice date: a3 (5), a4 (200), a5 (120).
    let filtered = all_unpaid_view(&snapshot.unpaid.records, Some("Acme"));
    let cumulative: Vec<f64> = filtered.rows.iter().map(|r| r.cumulative).collect();
    assert_eq!(cumulative, vec![5.0, 205.0, 325.0]);
    let total = filtered.total.as_ref().unwrap();
    assert_eq!(total.invoice_amount, 400.0);
    assert_eq!(total.unpaid_amount, 325.0);

    // No filter: rows across companies, grand total suppressed.
    let unfiltered = all_unpaid_view(&snapshot.unpaid.records, None);
    assert_eq!(unfiltered.rows.len(), 5);
    assert!(unfiltered.total.is_none());
}

#[test]
fn test_check_search_and_navigation_flow() {
    let today = date("2024-03-06");
    let snapshot = LedgerAnalytics::analyze(&sample_ledger(), today);

    // User drills into a department from a chart, opens check search, types
    // a check number, then switches to paid history.
    let state = NavigationState::drill_into_department("Ops")
        .apply(NavEvent::SelectMode(DetailMode::CheckSearch))
        .apply(NavEvent::SetFilter("101".to_string()));

    let matches = check_search(&snapshot.records, state.active_filter().unwrap());
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "a1");

    let state = state.apply(NavEvent::SelectMode(DetailMode::PaidHistory));
    // The check number must not leak into the company filter.
    assert_eq!(state.active_filter(), None);

    let view = paid_history_view(&snapshot.records, state.active_filter());
    assert_eq!(view.rows.len(), 4);

    assert_eq!(
        check_numbers(&snapshot.records),
        vec!["101", "102", "103", "201"]
    );
}

#[test]
fn test_weekly_and_monthly_summaries() {
    let today = date("2024-03-06");
    let snapshot = LedgerAnalytics::analyze(&sample_ledger(), today);

    let months = monthly_summaries(&snapshot.records, SummaryBasis::Invoice);
    let keys: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(keys, vec!["2024-01", "2024-02", "2024-03"]);
    assert_eq!(months[0].total_amount, 630.0);
    assert_eq!(months[0].by_department["Ops"], 550.0);
    assert_eq!(months[0].by_department["IT"], 80.0);

    // Payment basis re-buckets by check date and sums what was actually paid.
    let paid_months = monthly_summaries(&snapshot.records, SummaryBasis::Payment);
    let keys: Vec<&str> = paid_months.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(keys, vec!["2024-01"]);
    assert_eq!(paid_months[0].total_amount, 625.0);

    // The week of Mon 2024-02-26 spans the month boundary: a4 (02-26),
    // g1 (02-28), and a5 (03-01) all land in it; b2 (02-20) does not.
    let weeks = weekly_summaries(&snapshot.records, SummaryBasis::Invoice);
    let boundary_week = weeks
        .iter()
        .find(|w| w.week_start == date("2024-02-26"))
        .unwrap();
    assert_eq!(boundary_week.week_end, date("2024-03-03"));
    assert_eq!(boundary_week.total_amount, 375.0);
    assert_eq!(boundary_week.by_company["Acme"], 320.0);
    assert_eq!(boundary_week.by_company["Gamma"], 55.0);

    let bubbles = company_week_bubbles(&snapshot.records, SummaryBasis::Invoice);
    let acme_boundary = bubbles
        .iter()
        .find(|b| b.company_name == "Acme" && b.week_start == date("2024-02-26"))
        .unwrap();
    assert_eq!(acme_boundary.amount, 320.0);
    assert_eq!(acme_boundary.total_company_amount, 650.0);
}

#[test]
fn test_csv_fixture_round_trip() -> Result<()> {
    // Ledger extracts arrive as spreadsheets; exercise the same pipeline
    // through a CSV fixture.
    let dir = std::env::temp_dir().join("ledger_analytics_tests");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("ledger_fixture.csv");

    let mut file = std::fs::File::create(&path)?;
    writeln!(
        file,
        "id,companyName,department,invoiceDate,invoiceAmount,checkNumber,checkDate,actualPaidAmount"
    )?;
    writeln!(file, "r1,Acme,Ops,2024-01-01,100.00,101,2024-01-09,100.00")?;
    writeln!(file, "r2,Acme,Ops,2024-02-01,250.00,,,")?;
    writeln!(file, "r3,Beta,IT,2024-02-05,90.00,,,")?;
    drop(file);

    let mut reader = csv::Reader::from_path(&path)?;
    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result?;
        let opt = |i: usize| -> Option<String> {
            row.get(i)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };
        rows.push(RawPurchaseRecord {
            id: opt(0),
            company_name: opt(1),
            department: opt(2),
            invoice_date: opt(3),
            invoice_amount: opt(4).and_then(|v| v.parse().ok()),
            invoice_number: None,
            check_number: opt(5),
            check_date: opt(6),
            actual_paid_amount: opt(7).and_then(|v| v.parse().ok()),
            ..Default::default()
        });
    }

    let snapshot = LedgerAnalytics::analyze(&rows, date("2024-02-05"));
    assert_eq!(snapshot.records.len(), 3);
    assert_eq!(snapshot.unpaid.total_unpaid, 340.0);

    // Acme pays in 8 days; its open invoice lands on 2024-02-09, inside the
    // week of Mon 2024-02-05.
    let r2 = snapshot
        .forecast
        .records
        .iter()
        .find(|p| p.record.id == "r2")
        .unwrap();
    assert_eq!(r2.predicted_date, Some(date("2024-02-09")));
    assert!(r2.is_due_this_week);
    assert_eq!(snapshot.forecast.total_due_this_week, 250.0);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn test_display_formatting_rules() {
    // Rounding happens at display time only.
    assert_eq!(format_amount(123.456), "123.46");
    // Timestamps truncate to their first 10 characters.
    assert_eq!(
        parse_iso_date("2024-05-01T10:00:00.000Z").unwrap(),
        date("2024-05-01")
    );
}
