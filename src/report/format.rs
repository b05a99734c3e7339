//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the metrics code stays clean and testable
//! - output changes are localized (snapshot tests below)

use crate::data::Dataset;
use crate::io::ingest::RowIssue;
use crate::metrics::diff::MetricChange;
use crate::report::CountrySummary;

/// Format the full country report.
pub fn format_country_report(summary: &CountrySummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== covid - {} ===\n", summary.country));
    out.push_str(&format!(
        "Latest: {} | days={} ({} .. {})\n",
        summary.latest_date, summary.days, summary.first_date, summary.latest_date
    ));
    out.push_str(&format!("Total confirmed: {}\n", summary.total_confirmed));
    out.push_str(&format!(
        "New cases: {}\n",
        summary.new_cases.map(|v| v.to_string()).unwrap_or_else(|| "unavailable".to_string())
    ));
    out.push_str(&format!("R ({}-day window): {}\n", summary.window, fmt_r(summary.r_value)));

    out.push_str("\nChange since the previous day:\n");
    if summary.changes.is_empty() {
        out.push_str("  unavailable (only one day of data)\n");
    } else {
        out.push_str(&format_change_table(&summary.changes));
    }

    let q = &summary.quality;
    out.push_str(&format!(
        "\nData quality: {} of {} cells clamped ({:.3}%) | confirmed={} deaths={} recovered={}\n",
        q.clamped(),
        q.cells,
        q.fraction() * 100.0,
        q.confirmed,
        q.deaths,
        q.recovered
    ));

    out
}

pub fn format_change_table(changes: &[MetricChange]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<14} {:>12} {:>12} {:>12}", "metric", "current", "change", "percent").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<14} {:-<12} {:-<12} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');

    for c in changes {
        out.push_str(
            format!(
                "{:<14} {:>12} {:>12} {:>12}",
                truncate(c.metric.display_name(), 14),
                c.current,
                fmt_change(c.diff),
                fmt_percentage(c.percentage),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// One line per country: name, latest date, total confirmed.
pub fn format_countries(dataset: &Dataset) -> String {
    let mut out = String::new();
    for series in dataset.iter() {
        let Some(last) = series.last() else { continue };
        out.push_str(&format!("{:<32} {} {:>12}\n", truncate(series.country(), 32), last.date, last.confirmed));
    }
    out
}

/// Skipped rows/cells, capped at `limit` lines.
pub fn format_issues(issues: &[RowIssue], limit: usize) -> String {
    let mut out = String::new();
    for issue in issues.iter().take(limit) {
        let country = issue.country.as_deref().unwrap_or("?");
        out.push_str(&format!("  line {} [{country}]: {}\n", issue.line, issue.message));
    }
    if issues.len() > limit {
        out.push_str(&format!("  ... and {} more\n", issues.len() - limit));
    }
    out
}

/// Signed change; zero reads as "unchanged".
pub fn fmt_change(diff: i64) -> String {
    if diff == 0 { "unchanged".to_string() } else { format!("{diff:+}") }
}

/// Percentage with sign; a zero baseline reads as "unavailable".
pub fn fmt_percentage(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:+.2}%"),
        None => "unavailable".to_string(),
    }
}

fn fmt_r(r: Option<f64>) -> String {
    match r {
        Some(r) => format!("{r:.2}"),
        None => "unavailable (needs two full windows)".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metric;
    use crate::normalize::ClampReport;
    use chrono::NaiveDate;

    fn summary() -> CountrySummary {
        CountrySummary {
            country: "Israel".to_string(),
            first_date: NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
            latest_date: NaiveDate::from_ymd_opt(2020, 4, 3).unwrap(),
            days: 3,
            window: 7,
            total_confirmed: 150,
            new_cases: Some(50),
            r_value: None,
            changes: vec![
                MetricChange {
                    metric: Metric::Confirmed,
                    current: 150,
                    diff: 50,
                    percentage: Some(50.0),
                },
                MetricChange {
                    metric: Metric::Deaths,
                    current: 0,
                    diff: 0,
                    percentage: None,
                },
            ],
            quality: ClampReport {
                confirmed: 1,
                deaths: 0,
                recovered: 0,
                cells: 9,
            },
        }
    }

    #[test]
    fn country_report_snapshot() {
        let expected = concat!(
            "=== covid - Israel ===\n",
            "Latest: 2020-04-03 | days=3 (2020-04-01 .. 2020-04-03)\n",
            "Total confirmed: 150\n",
            "New cases: 50\n",
            "R (7-day window): unavailable (needs two full windows)\n",
            "\n",
            "Change since the previous day:\n",
            "metric              current       change      percent\n",
            "-------------- ------------ ------------ ------------\n",
            "Confirmed               150          +50      +50.00%\n",
            "Deaths                    0    unchanged  unavailable\n",
            "\n",
            "Data quality: 1 of 9 cells clamped (11.111%) | confirmed=1 deaths=0 recovered=0\n",
        );
        assert_eq!(format_country_report(&summary()), expected);
    }

    #[test]
    fn signed_values() {
        assert_eq!(fmt_change(-3), "-3");
        assert_eq!(fmt_change(12), "+12");
        assert_eq!(fmt_percentage(Some(-12.5)), "-12.50%");
    }

    #[test]
    fn issues_are_capped() {
        let issues: Vec<RowIssue> = (0..3)
            .map(|i| RowIssue {
                line: i + 2,
                country: None,
                message: "missing country name".to_string(),
            })
            .collect();
        let txt = format_issues(&issues, 2);
        assert_eq!(txt.lines().count(), 3);
        assert!(txt.ends_with("  ... and 1 more\n"));
    }
}
