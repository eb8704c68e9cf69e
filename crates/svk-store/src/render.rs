//! Human-readable HTML view of a quality report.

use std::fmt::{self, Write as _};

use svk_quality::{format_count, format_pct, QualityReport};

use crate::artifacts::ReportMeta;

/// Missing dates listed inline before the "... and N more" line.
pub const MISSING_DATES_SHOWN: usize = 20;

const STYLE: &str = "body{font-family:Arial,sans-serif;margin:20px;background:#f5f5f5}\
h1{color:#333}\
.summary,.section{background:#fff;padding:20px;border-radius:8px;margin-bottom:20px}\
.metric{display:inline-block;margin:10px 20px}\
.metric-value{font-size:24px;font-weight:bold;color:#2196F3}\
.metric-label{color:#666;font-size:14px}\
.status-good{color:#4CAF50}.status-bad{color:#f44336}\
.issue{background:#fff3cd;padding:10px;margin:5px 0;border-radius:4px}\
.success{background:#d4edda;padding:10px;margin:5px 0;border-radius:4px}\
.degraded{background:#e2e3e5;padding:10px;margin:5px 0;border-radius:4px}\
table{width:100%;border-collapse:collapse}\
th,td{padding:8px;text-align:left;border-bottom:1px solid #ddd}\
th{background:#f2f2f2}";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn section(html: &mut String, title: &str, class: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(html, "<div class=\"section\"><h2>{}</h2>", escape(title))?;
    for item in items {
        write!(html, "<div class=\"{class}\">{}</div>", escape(item))?;
    }
    html.push_str("</div>");
    Ok(())
}

pub fn render_html(report: &QualityReport, meta: &ReportMeta) -> Result<String, fmt::Error> {
    let mut html = String::new();
    write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>SVK Data Quality Report</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>SVK Data Quality Report</h1>\n<p>Generated: {}</p>\n",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S")
    )?;

    let (status_class, status_text) = if report.issues_found {
        ("status-bad", "Issues Found")
    } else {
        ("status-good", "All Good")
    };
    write!(
        html,
        "<div class=\"summary\"><h2>Summary</h2>\
         <div class=\"metric\"><div class=\"metric-value\">{}</div><div class=\"metric-label\">Total Records</div></div>\
         <div class=\"metric\"><div class=\"metric-value\">{}%</div><div class=\"metric-label\">Data Coverage ({} days)</div></div>\
         <div class=\"metric\"><div class=\"metric-value {status_class}\">{status_text}</div><div class=\"metric-label\">Status</div></div>\
         </div>\n",
        format_count(report.total_records),
        format_pct(report.coverage_percentage),
        report.coverage_days_back,
    )?;

    section(&mut html, "Passed Checks", "success", &report.checks_passed)?;
    section(&mut html, "Failed Checks", "issue", &report.checks_failed)?;
    section(&mut html, "Checks That Could Not Run", "degraded", &report.checks_degraded)?;
    section(&mut html, "Warnings", "issue", &report.warnings)?;

    if !report.missing_dates.is_empty() {
        html.push_str(
            "<div class=\"section\"><h2>Missing Dates</h2><p>The following dates have no data:</p><ul>",
        );
        for d in report.missing_dates.iter().take(MISSING_DATES_SHOWN) {
            write!(html, "<li>{d}</li>")?;
        }
        if report.missing_dates.len() > MISSING_DATES_SHOWN {
            write!(
                html,
                "<li>... and {} more</li>",
                report.missing_dates.len() - MISSING_DATES_SHOWN
            )?;
        }
        html.push_str("</ul></div>\n");
    }

    if !report.value_ranges.is_empty() {
        html.push_str(
            "<div class=\"section\"><h2>Value Ranges</h2><table>\
             <tr><th>Column</th><th>Min</th><th>Max</th><th>Mean</th><th>Negative</th><th>Suspicious High</th></tr>",
        );
        for (col, s) in &report.value_ranges {
            write!(
                html,
                "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td><td>{}</td></tr>",
                escape(col),
                s.min,
                s.max,
                s.mean,
                s.negative_count,
                s.suspicious_high_count
            )?;
        }
        html.push_str("</table></div>\n");
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn meta() -> ReportMeta {
        ReportMeta {
            generated_at: Utc::now(),
            run_id: Uuid::nil(),
            config_hash: String::new(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn long_missing_list_is_truncated() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut report = QualityReport::no_data(start, 30);
        report.missing_dates = start.iter_days().take(25).collect();
        let html = render_html(&report, &meta()).unwrap();
        assert!(html.contains("<li>2024-01-20</li>"));
        assert!(!html.contains("<li>2024-01-21</li>"));
        assert!(html.contains("... and 5 more"));
        assert!(html.contains("No data found"));
        assert!(html.contains("status-bad"));
    }
}
