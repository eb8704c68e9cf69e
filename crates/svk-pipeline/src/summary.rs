//! Short markdown status of the store for CI step summaries.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Local, NaiveDate};
use svk_quality::format_count;
use svk_records::RecordSet;

/// Days shown in the "recent data" list, ending today.
pub const RECENT_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub total_records: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub distinct_dates: usize,
    pub generated_at: DateTime<Local>,
    /// Oldest first; `true` when the date has at least one record.
    pub recent: Vec<(NaiveDate, bool)>,
}

pub fn summarize(set: &RecordSet, today: NaiveDate, now: DateTime<Local>) -> StoreSummary {
    let dates = set.dates();
    let recent = (0..RECENT_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|d| (d, dates.contains(&d)))
        .collect();
    StoreSummary {
        total_records: set.len(),
        date_range: set.date_span(),
        distinct_dates: dates.len(),
        generated_at: now,
        recent,
    }
}

impl StoreSummary {
    pub fn to_markdown(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("## SVK Data Summary\n\n")?;
        let Some((start, end)) = self.date_range else {
            return f.write_str("No data in the store.\n");
        };
        writeln!(f, "- **Total Records:** {}", format_count(self.total_records))?;
        writeln!(f, "- **Date Range:** {start} to {end}")?;
        writeln!(f, "- **Unique Dates:** {}", self.distinct_dates)?;
        writeln!(
            f,
            "- **Last Update:** {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        f.write_str("\n### Recent Data Coverage\n")?;
        for (d, has_data) in &self.recent {
            let mark = if *has_data { "yes" } else { "MISSING" };
            writeln!(f, "- {d}: {mark}")?;
        }
        Ok(())
    }
}

/// Append `markdown` to a CI step-summary file, creating it if needed.
pub fn append_step_summary(path: &Path, markdown: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open step summary: {}", path.display()))?;
    f.write_all(markdown.as_bytes())
        .with_context(|| format!("append step summary: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use svk_testkit::{date, hourly_days, without_date};

    #[test]
    fn recent_list_ends_today() {
        let today = date(2024, 5, 10);
        let set = without_date(&hourly_days(date(2024, 5, 1), 10), date(2024, 5, 8));
        let s = summarize(&set, today, Local::now());
        assert_eq!(s.recent.len(), 7);
        assert_eq!(s.recent[0], (date(2024, 5, 4), true));
        assert_eq!(s.recent[4], (date(2024, 5, 8), false));
        assert_eq!(s.recent[6], (today, true));
        assert_eq!(s.distinct_dates, 9);

        let md = s.to_markdown();
        assert!(md.contains("- **Total Records:** 216"));
        assert!(md.ends_with("- 2024-05-10: yes\n"));
        assert!(md.contains("- **Date Range:** 2024-05-01 to 2024-05-10"));
        assert!(md.contains("- 2024-05-08: MISSING"));
    }

    #[test]
    fn total_records_use_thousands_separator() {
        let today = date(2024, 5, 10);
        let set = hourly_days(date(2024, 1, 1), 131);
        let md = summarize(&set, today, Local::now()).to_markdown();
        assert!(md.contains("- **Total Records:** 3,144"));
    }

    #[test]
    fn empty_store_summary() {
        let s = summarize(&RecordSet::empty(), date(2024, 5, 10), Local::now());
        assert_eq!(s.total_records, 0);
        assert!(s.to_markdown().contains("No data in the store."));
    }

    #[test]
    fn step_summary_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        append_step_summary(&path, "a\n").unwrap();
        append_step_summary(&path, "b\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }
}
