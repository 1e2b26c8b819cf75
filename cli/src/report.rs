use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat};
use devtally_core::model::{ActivityReport, DailyTable, DetailedRow};

const DETAILED_HEADER: &str = "timestamp,project,commit_id,message,additions,deletions,total_changes,\
author_name,author_email,activity_minutes,activity_start,activity_end,date";
const DAILY_HEADER: &str =
    "date,commits,activity_minutes,additions,deletions,total_changes,commit_messages,commit_summary";
const TABLE_RULE: &str =
    "|------------|---------|---------------|-------------|-------------|---------------|";

/// Writes CSV tables and Markdown reports into `<prefix>_by_repo/`.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_prefix: &str) -> Self {
        Self {
            output_dir: PathBuf::from(format!("{output_prefix}_by_repo")),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes every report file and returns their paths.
    pub fn write_all(&self, report: &ActivityReport) -> Result<Vec<PathBuf>> {
        self.write_all_at(report, Local::now())
    }

    fn write_all_at(
        &self,
        report: &ActivityReport,
        generated: DateTime<Local>,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;

        let mut written = Vec::new();
        for (repository, table) in &report.daily {
            let safe = safe_name(repository);
            written.push(self.write_file(&format!("{safe}_detailed.csv"), |out| {
                write_detailed_csv(out, report.detailed_for(repository))
            })?);
            written.push(self.write_file(&format!("{safe}_daily_summary.csv"), |out| {
                write_daily_csv(out, table)
            })?);
            written.push(self.write_file(&format!("{safe}_daily_report.md"), |out| {
                write_daily_report(out, table, generated)
            })?);
        }
        written.push(self.write_file("overall_summary.md", |out| {
            write_overall_summary(out, report, generated)
        })?);
        Ok(written)
    }

    fn write_file<F>(&self, name: &str, render: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        let path = self.output_dir.join(name);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        render(&mut out).with_context(|| format!("Failed to write {}", path.display()))?;
        out.flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }
}

pub fn safe_name(repository: &str) -> String {
    repository.replace('/', "_")
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Formats an integer with `,` between groups of three digits.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn write_detailed_csv<'a>(
    out: &mut dyn Write,
    rows: impl Iterator<Item = &'a DetailedRow>,
) -> std::io::Result<()> {
    writeln!(out, "{DETAILED_HEADER}")?;
    for row in rows {
        let c = &row.commit;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            c.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            csv_field(&c.repository),
            csv_field(&c.commit_id),
            csv_field(&c.message),
            c.additions,
            c.deletions,
            c.total_changes,
            csv_field(&c.author_name),
            csv_field(&c.author_email),
            row.activity_minutes,
            row.activity_start.to_rfc3339_opts(SecondsFormat::Secs, true),
            row.activity_end.to_rfc3339_opts(SecondsFormat::Secs, true),
            row.date,
        )?;
    }
    Ok(())
}

fn write_daily_csv(out: &mut dyn Write, table: &DailyTable) -> std::io::Result<()> {
    writeln!(out, "{DAILY_HEADER}")?;
    for day in &table.days {
        let messages = serde_json::to_string(&day.messages)?;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            day.date,
            day.commits,
            day.activity_minutes,
            day.additions,
            day.deletions,
            day.total_changes,
            csv_field(&messages),
            csv_field(&day.summary),
        )?;
    }
    Ok(())
}

fn write_daily_report(
    out: &mut dyn Write,
    table: &DailyTable,
    generated: DateTime<Local>,
) -> std::io::Result<()> {
    writeln!(out, "# Activity Report for {}\n", table.repository)?;
    writeln!(out, "*Generated on {}*\n", generated.format("%Y-%m-%d %H:%M:%S"))?;

    writeln!(out, "## Repository Summary\n")?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    writeln!(out, "| Total Commits | {} |", thousands(table.total_commits()))?;
    writeln!(
        out,
        "| Total Activity Time | {} minutes |",
        thousands(table.total_minutes())
    )?;
    writeln!(out, "| Active Days | {} |", thousands(table.active_days() as u64))?;
    writeln!(out, "| Lines Added | {} |", thousands(table.total_additions()))?;
    writeln!(out, "| Lines Deleted | {} |\n", thousands(table.total_deletions()))?;

    writeln!(out, "## Daily Activity\n")?;
    for day in &table.days {
        writeln!(out, "### {}\n", day.date)?;
        writeln!(out, "| Metric | Value |")?;
        writeln!(out, "|--------|-------|")?;
        writeln!(out, "| Commits | {} |", thousands(day.commits))?;
        writeln!(out, "| Lines Added | +{} |", thousands(day.additions))?;
        writeln!(out, "| Lines Deleted | -{} |", thousands(day.deletions))?;
        writeln!(out, "| Activity Time | {} minutes |\n", day.activity_minutes)?;
        writeln!(out, "#### Changes Summary\n")?;
        writeln!(out, "{}\n", day.summary)?;
        writeln!(out, "---\n")?;
    }
    Ok(())
}

fn write_overall_summary(
    out: &mut dyn Write,
    report: &ActivityReport,
    generated: DateTime<Local>,
) -> std::io::Result<()> {
    writeln!(out, "# Overall Activity Summary\n")?;
    writeln!(out, "*Generated on {}*\n", generated.format("%Y-%m-%d %H:%M:%S"))?;

    writeln!(
        out,
        "| Repository | Commits | Activity Time | Active Days | Lines Added | Lines Deleted |"
    )?;
    writeln!(out, "{TABLE_RULE}")?;

    let (mut commits, mut minutes, mut additions, mut deletions) = (0, 0, 0, 0);
    for table in report.daily.values() {
        commits += table.total_commits();
        minutes += table.total_minutes();
        additions += table.total_additions();
        deletions += table.total_deletions();
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            table.repository,
            thousands(table.total_commits()),
            thousands(table.total_minutes()),
            thousands(table.active_days() as u64),
            thousands(table.total_additions()),
            thousands(table.total_deletions()),
        )?;
    }
    writeln!(out, "{TABLE_RULE}")?;
    writeln!(
        out,
        "| **TOTAL** | **{}** | **{}** | **-** | **{}** | **{}** |\n",
        thousands(commits),
        thousands(minutes),
        thousands(additions),
        thousands(deletions),
    )?;

    writeln!(out, "## Detailed Repository Statistics\n")?;
    for table in report.daily.values() {
        writeln!(out, "### {}\n", table.repository)?;
        writeln!(out, "#### Activity Metrics\n")?;
        writeln!(out, "| Metric | Value |")?;
        writeln!(out, "|--------|-------|")?;
        writeln!(out, "| Total Active Days | {} |", thousands(table.active_days() as u64))?;
        writeln!(
            out,
            "| Average Commits per Day | {:.2} |",
            table.average_commits_per_day()
        )?;
        if let Some(day) = table.most_active_day() {
            writeln!(out, "| Most Active Day | {} ({} commits) |", day.date, day.commits)?;
        }
        writeln!(out, "\n---\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use devtally_core::aggregate::aggregate;
    use devtally_core::model::CommitRecord;

    fn record(repo: &str, ts: &str, msg: &str, additions: u64, deletions: u64) -> CommitRecord {
        CommitRecord {
            timestamp: DateTime::parse_from_rfc3339(ts)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|e| panic!("{e}")),
            repository: repo.to_string(),
            commit_id: format!("id-{ts}"),
            message: msg.to_string(),
            additions,
            deletions,
            total_changes: additions + deletions,
            author_name: "Jane Doe".to_string(),
            author_email: "jane@example.com".to_string(),
        }
    }

    fn sample() -> ActivityReport {
        aggregate(
            vec![
                record("acme/a", "2024-01-01T10:00:00Z", "fix bug", 5, 1),
                record("acme/a", "2024-01-01T11:30:00Z", "add test, \"quoted\"", 10, 0),
                record("acme/b", "2024-01-02T09:00:00Z", "init\n\nbody", 1500, 0),
            ],
            15,
            None,
        )
    }

    fn generated() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 1, 3, 8, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("bad date"))
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn safe_names_flatten_groups() {
        assert_eq!(safe_name("acme/platform/api"), "acme_platform_api");
    }

    #[test]
    fn writes_every_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("acme");
        let writer = ReportWriter::new(&prefix.to_string_lossy());

        let written = writer
            .write_all_at(&sample(), generated())
            .expect("write failed");

        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        assert_eq!(
            names,
            vec![
                "acme_a_detailed.csv",
                "acme_a_daily_summary.csv",
                "acme_a_daily_report.md",
                "acme_b_detailed.csv",
                "acme_b_daily_summary.csv",
                "acme_b_daily_report.md",
                "overall_summary.md",
            ]
        );
        assert!(writer.output_dir().ends_with("acme_by_repo"));
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn daily_summary_csv_rows() {
        let mut out = Vec::new();
        let report = sample();
        write_daily_csv(&mut out, &report.daily["acme/a"]).expect("write failed");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], DAILY_HEADER);
        assert!(lines[1].starts_with("2024-01-01,2,30,15,1,16,"));
        assert!(lines[1].ends_with(",AI summarization not available"));
    }

    #[test]
    fn detailed_csv_only_has_one_repository() {
        let mut out = Vec::new();
        let report = sample();
        write_detailed_csv(&mut out, report.detailed_for("acme/a")).expect("write failed");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("2024-01-01T10:00:00Z,acme/a,"));
        assert!(text.contains(",15,2024-01-01T09:45:00Z,2024-01-01T10:00:00Z,2024-01-01"));
        assert!(!text.contains("acme/b"));
    }

    #[test]
    fn daily_report_markdown() {
        let mut out = Vec::new();
        let report = sample();
        write_daily_report(&mut out, &report.daily["acme/b"], generated()).expect("write failed");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("# Activity Report for acme/b\n"));
        assert!(text.contains("*Generated on 2024-01-03 08:00:00*"));
        assert!(text.contains("| Lines Added | 1,500 |"));
        assert!(text.contains("### 2024-01-02"));
        assert!(text.contains("| Activity Time | 15 minutes |"));
        assert!(text.contains("#### Changes Summary\n\nAI summarization not available"));
    }

    #[test]
    fn overall_summary_totals() {
        let mut out = Vec::new();
        write_overall_summary(&mut out, &sample(), generated()).expect("write failed");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("| acme/a | 2 | 30 | 1 | 15 | 1 |"));
        assert!(text.contains("| acme/b | 1 | 15 | 1 | 1,500 | 0 |"));
        assert!(text.contains("| **TOTAL** | **3** | **45** | **-** | **1,515** | **1** |"));
        assert!(text.contains("| Average Commits per Day | 2.00 |"));
        assert!(text.contains("| Most Active Day | 2024-01-01 (2 commits) |"));
    }
}
