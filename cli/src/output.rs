use std::sync::OnceLock;

use colored::Colorize;

use devtally_core::error::FetchError;
use devtally_core::model::{ActivityReport, DailyTable};

static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn set_color_enabled(enabled: bool) {
    COLOR_ENABLED.set(enabled).ok();
    colored::control::set_override(enabled);
}

pub(crate) fn color_enabled() -> bool {
    *COLOR_ENABLED.get().unwrap_or(&false)
}

pub fn render_terminal(report: &ActivityReport) {
    if report.daily.is_empty() {
        eprintln!("{}", "No commits found matching the criteria.".dimmed());
        return;
    }

    for table in report.daily.values() {
        render_repository(table);
    }
}

fn render_repository(table: &DailyTable) {
    println!("{}", repository_header(table, color_enabled()));
}

fn repository_header(table: &DailyTable, color: bool) -> String {
    let stats = format!(
        "({} commits, {} minutes, {} active days)",
        table.total_commits(),
        table.total_minutes(),
        table.active_days()
    );
    let changes = format!("+{} -{}", table.total_additions(), table.total_deletions());
    if color {
        format!(
            "{} {}  {}  {}",
            "::".bold().cyan(),
            table.repository.bold().white(),
            changes.green(),
            stats.dimmed()
        )
    } else {
        format!(":: {}  {}  {}", table.repository, changes, stats)
    }
}

pub fn render_failures(failures: &[(String, FetchError)]) {
    for (repository, err) in failures {
        let line = format!("{repository}: {err}");
        if color_enabled() {
            eprintln!("  {} {}", "!".yellow().bold(), line.yellow());
        } else {
            eprintln!("  ! {line}");
        }
    }
}

pub fn render_json(report: &ActivityReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

pub fn summary_line(report: &ActivityReport) -> String {
    let total_commits = report.total_commits();
    let total_projects = report.daily.len();

    match (total_commits, total_projects) {
        (0, _) => "No commits found.".to_string(),
        (1, 1) => "Found 1 commit in 1 project".to_string(),
        (c, 1) => format!("Found {c} commits in 1 project"),
        (1, p) => format!("Found 1 commit in {p} projects"),
        (c, p) => format!("Found {c} commits in {p} projects"),
    }
}

pub fn access_line(successful: usize, attempted: usize) -> String {
    format!("Successfully accessed {successful} out of {attempted} projects")
}
