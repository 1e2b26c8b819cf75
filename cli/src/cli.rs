use clap::{ArgAction, Parser};
use devtally_core::since::Since;

#[derive(Parser, Debug)]
#[command(
    name = "devtally",
    about = "Estimate engineering activity from GitLab commit history",
    version
)]
pub struct Cli {
    /// GitLab API token
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitLab group ID to analyze
    #[arg(long, env = "GITLAB_GROUP_ID")]
    pub group_id: Option<u64>,

    /// GitLab instance URL (default: https://gitlab.com)
    #[arg(long, env = "GITLAB_URL")]
    pub gitlab_url: Option<String>,

    /// Only count commits by this author email
    #[arg(long, env = "GITLAB_AUTHOR_EMAIL")]
    pub author_email: Option<String>,

    /// Estimated minutes spent per commit (default: 15)
    #[arg(long, env = "MINUTES_PER_COMMIT", value_parser = clap::value_parser!(u32).range(1..))]
    pub minutes_per_commit: Option<u32>,

    /// Prefix for the report directory (default: gitlab_activity)
    #[arg(long, env = "OUTPUT_PREFIX")]
    pub output_prefix: Option<String>,

    /// Start of history: YYYY-MM-DD, RFC 3339 time, today, yesterday, 24h, 30d, week (default: 30d)
    #[arg(short, long, env = "START_DATE")]
    pub since: Option<Since>,

    /// OpenAI API key for daily commit summaries
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,

    /// Model used for summaries (default: gpt-4o)
    #[arg(long, env = "OPENAI_MODEL")]
    pub summary_model: Option<String>,

    /// Print the aggregated report as JSON instead of writing files
    #[arg(long)]
    pub json: bool,

    /// Disable colored output (overrides TTY auto-detection)
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::Set,
        value_parser = parse_flag,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub debug: bool,
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(format!("expected true or false, got {other}")),
    }
}
