use std::path::PathBuf;

use anyhow::{bail, Result};
use devtally_core::aggregate::DEFAULT_MINUTES_PER_COMMIT;
use devtally_core::forge::DEFAULT_GITLAB_URL;
use devtally_core::since::Since;
use devtally_core::summarize::DEFAULT_MODEL;
use serde::Deserialize;

use crate::cli::Cli;

const DEFAULT_OUTPUT_PREFIX: &str = "gitlab_activity";
const DEFAULT_SINCE: Since = Since::Days(30);

/// Contents of `~/.devtally.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct DevtallyConfig {
    pub token: Option<String>,
    pub group_id: Option<u64>,
    pub gitlab_url: Option<String>,
    pub author_email: Option<String>,
    pub minutes_per_commit: Option<u32>,
    pub output_prefix: Option<String>,
    pub since: Option<String>,
    pub openai_key: Option<String>,
    pub summary_model: Option<String>,
    pub color: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub token: String,
    pub group_id: u64,
    pub gitlab_url: String,
    pub author_email: Option<String>,
    pub minutes_per_commit: u32,
    pub output_prefix: String,
    pub since: Since,
    pub openai_key: Option<String>,
    pub summary_model: String,
}

pub fn load() -> DevtallyConfig {
    try_load().unwrap_or_default()
}

fn try_load() -> Result<DevtallyConfig> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("HOME not set"))?;
    let config_path = home.join(".devtally.toml");
    if !config_path.exists() {
        return Ok(DevtallyConfig::default());
    }
    let content = std::fs::read_to_string(&config_path)?;
    let config: DevtallyConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Merges flags and environment over the config file, then applies defaults.
pub fn resolve(cli: &Cli, cfg: DevtallyConfig) -> Result<Settings> {
    let Some(token) = cli.token.clone().or(cfg.token).filter(|t| !t.is_empty()) else {
        bail!("GitLab token is required. Provide via --token or GITLAB_TOKEN environment variable");
    };
    let Some(group_id) = cli.group_id.or(cfg.group_id) else {
        bail!("Group ID is required. Provide via --group-id or GITLAB_GROUP_ID environment variable");
    };

    let minutes_per_commit = cli
        .minutes_per_commit
        .or(cfg.minutes_per_commit)
        .unwrap_or(DEFAULT_MINUTES_PER_COMMIT);
    if minutes_per_commit == 0 {
        bail!("minutes_per_commit must be at least 1");
    }

    let since = match (&cli.since, cfg.since.as_deref()) {
        (Some(since), _) => since.clone(),
        (None, Some(raw)) => raw
            .parse::<Since>()
            .map_err(|e| anyhow::anyhow!("invalid `since` in ~/.devtally.toml: {e}"))?,
        (None, None) => DEFAULT_SINCE,
    };

    Ok(Settings {
        token,
        group_id,
        gitlab_url: cli
            .gitlab_url
            .clone()
            .or(cfg.gitlab_url)
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string()),
        author_email: cli
            .author_email
            .clone()
            .or(cfg.author_email)
            .filter(|a| !a.trim().is_empty()),
        minutes_per_commit,
        output_prefix: cli
            .output_prefix
            .clone()
            .or(cfg.output_prefix)
            .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
        since,
        openai_key: cli
            .openai_key
            .clone()
            .or(cfg.openai_key)
            .filter(|k| !k.is_empty()),
        summary_model: cli
            .summary_model
            .clone()
            .or(cfg.summary_model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn bare_cli(args: &[&str]) -> Cli {
        let mut argv = vec!["devtally"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn default_config_is_all_none() {
        let cfg = DevtallyConfig::default();
        assert!(cfg.token.is_none());
        assert!(cfg.group_id.is_none());
        assert!(cfg.since.is_none());
        assert!(cfg.color.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
            group_id = 1234
            since = "week"
        "#;
        let cfg: DevtallyConfig = toml::from_str(toml_str).expect("parse failed");
        assert_eq!(cfg.group_id, Some(1234));
        assert_eq!(cfg.since.as_deref(), Some("week"));
        assert!(cfg.token.is_none());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let toml_str = r#"
            gitlab_url = "https://gitlab.example.com"
            unknown_field = "should not fail"
        "#;
        let result: Result<DevtallyConfig, _> = toml::from_str(toml_str);
        assert!(result.is_ok());
    }

    #[test]
    fn flags_override_file() {
        let cli = bare_cli(&["--token", "cli-token", "--group-id", "7"]);
        let cfg = DevtallyConfig {
            token: Some("file-token".to_string()),
            group_id: Some(1),
            output_prefix: Some("acme".to_string()),
            ..DevtallyConfig::default()
        };
        let settings = resolve(&cli, cfg).expect("resolve failed");
        assert_eq!(settings.token, "cli-token");
        assert_eq!(settings.group_id, 7);
        assert_eq!(settings.output_prefix, "acme");
    }

    #[test]
    fn file_fills_missing_flags_and_defaults_apply() {
        let cli = bare_cli(&["--token", "t"]);
        let cfg = DevtallyConfig {
            group_id: Some(55),
            since: Some("2024-08-12".to_string()),
            ..DevtallyConfig::default()
        };
        let settings = resolve(&cli, cfg).expect("resolve failed");
        assert_eq!(settings.group_id, 55);
        assert!(matches!(settings.since, Since::Date(_)));
        assert_eq!(settings.minutes_per_commit, 15);
        assert_eq!(settings.summary_model, "gpt-4o");
    }

    #[test]
    fn missing_token_is_fatal() {
        let cli = bare_cli(&["--group-id", "7"]);
        let err = resolve(&cli, DevtallyConfig::default());
        assert!(err.is_err());
    }

    #[test]
    fn invalid_since_in_file_is_fatal() {
        let cli = bare_cli(&["--token", "t", "--group-id", "7"]);
        let cfg = DevtallyConfig {
            since: Some("someday".to_string()),
            ..DevtallyConfig::default()
        };
        assert!(resolve(&cli, cfg).is_err());
    }
}
