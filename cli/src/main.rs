mod cli;
mod config;
mod output;
mod progress;
mod report;

use std::io::IsTerminal;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use devtally_core::forge::{CommitQuery, Forge, GitLabClient};
use devtally_core::pagination::Pacing;
use devtally_core::pipeline::{self, RunEvent, RunOptions, RunOutcome};
use devtally_core::summarize::{OpenAiSummarizer, Summarizer};
use indicatif::MultiProgress;
use log::{debug, info, LevelFilter};

fn init_logging(debug: bool, progress: &MultiProgress) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .target(env_logger::Target::Pipe(Box::new(progress::LogWriter::new(
            progress.clone(),
        ))))
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let bars = progress::multi(cli.json);
    init_logging(cli.debug, &bars);
    let cfg = config::load();

    let use_color = if cli.no_color || cli.json {
        false
    } else if let Some(cfg_color) = cfg.color {
        cfg_color
    } else {
        std::io::stdout().is_terminal()
    };
    output::set_color_enabled(use_color);

    let settings = config::resolve(&cli, cfg)?;

    let gitlab = GitLabClient::new(&settings.gitlab_url, settings.token.as_str());
    debug!("Using GitLab API at {}", gitlab.api_base());
    let user = gitlab.current_user().with_context(|| {
        format!(
            "Authentication against {} failed. Please ensure your token has the api, \
             read_repository and read_user scopes",
            settings.gitlab_url
        )
    })?;
    info!(
        "Successfully authenticated as: {} (@{})",
        user.name, user.username
    );

    let summarizer = settings
        .openai_key
        .as_deref()
        .map(|key| OpenAiSummarizer::new(key, settings.summary_model.as_str()));

    let since = settings.since.to_instant().map_err(|e| anyhow!(e))?;
    let options = RunOptions {
        group_id: settings.group_id,
        query: CommitQuery::new(since, settings.author_email.clone()),
        minutes_per_commit: settings.minutes_per_commit,
        pacing: Pacing::default(),
    };
    info!(
        "Collecting commits since {} for group {}",
        options.query.since_param(),
        options.group_id
    );

    let mut bar = progress::spinner(&bars, "Listing repositories...");
    let outcome = pipeline::run(
        &gitlab,
        &options,
        summarizer.as_ref().map(|s| s as &dyn Summarizer),
        &mut |event| match event {
            RunEvent::Listed { projects } => {
                bar.finish_and_clear();
                bar = progress::harvest_bar(&bars, projects);
            }
            RunEvent::Harvested { project, harvest } => {
                bar.set_message(format!(
                    "{} ({} commits)",
                    project.path,
                    harvest.commits.len()
                ));
                bar.inc(1);
            }
        },
    )
    .with_context(|| format!("Error accessing group {}", settings.group_id))?;
    bar.finish_and_clear();

    match outcome {
        RunOutcome::NoProjects { group } => {
            eprintln!(
                "No projects found in {}. Please check group ID and permissions.",
                group.full_name
            );
        }
        RunOutcome::NoCommits { group, harvest } => {
            eprintln!(
                "{} in {}",
                output::access_line(harvest.successful, harvest.attempted),
                group.full_name
            );
            output::render_failures(&harvest.failures);
            if cli.json {
                println!("{}", output::render_json(&Default::default()));
            } else {
                eprintln!("No commits found matching the criteria");
            }
        }
        RunOutcome::Report {
            group,
            harvest,
            report,
        } => {
            eprintln!(
                "\u{2713} {} ({} in {})",
                output::summary_line(&report),
                output::access_line(harvest.successful, harvest.attempted),
                group.full_name
            );
            output::render_failures(&harvest.failures);

            if cli.json {
                println!("{}", output::render_json(&report));
            } else {
                println!();
                output::render_terminal(&report);
                let writer = report::ReportWriter::new(&settings.output_prefix);
                let written = writer.write_all(&report)?;
                println!();
                println!(
                    "Wrote {} report files to {}",
                    written.len(),
                    writer.output_dir().display()
                );
            }
        }
    }

    Ok(())
}
