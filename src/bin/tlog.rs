use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use inquire::{Password, PasswordDisplayMode};

use tlog::date_util::{display_local, format_duration};
use tlog::{
    Classification, Config, SyncOptions, SyncProgress, SyncReport, SyncStatus, TimeEntry, Tlog,
    Window, WorklogEntry,
};

#[derive(Parser)]
#[command(name = "tlog", about = "Move Toggl time entries to Jira worklogs")]
struct Cli {
    /// Write missing worklogs to Jira (by default Jira is not updated)
    #[arg(short, long)]
    write: bool,

    /// Number of days to look back (overrides the config file)
    #[arg(long)]
    days: Option<u32>,

    /// Config file path (default: ~/.tlog/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Status lines for the operator, printed to stderr so `--json` output stays clean.
#[derive(Default)]
struct StderrProgress {
    checking_shown: AtomicBool,
    missing_shown: AtomicBool,
    adding_shown: AtomicBool,
}

impl StderrProgress {
    fn once(flag: &AtomicBool, line: &str) {
        if !flag.swap(true, Ordering::Relaxed) {
            eprintln!("{}", line.cyan());
        }
    }
}

impl SyncProgress for StderrProgress {
    fn on_entries_fetched(&self, window: &Window, _count: usize) {
        eprintln!("{}", "List of found Toggl time entries:".cyan());
        eprintln!("{}", format!("From: {}", display_local(&window.start)).magenta());
        eprintln!("{}", format!("  To: {}", display_local(&window.end)).magenta());
    }

    fn on_entry(&self, raw: &TimeEntry, class: &Classification) {
        let started = display_local(&raw.start);
        match class {
            Classification::Running => eprintln!(
                "{}",
                format!(
                    "ID: {}, Started: {started}, Original description: '{}' - TASK STILL IN PROGRESS",
                    raw.id, raw.description
                )
                .yellow()
            ),
            Classification::Unresolved(entry) => eprintln!(
                "{}",
                format!(
                    "ID: {}, Started: {started}, Time spent: {}, Original description: '{}' - FAIL TO GET TASK ID",
                    raw.id,
                    format_duration(entry.time_spent()),
                    raw.description
                )
                .red()
            ),
            Classification::Ready(entry) => eprintln!(
                "{}",
                format!(
                    "ID: {}, Started: {started}, Time spent: {}, Original description: '{}' - OK",
                    raw.id,
                    format_duration(entry.time_spent()),
                    raw.description
                )
                .green()
            ),
        }
    }

    fn on_ticket_checked(&self, ticket: &str, synced: usize, missing: usize) {
        Self::once(&self.checking_shown, "Checking missed time entries...");
        log::debug!("{ticket}: {synced} already synced, {missing} missing");
    }

    fn on_ticket_skipped(&self, ticket: &str, error: &tlog::Error) {
        Self::once(&self.checking_shown, "Checking missed time entries...");
        eprintln!("{}", format!("Task: {ticket} skipped - {error}").red());
    }

    fn on_missing(&self, entry: &WorklogEntry) {
        Self::once(&self.missing_shown, "List of missed time entries:");
        eprintln!(
            "{}",
            format!(
                "Task: {}, Toggl ID: {}, Started: {}, Time spent: {}, Description: {}",
                entry.ticket().unwrap_or("-"),
                entry.toggl_id(),
                display_local(entry.started()),
                format_duration(entry.time_spent()),
                entry.comment().unwrap_or("")
            )
            .green()
        );
    }

    fn on_submit_progress(&self, current: usize, total: usize) {
        Self::once(&self.adding_shown, "Adding missed time entries to Jira...");
        if current == total {
            eprint!("\r  Added: {current}/{total}   \n");
        } else {
            eprint!("\r  Added: {current}/{total}   ");
        }
    }

    fn on_submit_failed(&self, entry: &WorklogEntry, error: &tlog::Error) {
        eprintln!("\n{}", format!("Failed to add {entry}: {error}").red());
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(days) = cli.days {
        config.days_ago = days;
    }
    config.validate()?;

    if config.jira_password.is_none() {
        eprintln!("{}", "JIRA password is not defined, please enter the password".cyan());
        let password = Password::new("Jira password:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .context("Failed to read the Jira password")?;
        config.jira_password = Some(password);
    }
    Ok(config)
}

fn print_summary(report: &SyncReport, write: bool) {
    let ready = report.entries_total - report.entries_running - report.entries_unresolved;
    if ready == 0 {
        println!("{}", "Nothing found!".cyan());
        return;
    }
    if report.missing == 0 {
        println!("{}", "Nothing for updating!".cyan());
    } else if write {
        println!(
            "{}",
            format!("Done: {} added, {} failed", report.submitted, report.failed).cyan()
        );
    } else {
        println!(
            "{}",
            "WARNING! The missed time entries were not added to Jira, because you did not add parameter -w to update Jira!"
                .yellow()
        );
    }
    for error in &report.errors {
        println!("{}", error.red());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    eprintln!("{}", "Config validation...".cyan());
    let config = load_config(&cli)?;
    let app = Tlog::from_config(&config)?;

    eprintln!("{}", "Jira Access checking...".cyan());
    app.check_access().await?;

    eprintln!("{}", "Getting data from toggl.com...".cyan());
    let options = SyncOptions {
        days: config.days_ago,
        write: cli.write,
    };
    let progress = StderrProgress::default();
    let report = app.sync(&options, &progress).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, cli.write);
    }

    if report.status != SyncStatus::Success {
        std::process::exit(1);
    }
    Ok(())
}
