//! Command-line interface for chat-tasks
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::classify::Classifier;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::{space_name, Space, SpaceType};
use crate::output::OutputOptions;
use crate::retry::RetryPolicy;
use crate::source::{ArchiveSource, MessageSource, RetryingSource};
use crate::window::{ReportWindow, WindowRequest};

mod events;
mod messages;
mod people;
mod report;
mod spaces;
mod tasks;
mod thread;

/// chat-tasks - task reports from chat task-bot messages
///
/// Rebuilds task records (assignee, status) from the task-bot's chat messages
/// and reports completion per assignee.
#[derive(Parser, Debug)]
#[command(name = "chat-tasks")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Message archive directory
    #[arg(long, global = true, env = "CHAT_TASKS_ARCHIVE")]
    pub archive: Option<PathBuf>,

    /// Configuration file (defaults to .chat-tasks.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report window selection shared by fetching commands.
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Messages from the past 24 hours
    #[arg(long)]
    pub past_day: bool,

    /// Messages from the past 7 days
    #[arg(long)]
    pub past_week: bool,

    /// Messages from the past 30 days
    #[arg(long)]
    pub past_month: bool,

    /// Messages from the past 365 days
    #[arg(long)]
    pub past_year: bool,

    /// Window start (YYYY-MM-DD or RFC3339); requires --date-end
    #[arg(long)]
    pub date_start: Option<String>,

    /// Window end, exclusive (YYYY-MM-DD or RFC3339); requires --date-start
    #[arg(long)]
    pub date_end: Option<String>,
}

impl WindowArgs {
    pub fn resolve(&self) -> Result<ReportWindow> {
        WindowRequest {
            past_day: self.past_day,
            past_week: self.past_week,
            past_month: self.past_month,
            past_year: self.past_year,
            date_start: self.date_start.clone(),
            date_end: self.date_end.clone(),
        }
        .resolve(Utc::now())
    }
}

/// File exports shared by listing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct SaveArgs {
    /// Save results as JSON
    #[arg(long, value_name = "FILE")]
    pub save_json: Option<PathBuf>,

    /// Save results as CSV
    #[arg(long, value_name = "FILE")]
    pub save_csv: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List spaces in the archive
    Spaces {
        /// Include direct messages
        #[arg(long, visible_alias = "all")]
        include_direct_messages: bool,
    },

    /// List people seen in the window
    People {
        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Completion report per assignee
    Report {
        /// Assignee glob, e.g. "*Smith*" (case-sensitive)
        #[arg(long)]
        assignee: Option<String>,

        /// Space ids or names to include (defaults to every space)
        #[arg(long = "space")]
        spaces: Vec<String>,

        /// Show the per-assignee drill-down view
        #[arg(long)]
        drill_down: bool,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// List reconstructed tasks
    Tasks {
        /// Assignee glob, e.g. "*Smith*" (case-sensitive)
        #[arg(long)]
        assignee: Option<String>,

        /// Space ids or names to include (defaults to every space)
        #[arg(long = "space")]
        spaces: Vec<String>,

        /// Attach every task's complete thread
        #[arg(long)]
        with_threads: bool,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// List raw messages of a space
    Messages {
        /// Space id or name
        #[arg(long)]
        space: String,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Show one thread
    Thread {
        /// Space id or name
        #[arg(long)]
        space: String,

        /// Thread id or full thread name
        #[arg(long)]
        thread: String,
    },

    /// Stream classified task events as JSON lines
    Events {
        /// Space id or name
        #[arg(long)]
        space: String,

        /// Destination file, or "-" for stdout (default)
        #[arg(long, value_name = "FILE")]
        out: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },
}

/// Everything a command needs once flags and config are resolved.
pub(crate) struct Context {
    pub config: Config,
    pub source: RetryingSource<ArchiveSource>,
    pub classifier: Classifier,
    pub output: OutputOptions,
}

impl Context {
    fn load(archive: Option<PathBuf>, config: Option<&Path>, output: OutputOptions) -> Result<Self> {
        let config = Config::resolve(config)?;
        let root = archive
            .or_else(|| config.source.archive.clone())
            .ok_or_else(|| {
                Error::InvalidArgument(
                    "no message archive: pass --archive or set [source] archive".to_string(),
                )
            })?;
        tracing::debug!(archive = %root.display(), "opening message archive");
        let archive = ArchiveSource::open(root, config.source.page_size)?;
        let source = RetryingSource::new(archive, RetryPolicy::from(&config.retry));
        let classifier = Classifier::new(config.classifier.marker.clone());
        tracing::debug!(marker = classifier.marker(), "task-bot marker");
        Ok(Self {
            config,
            source,
            classifier,
            output,
        })
    }

    /// Spaces to report on: the requested ones, else every SPACE-type space.
    pub fn select_spaces(&self, requested: &[String]) -> Result<Vec<Space>> {
        let known = self.source.list_spaces()?;
        if requested.is_empty() {
            return Ok(known
                .into_iter()
                .filter(|space| space.space_type == SpaceType::Space)
                .collect());
        }
        requested
            .iter()
            .map(|raw| {
                let name = space_name(raw);
                known
                    .iter()
                    .find(|space| space.name == name)
                    .cloned()
                    .ok_or(Error::SpaceNotFound(name))
            })
            .collect()
    }
}

impl Cli {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = self.output();
        let ctx = Context::load(self.archive, self.config.as_deref(), output)?;
        match self.command {
            Commands::Spaces {
                include_direct_messages,
            } => spaces::run(
                &ctx,
                spaces::SpacesOptions {
                    include_direct_messages,
                },
            ),
            Commands::People { window, save } => {
                people::run(&ctx, people::PeopleOptions { window, save })
            }
            Commands::Report {
                assignee,
                spaces,
                drill_down,
                window,
                save,
            } => report::run(
                &ctx,
                report::ReportOptions {
                    assignee,
                    spaces,
                    drill_down,
                    window,
                    save,
                },
            ),
            Commands::Tasks {
                assignee,
                spaces,
                with_threads,
                window,
                save,
            } => tasks::run(
                &ctx,
                tasks::TasksOptions {
                    assignee,
                    spaces,
                    with_threads,
                    window,
                    save,
                },
            ),
            Commands::Messages {
                space,
                window,
                save,
            } => messages::run(
                &ctx,
                messages::MessagesOptions {
                    space,
                    window,
                    save,
                },
            ),
            Commands::Thread { space, thread } => {
                thread::run(&ctx, thread::ThreadOptions { space, thread })
            }
            Commands::Events { space, out, window } => {
                events::run(&ctx, events::EventsOptions { space, out, window })
            }
        }
    }
}

/// Write the requested exports and report them in the human output.
pub(crate) fn save_outputs<T: serde::Serialize>(
    save: &SaveArgs,
    rows: &[T],
    human: &mut crate::output::HumanOutput,
) -> Result<Vec<crate::export::ExportSummary>> {
    let mut written = Vec::new();
    if let Some(path) = save.save_json.as_deref() {
        let summary = crate::export::save_json(path, rows)?;
        human.push_detail(format!("saved JSON to {}", summary.path));
        written.push(summary);
    }
    if let Some(path) = save.save_csv.as_deref() {
        let summary = crate::export::save_csv(path, rows)?;
        if summary.written {
            human.push_detail(format!("saved CSV to {}", summary.path));
        } else {
            human.push_warning(format!("no data to write to {}", summary.path));
        }
        written.push(summary);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_flags() {
        let cli = Cli::try_parse_from([
            "chat-tasks",
            "--archive",
            "data",
            "report",
            "--assignee",
            "*Smith*",
            "--drill-down",
            "--past-week",
            "--space",
            "AAAA",
        ])
        .expect("parse");
        assert_eq!(cli.archive.as_deref(), Some(Path::new("data")));
        match cli.command {
            Commands::Report {
                assignee,
                spaces,
                drill_down,
                window,
                ..
            } => {
                assert_eq!(assignee.as_deref(), Some("*Smith*"));
                assert_eq!(spaces, vec!["AAAA"]);
                assert!(drill_down);
                assert!(window.past_week);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn spaces_accepts_all_alias() {
        let cli = Cli::try_parse_from(["chat-tasks", "spaces", "--all"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Spaces {
                include_direct_messages: true
            }
        ));
    }

    #[test]
    fn lone_date_bound_is_rejected() {
        let window = WindowArgs {
            date_start: Some("2024-05-01".to_string()),
            ..WindowArgs::default()
        };
        assert!(matches!(window.resolve(), Err(Error::InvalidDateRange(_))));
    }
}
