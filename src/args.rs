//! These structs provide the CLI interface for the ledger CLI.

use crate::ledger::LedgerQuery;
use crate::model::{CategoryFilter, Grouping, StatusFilter};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: A command-line tool for reconciling the payments of a construction project.
///
/// A project record holds general payments plus sites, workers and materials, each of which may
/// carry its own payments. This program reads a JSON export of the document tree, gathers all of
/// those payments into a single ledger, and reports totals per category along with how much has
/// been received and how much is still pending.
///
/// Start with `ledger init` to point the program at an export and a project.
#[derive(Debug, Parser, Clone)]
#[command(name = "ledger", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home directory and its configuration file.
    ///
    /// This is the first command you should run. You need two things:
    ///
    /// - A JSON export of the document tree that holds your projects, passed as --document.
    ///
    /// - The id of the project to report on, passed as --project-id. It is the key of the project
    ///   under `projects/` in the export.
    ///
    /// By default the home directory is $HOME/ledger. Pass --ledger-home to put it somewhere else.
    Init(InitArgs),
    /// Show grand totals, the completion percentage and the totals of each category.
    Summary,
    /// List payments, newest first, optionally filtered.
    List(ListArgs),
    /// Export payments and the payment summary to a CSV file.
    Export(ExportArgs),
    /// List the payments that were excluded from totals and why.
    Rejected,
    /// Show how many workers were present on a day and what their wages add up to.
    Attendance(AttendanceArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger configuration and exports are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,

    /// Digit grouping for displayed amounts. Overrides the configured grouping.
    #[arg(long, global = true)]
    grouping: Option<Grouping>,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
            grouping: None,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }

    pub fn grouping(&self) -> Option<Grouping> {
        self.grouping
    }
}

/// (Not shown): Args for the `ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to the JSON export of the document tree.
    #[arg(long)]
    document: PathBuf,

    /// The id of the project to report on.
    #[arg(long)]
    project_id: String,
}

impl InitArgs {
    pub fn new(document: impl Into<PathBuf>, project_id: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            project_id: project_id.into(),
        }
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

/// Filters shared by `ledger list` and `ledger export`.
#[derive(Debug, Default, Parser, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct QueryArgs {
    /// Only include payments where any displayed field contains this text (case-insensitive).
    #[arg(long, default_value = "")]
    search: String,

    /// Only include payments with this status.
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    status: StatusFilter,

    /// Only include payments from this category.
    #[arg(long, value_enum, default_value_t = CategoryFilter::All)]
    category: CategoryFilter,
}

impl QueryArgs {
    pub fn new(search: impl Into<String>, status: StatusFilter, category: CategoryFilter) -> Self {
        Self {
            search: search.into(),
            status,
            category,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }
}

impl From<&QueryArgs> for LedgerQuery {
    fn from(args: &QueryArgs) -> Self {
        LedgerQuery::new(args.search.clone(), args.status, args.category)
    }
}

/// How `ledger list` prints its rows.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// A markdown table followed by the payment summary.
    #[default]
    Table,
    /// CSV with plain amounts.
    Csv,
    /// The projected report as JSON.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// (Not shown): Args for the `ledger list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    query: QueryArgs,

    /// The output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ListArgs {
    pub fn new(query: QueryArgs, format: OutputFormat) -> Self {
        Self { query, format }
    }

    pub fn query(&self) -> &QueryArgs {
        &self.query
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `ledger export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    query: QueryArgs,

    /// Where to write the CSV file. Defaults to `{project name}_BalanceSheet.csv` in the ledger
    /// home directory.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(query: QueryArgs, output: Option<PathBuf>) -> Self {
        Self { query, output }
    }

    pub fn query(&self) -> &QueryArgs {
        &self.query
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// (Not shown): Args for the `ledger attendance` command.
#[derive(Debug, Parser, Clone)]
pub struct AttendanceArgs {
    /// The day to total, as YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,
}

impl AttendanceArgs {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
