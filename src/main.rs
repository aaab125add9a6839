use clap::Parser;
use payment_ledger::args::{Args, Command};
use payment_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();
    let grouping = args.common().grouping();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.document(), init_args.project_id())
                .await?
                .print()
        }

        Command::Summary => {
            let config = Config::load(home).await?.with_grouping(grouping);
            commands::summary(config).await?.print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?.with_grouping(grouping);
            let out = commands::list(config, list_args.clone()).await?;
            out.print();
            if let Some(rows) = out.structure() {
                println!("{rows}");
            }
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?.with_grouping(grouping);
            commands::export(config, export_args.clone()).await?.print()
        }

        Command::Rejected => commands::rejected(Config::load(home).await?)
            .await?
            .print(),

        Command::Attendance(attendance_args) => {
            let config = Config::load(home).await?.with_grouping(grouping);
            commands::attendance(config, attendance_args.date())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
