use crate::commands::{run_match, run_refresh, run_sheets, MatchArgs, RefreshArgs, SheetsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use leadmatch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "leadmatch",
    about = "Match job ads against customer lists and export sales leads",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Match a job-ad source against customer lists and report the leads
    Match(MatchArgs),
    /// Fetch recent ads from the job-search API into the local dump
    Refresh(RefreshArgs),
    /// List the sheet names of an Excel workbook
    Sheets(SheetsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Match(args) => run_match(args),
        Command::Refresh(args) => run_refresh(args).await,
        Command::Sheets(args) => run_sheets(args),
    }
}
