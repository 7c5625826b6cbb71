mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::backtest::BacktestArgs;
use commands::history::HistoryArgs;
use commands::hospitality::HospitalityArgs;
use commands::ideas::IdeasCommand;
use commands::products::EtfArgs;
use commands::project::ProjectArgs;
use commands::real_estate::RealEstateArgs;

/// CAGR projections for the investment-ideas showcase
#[derive(Parser)]
#[command(
    name = "ideas",
    version,
    about = "CAGR projections for the investment-ideas showcase",
    long_about = "Net compound annual growth rate projections with decimal precision. \
                  Covers rental property, ETFs and bonds, hospitality businesses, \
                  historical backtests and the idea catalogue."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project net CAGR for a generic scenario read from JSON or YAML
    Project(ProjectArgs),
    /// Vacant vs let Catalonia rental property
    RealEstate(RealEstateArgs),
    /// ETF and bond lump-sum projections
    Etf(EtfArgs),
    /// Pousada scenarios (property, business and combined)
    Hospitality(HospitalityArgs),
    /// Replay historical index returns from an entry year
    Backtest(BacktestArgs),
    /// Print the built-in historical series
    History(HistoryArgs),
    /// Browse or edit the idea catalogue
    #[command(subcommand)]
    Ideas(IdeasCommand),
    /// Print version information
    Version,
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::project::run_project(args),
        Commands::RealEstate(args) => commands::real_estate::run_real_estate(args),
        Commands::Etf(args) => commands::products::run_etf(args),
        Commands::Hospitality(args) => commands::hospitality::run_hospitality(args),
        Commands::Backtest(args) => commands::backtest::run_backtest(args),
        Commands::History(args) => commands::history::run_history(args),
        Commands::Ideas(command) => commands::ideas::run_ideas(command),
        Commands::Version => {
            println!("ideas {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ideas", "backtest", "--entry-year", "2008", "--output", "csv", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Csv));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Backtest(_)));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["ideas", "version", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_ideas_update_parses_patch_flags() {
        let cli = Cli::try_parse_from([
            "ideas",
            "ideas",
            "update",
            "productes-financers",
            "etf-msci-world",
            "--annual-return",
            "6-8%",
            "--store",
            "/tmp/catalog.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Ideas(commands::ideas::IdeasCommand::Update(args)) => {
                assert_eq!(args.annual_return.as_deref(), Some("6-8%"));
                assert_eq!(args.store.store, "/tmp/catalog.json");
            }
            _ => panic!("expected ideas update"),
        }
    }
}
