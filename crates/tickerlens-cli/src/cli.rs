//! CLI argument definitions.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Trend, moving average and volatility for one symbol |
//! | `bars` | Raw daily bars, newest first |
//! | `search` | Symbol lookup through the cached directory |
//! | `symbols` | Inspect or reset the cached symbol listing |
//!
//! # Examples
//!
//! ```bash
//! tickerlens analyze IBM --format table
//! tickerlens bars TSCO.LON --limit 20 --pretty
//! tickerlens search tesla --limit 5
//! tickerlens --offline analyze AAPL --window 10
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

use tickerlens_core::MAX_DAILY_BARS;

#[derive(Debug, Parser)]
#[command(
    name = "tickerlens",
    author,
    version,
    about = "End-of-day stock dashboard: trend, moving average and volatility"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Use deterministic offline data instead of calling Alpha Vantage.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Request timeout in milliseconds. Overrides TICKERLENS_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a daily series and show its trend, moving average and volatility.
    ///
    ///   tickerlens analyze IBM
    ///   tickerlens analyze MSFT --window 10 --limit 60
    Analyze(AnalyzeArgs),

    /// Fetch raw daily bars, newest first.
    Bars(BarsArgs),

    /// Search symbols and company names.
    Search(SearchArgs),

    /// Inspect or reset the cached symbol listing.
    Symbols(SymbolsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    pub symbol: String,

    /// Moving-average window in trading days. Overrides TICKERLENS_MA_WINDOW.
    #[arg(long)]
    pub window: Option<usize>,

    /// Number of most recent bars to analyze.
    #[arg(long, default_value_t = MAX_DAILY_BARS)]
    pub limit: usize,
}

#[derive(Debug, Clone, Args)]
pub struct BarsArgs {
    pub symbol: String,

    #[arg(long, default_value_t = 30)]
    pub limit: usize,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    pub query: String,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Clone, Args)]
pub struct SymbolsArgs {
    #[command(subcommand)]
    pub command: SymbolsCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SymbolsCommand {
    /// List cached symbols in symbol order.
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Delete the cached listing.
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tickerlens",
            "analyze",
            "IBM",
            "--window",
            "5",
            "--format",
            "table",
            "--offline",
        ])
        .expect("parses");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.offline);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.symbol, "IBM");
                assert_eq!(args.window, Some(5));
                assert_eq!(args.limit, MAX_DAILY_BARS);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_symbols_subcommands() {
        let cli = Cli::try_parse_from(["tickerlens", "symbols", "list", "--limit", "3"])
            .expect("parses");
        assert!(matches!(
            cli.command,
            Command::Symbols(SymbolsArgs {
                command: SymbolsCommand::List { limit: 3 }
            })
        ));

        let cli = Cli::try_parse_from(["tickerlens", "symbols", "clear"]).expect("parses");
        assert!(matches!(
            cli.command,
            Command::Symbols(SymbolsArgs {
                command: SymbolsCommand::Clear
            })
        ));
    }
}
