use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "dietz")]
#[command(
    version,
    about = "Broker statement analyzer with cash-flow-adjusted performance"
)]
#[command(
    long_about = "Reconcile a broker statement's cash movements against its daily valuation series and derive cash-flow-adjusted performance: per-day gain/loss decomposition, Modified Dietz percentage and chained time-weighted return."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a statement: summary figures and optional daily breakdown
    Analyze {
        /// Path to the statement CSV file
        file: String,

        /// Start of the analysis range (YYYY-MM-DD, default: first snapshot)
        #[arg(long)]
        from: Option<String>,

        /// End of the analysis range (YYYY-MM-DD, default: last snapshot)
        #[arg(long)]
        to: Option<String>,

        /// Include the per-day gain/loss table
        #[arg(short, long)]
        daily: bool,
    },

    /// Show how each cash movement was aligned to the valuation series
    Movements {
        /// Path to the statement CSV file
        file: String,

        /// Start of the analysis range (YYYY-MM-DD, default: first snapshot)
        #[arg(long)]
        from: Option<String>,

        /// End of the analysis range (YYYY-MM-DD, default: last snapshot)
        #[arg(long)]
        to: Option<String>,
    },

    /// Inspect a statement file: header position, counts, date bounds
    Inspect {
        /// Path to the statement CSV file
        file: String,
    },
}
