use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use fahtrace_log::LogDialect;

#[derive(Parser)]
#[command(name = "fahtrace")]
#[command(about = "Inspect and reconcile Folding@home classic client telemetry", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one FAHlog.txt and show its run/slot/unit tree
    Parse {
        /// Path to the log file
        log: PathBuf,

        #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
        dialect: DialectArg,

        /// Emit the parsed log as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconcile one client data directory into its unit view
    Aggregate {
        /// Directory holding FAHlog.txt (queue.dat and unitinfo.txt optional)
        dir: PathBuf,

        #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
        dialect: DialectArg,

        /// Emit the reconciliation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Walk a directory tree and summarize every client directory found
    Scan {
        /// Root to walk (defaults to the current directory)
        root: Option<PathBuf>,

        /// Roster file naming clients explicitly
        /// (defaults to fahtrace.toml under the root)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Emit the summaries as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Which log grammar to read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Sniff the grammar from the log text
    Auto,
    /// v5/v6 console client
    Legacy,
    /// v7 FahClient daemon
    Fahclient,
}

impl DialectArg {
    /// `None` means let the reader sniff.
    pub fn resolve(self) -> Option<LogDialect> {
        match self {
            DialectArg::Auto => None,
            DialectArg::Legacy => Some(LogDialect::Legacy),
            DialectArg::Fahclient => Some(LogDialect::FahClient),
        }
    }
}
