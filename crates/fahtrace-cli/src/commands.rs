use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::handlers;

pub fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse { log, dialect, json } => {
            handlers::parse::handle(&log, dialect.resolve(), json)
        }
        Commands::Aggregate { dir, dialect, json } => {
            handlers::aggregate::handle(&dir, dialect.resolve(), json)
        }
        Commands::Scan { root, roster, json } => {
            handlers::scan::handle(root.as_deref(), roster.as_deref(), json)
        }
    }
}

/// Library crates log through `tracing`; route it to stderr so piped
/// stdout stays clean. RUST_LOG overrides the -v default.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
