use std::path::Path;

use anyhow::{Context, Result};

use fahtrace_engine::{ClientSources, reconcile};
use fahtrace_log::LogDialect;

use crate::output;

pub fn handle(dir: &Path, dialect: Option<LogDialect>, json: bool) -> Result<()> {
    let sources = ClientSources::discover(dir)
        .ok_or_else(|| anyhow::anyhow!("no FAHlog.txt under {}", dir.display()))?
        .with_dialect(dialect);

    let reconciliation = reconcile(&sources)
        .with_context(|| format!("reconciling {}", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reconciliation)?);
    } else {
        output::print_reconciliation(&reconciliation);
    }
    Ok(())
}
