use std::path::Path;

use anyhow::{Context, Result};

use fahtrace_log::{FahLog, LogDialect};

use crate::output;

pub fn handle(log_path: &Path, dialect: Option<LogDialect>, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(log_path)
        .with_context(|| format!("reading {}", log_path.display()))?;
    let dialect = dialect.unwrap_or_else(|| LogDialect::detect(&text));
    let log = FahLog::read(dialect, &text);

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        output::print_log(&log);
    }
    Ok(())
}
