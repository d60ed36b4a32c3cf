use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use walkdir::WalkDir;

use fahtrace_engine::{ClientSources, reconcile};
use fahtrace_types::{ProjectInfo, SlotStatus};

use crate::config::Roster;
use crate::output::Palette;

/// One scanned client, as emitted by `--json`.
#[derive(Debug, Serialize)]
struct ClientReport {
    name: String,
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ClientSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClientSummary {
    status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectInfo>,
    frames_observed: u32,
    completed_units: u32,
    failed_units: u32,
    diagnostics: usize,
}

pub fn handle(root: Option<&Path>, roster_path: Option<&Path>, json: bool) -> Result<()> {
    let root = root.unwrap_or(Path::new("."));
    let roster_path = roster_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join("fahtrace.toml"));
    let roster = Roster::load_from(&roster_path)?;

    let mut reports = Vec::new();
    let mut covered: BTreeSet<PathBuf> = BTreeSet::new();

    // Roster clients first, in roster order. A named client that has no
    // log is reported, not silently skipped.
    for client in &roster.clients {
        covered.insert(client.path.clone());
        let report = match ClientSources::discover(&client.path) {
            Some(sources) => {
                report_for(&client.name, &client.path, sources.with_dialect(client.dialect))
            }
            None => ClientReport {
                name: client.name.clone(),
                path: client.path.clone(),
                summary: None,
                error: Some("no FAHlog.txt".to_string()),
            },
        };
        reports.push(report);
    }

    // Then every directory under the root holding a FAHlog.txt.
    for entry in WalkDir::new(root).into_iter().filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_file() || entry.file_name() != "FAHlog.txt" {
            continue;
        }
        let Some(dir) = entry.path().parent().map(Path::to_path_buf) else {
            continue;
        };
        if !covered.insert(dir.clone()) {
            continue;
        }
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        if let Some(sources) = ClientSources::discover(&dir) {
            reports.push(report_for(&name, &dir, sources));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("no client directories under {}", root.display());
        return Ok(());
    }

    let palette = Palette::auto();
    for report in &reports {
        print_report(report, &palette);
    }
    Ok(())
}

fn report_for(name: &str, path: &Path, sources: ClientSources) -> ClientReport {
    match reconcile(&sources) {
        Ok(reconciliation) => {
            let result = &reconciliation.result;
            let current = result.current_unit();
            ClientReport {
                name: name.to_string(),
                path: path.to_path_buf(),
                summary: Some(ClientSummary {
                    status: result.status,
                    project: current.and_then(|info| info.project_info),
                    frames_observed: current.map(|info| info.frames_observed).unwrap_or(0),
                    completed_units: result.completed_units,
                    failed_units: result.failed_units,
                    diagnostics: reconciliation.diagnostics.len(),
                }),
                error: None,
            }
        }
        Err(err) => ClientReport {
            name: name.to_string(),
            path: path.to_path_buf(),
            summary: None,
            error: Some(err.to_string()),
        },
    }
}

fn print_report(report: &ClientReport, palette: &Palette) {
    match (&report.summary, &report.error) {
        (Some(summary), _) => {
            let project = summary
                .project
                .map(|project| project.tag())
                .unwrap_or_else(|| "-".to_string());
            let mut line = format!(
                "{:<16} {:<22} {:<14} frames {}",
                report.name, summary.status, project, summary.frames_observed
            );
            if summary.diagnostics > 0 {
                line.push_str(&format!("  ({} diagnostics)", summary.diagnostics));
            }
            println!("{}", line);
        }
        (None, Some(error)) => {
            println!(
                "{:<16} {}",
                report.name,
                format!("error: {}", error).style(palette.bad)
            );
        }
        (None, None) => {}
    }
}
