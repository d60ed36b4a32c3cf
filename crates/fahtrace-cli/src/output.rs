//! Text renderers for the parse and aggregate views. Colors are applied
//! only when stdout is a terminal.

use is_terminal::IsTerminal;
use owo_colors::{OwoColorize, Style};

use fahtrace_engine::{AggregatedUnitInfo, Reconciliation};
use fahtrace_log::FahLog;
use fahtrace_types::WorkUnitResult;

pub struct Palette {
    pub header: Style,
    pub good: Style,
    pub bad: Style,
    pub dim: Style,
    pub mark: Style,
}

impl Palette {
    pub fn auto() -> Self {
        if std::io::stdout().is_terminal() {
            Palette {
                header: Style::new().bold(),
                good: Style::new().green(),
                bad: Style::new().red(),
                dim: Style::new().dimmed(),
                mark: Style::new().cyan().bold(),
            }
        } else {
            Palette {
                header: Style::new(),
                good: Style::new(),
                bad: Style::new(),
                dim: Style::new(),
                mark: Style::new(),
            }
        }
    }

    fn result(&self, result: WorkUnitResult) -> Style {
        if result.is_completed() {
            self.good
        } else if result.is_failed() {
            self.bad
        } else {
            self.dim
        }
    }
}

pub fn print_log(log: &FahLog) {
    let palette = Palette::auto();

    for (number, run) in log.client_runs.iter().enumerate() {
        let heading = format!(
            "Run {} started {} UTC  lines {}",
            number + 1,
            run.data.start_time.format("%Y-%m-%d %H:%M:%S"),
            run.line_span
        );
        println!("{}", heading.style(palette.header));

        if let Some(version) = &run.data.client_version {
            println!("  client {}", version);
        }
        if let Some(arguments) = &run.data.arguments {
            println!("  arguments {}", arguments);
        }
        if let Some(name) = &run.data.folding_id {
            match run.data.team {
                Some(team) => println!("  user {} (team {})", name, team),
                None => println!("  user {}", name),
            }
        }

        for (slot, slot_run) in &run.slot_runs {
            println!(
                "  slot {:02}  {}  {} completed, {} failed",
                slot, slot_run.data.status, slot_run.data.completed_units, slot_run.data.failed_units
            );
            for unit in &slot_run.unit_runs {
                let project = match unit.data.project_info() {
                    Some(project) => project.to_string(),
                    None => "no project line".to_string(),
                };
                println!(
                    "    unit {:02}  {}  frames {}  {}  lines {}",
                    unit.queue_index,
                    project,
                    unit.data.frames_observed,
                    unit.data.work_unit_result.style(palette.result(unit.data.work_unit_result)),
                    unit.line_span
                );
            }
        }
        println!();
    }

    let anomalies: Vec<_> = log.anomalies().collect();
    if !anomalies.is_empty() {
        println!("{}", format!("{} anomalies", anomalies.len()).style(palette.bad));
        for line in anomalies {
            if let Some(anomaly) = &line.anomaly {
                println!("  line {}: {}", line.index, anomaly.message);
            }
        }
    }
}

pub fn print_reconciliation(reconciliation: &Reconciliation) {
    let palette = Palette::auto();
    let result = &reconciliation.result;

    println!(
        "{}",
        format!(
            "Client run started {} UTC",
            result.start_time.format("%Y-%m-%d %H:%M:%S")
        )
        .style(palette.header)
    );
    if let Some(version) = &result.client_version {
        println!("  client {}", version);
    }
    if let Some(arguments) = &result.arguments {
        println!("  arguments {}", arguments);
    }
    println!(
        "  status {}   completed {}  failed {}{}",
        result.status,
        result.completed_units,
        result.failed_units,
        result
            .total_completed_units
            .map(|total| format!("  lifetime {}", total))
            .unwrap_or_default()
    );
    println!();

    for (index, position) in result.unit_infos.iter().enumerate() {
        let marker = if index == result.current_unit_index {
            format!("{}", ">".style(palette.mark))
        } else {
            " ".to_string()
        };
        match position {
            None => println!(" {} {:02}  {}", marker, index, "-".style(palette.dim)),
            Some(info) => println!(" {} {:02}  {}", marker, index, unit_line(info, &palette)),
        }
    }

    if !reconciliation.diagnostics.is_empty() {
        println!();
        println!("{}", "diagnostics:".style(palette.bad));
        for diagnostic in &reconciliation.diagnostics {
            println!("  - {}", diagnostic);
        }
    }
}

fn unit_line(info: &AggregatedUnitInfo, palette: &Palette) -> String {
    let project = match &info.project_info {
        Some(project) => project.to_string(),
        None => "unknown project".to_string(),
    };
    let mut line = format!(
        "{}  core {} ({})  frames {}  {}",
        project,
        info.core_id,
        info.slot_type,
        info.frames_observed,
        info.unit_result.style(palette.result(info.unit_result))
    );
    if let Some(progress) = info.progress {
        line.push_str(&format!("  {}%", progress));
    }
    if let Some(name) = &info.protein_name {
        line.push_str(&format!("  {}", name));
    }
    line
}
