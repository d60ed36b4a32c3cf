//! Line-by-line builders for synthetic FAHlog.txt text in both dialects.
//!
//! Every method appends lines in the exact shape the matching client
//! version writes, so tests exercise the real grammars rather than
//! hand-trimmed copies of field logs.

use std::fmt::Write as _;
use std::path::Path;

use fahtrace_types::ProjectInfo;

/// Builder for v5/v6 console client logs (`[hh:mm:ss]` bracket stamps).
#[derive(Debug, Clone, Default)]
pub struct LegacyLogFixture {
    lines: Vec<String>,
}

impl LegacyLogFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The run boundary: `--- Opening Log file [December 6 06:31:44 UTC]`.
    /// `stamp` is the yearless date, e.g. `"December 6 06:31:44"`.
    pub fn open_log(mut self, stamp: &str) -> Self {
        self.lines.push(format!("--- Opening Log file [{stamp} UTC]"));
        self
    }

    pub fn client_version(mut self, version: &str) -> Self {
        self.lines.push(format!(
            "                       Folding@Home Client Version {version}"
        ));
        self
    }

    pub fn arguments(mut self, arguments: &str) -> Self {
        self.lines.push(format!("Arguments: {arguments}"));
        self
    }

    /// The three identity lines the client prints after its banner.
    pub fn identity(mut self, time: &str, name: &str, team: u32, user_id: &str, machine_id: u32) -> Self {
        self.lines
            .push(format!("[{time}] - User name: {name} (Team {team})"));
        self.lines.push(format!("[{time}] - User ID: {user_id}"));
        self.lines.push(format!("[{time}] - Machine ID: {machine_id}"));
        self
    }

    /// The claim: processing notice, queue-slot line, working marker.
    /// `stamp` repeats the yearless date the claim line carries.
    pub fn claim(mut self, time: &str, queue_index: u32, stamp: &str) -> Self {
        self.lines.push(format!("[{time}] + Processing work unit"));
        self.lines.push(format!(
            "[{time}] Working on queue slot {queue_index:02} [{stamp} UTC]"
        ));
        self.lines.push(format!("[{time}] + Working ..."));
        self
    }

    /// The older claim shape v5 clients wrote.
    pub fn claim_unit(mut self, time: &str, queue_index: u32, stamp: &str) -> Self {
        self.lines
            .push(format!("[{time}] Working on Unit {queue_index:02} [{stamp}]"));
        self
    }

    pub fn core_version(mut self, time: &str, version: &str) -> Self {
        self.lines.push(format!("[{time}] *------------------------------*"));
        self.lines
            .push(format!("[{time}] Version {version} (Mar 12, 2010)"));
        self
    }

    pub fn project(mut self, time: &str, project: ProjectInfo) -> Self {
        self.lines.push(format!("[{time}] {project}"));
        self
    }

    /// A steps-grammar frame line.
    pub fn frame(mut self, time: &str, complete: u32, total: u32, percent: u32) -> Self {
        self.lines.push(format!(
            "[{time}] Completed {complete} out of {total} steps  ({percent}%)"
        ));
        self
    }

    /// The GPU percent-only frame grammar.
    pub fn frame_percent(mut self, time: &str, percent: u32) -> Self {
        self.lines.push(format!("[{time}] Completed {percent}%"));
        self
    }

    pub fn core_shutdown(mut self, time: &str, literal: &str) -> Self {
        self.lines
            .push(format!("[{time}] Folding@home Core Shutdown: {literal}"));
        self
    }

    pub fn send_results(mut self, time: &str, stamp: &str) -> Self {
        self.lines.push(format!("[{time}] Sending work to server"));
        self.lines
            .push(format!("[{time}] + Attempting to send results [{stamp} UTC]"));
        self.lines
            .push(format!("[{time}] + Results successfully sent"));
        self
    }

    pub fn units_completed(mut self, time: &str, count: u32) -> Self {
        self.lines
            .push(format!("[{time}] + Number of Units Completed: {count}"));
        self
    }

    pub fn get_work_packet(mut self, time: &str) -> Self {
        self.lines
            .push(format!("[{time}] + Attempting to get work packet"));
        self
    }

    pub fn paused(mut self, time: &str) -> Self {
        self.lines.push(format!("[{time}] + Paused"));
        self
    }

    pub fn eue_pause(mut self, time: &str) -> Self {
        self.lines.push(format!("[{time}] + Paused for 24 hours."));
        self
    }

    pub fn shutdown(mut self, time: &str) -> Self {
        self.lines
            .push(format!("[{time}] Folding@Home Client Shutdown."));
        self
    }

    /// Any line verbatim, for noise and mangled-input cases.
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            let _ = writeln!(text, "{line}");
        }
        text
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        std::fs::write(path.as_ref(), self.build())?;
        Ok(())
    }
}

/// Builder for v7 daemon logs (`hh:mm:ss:WUnn:FSnn:` prefixes).
#[derive(Debug, Clone, Default)]
pub struct FahClientLogFixture {
    lines: Vec<String>,
}

impl FahClientLogFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The run boundary banner. `stamp` is ISO 8601
    /// (`2012-01-11T03:24:22Z`) or the pre-1.38 `dd/MMM/yyyy-HH:mm:ss`.
    pub fn log_started(mut self, stamp: &str) -> Self {
        self.lines.push(format!(
            "*********************** Log Started {stamp} ***********************"
        ));
        self
    }

    /// The startup header block: version, args, user, team.
    pub fn header(mut self, time: &str, version: &str, args: &str, user: &str, team: u32) -> Self {
        self.lines
            .push(format!("{time}:         Args: {args}"));
        self.lines
            .push(format!("{time}:      Version: {version}"));
        self.lines.push(format!("{time}:     User: {user}"));
        self.lines.push(format!("{time}:     Team: {team}"));
        self
    }

    pub fn starting(mut self, time: &str, wu: u32, fs: u32) -> Self {
        self.lines
            .push(format!("{time}:WU{wu:02}:FS{fs:02}:Starting"));
        self
    }

    /// The pre-1.38 claim shape, which carries no slot coordinate.
    pub fn starting_unit(mut self, time: &str, wu: u32) -> Self {
        self.lines.push(format!("{time}:Starting Unit {wu:02}"));
        self
    }

    pub fn project(mut self, time: &str, wu: u32, fs: u32, core: &str, project: ProjectInfo) -> Self {
        self.lines
            .push(format!("{time}:WU{wu:02}:FS{fs:02}:{core}:{project}"));
        self
    }

    pub fn core_version(mut self, time: &str, wu: u32, fs: u32, core: &str, version: &str) -> Self {
        self.lines.push(format!(
            "{time}:WU{wu:02}:FS{fs:02}:{core}:Version: {version} (Dec. 15, 2010)"
        ));
        self
    }

    pub fn frame(
        mut self,
        time: &str,
        wu: u32,
        fs: u32,
        core: &str,
        complete: u32,
        total: u32,
        percent: u32,
    ) -> Self {
        self.lines.push(format!(
            "{time}:WU{wu:02}:FS{fs:02}:{core}:Completed {complete} out of {total} steps  ({percent}%)"
        ));
        self
    }

    pub fn frame_percent(mut self, time: &str, wu: u32, fs: u32, core: &str, percent: u32) -> Self {
        self.lines.push(format!(
            "{time}:WU{wu:02}:FS{fs:02}:{core}:Completed {percent}%"
        ));
        self
    }

    pub fn core_return(mut self, time: &str, wu: u32, fs: u32, literal: &str, code: u32) -> Self {
        self.lines.push(format!(
            "{time}:WU{wu:02}:FS{fs:02}:FahCore returned: {literal} ({code} = {code:#x})"
        ));
        self
    }

    pub fn cleaning_up(mut self, time: &str, wu: u32, fs: u32) -> Self {
        self.lines
            .push(format!("{time}:WU{wu:02}:FS{fs:02}:Cleaning up"));
        self
    }

    pub fn paused(mut self, time: &str, fs: u32) -> Self {
        self.lines.push(format!("{time}:FS{fs:02}:Paused"));
        self
    }

    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            let _ = writeln!(text, "{line}");
        }
        text
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        std::fs::write(path.as_ref(), self.build())?;
        Ok(())
    }
}
