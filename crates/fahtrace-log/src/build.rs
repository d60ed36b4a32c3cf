//! Single forward pass that raises classified lines into the run tree.

use std::collections::BTreeMap;
use std::mem;

use chrono::{DateTime, NaiveTime};
use tracing::debug;

use fahtrace_types::{SlotStatus, UnitFrame, WorkUnitResult};

use crate::line::{LineAnomaly, LineData, LineType, LogDialect, LogLine, UnitAddress};
use crate::timestamp;
use crate::tree::{ClientRun, ClientRunData, FahLog, SlotRun, UnitRun};

pub(crate) fn build(dialect: LogDialect, text: &str) -> FahLog {
    let mut lines: Vec<LogLine> = text
        .lines()
        .enumerate()
        .map(|(index, raw)| LogLine::read(dialect, index as u32, raw))
        .collect();

    let mut builder = TreeBuilder::new();
    for index in 0..lines.len() {
        if let Some(anomaly) = builder.apply(&lines[index]) {
            let line = &mut lines[index];
            // a parse anomaly already on the line wins over a structural one
            if line.anomaly.is_none() {
                line.anomaly = Some(anomaly);
            }
        }
    }
    let client_runs = builder.finish(lines.len() as u32);

    FahLog {
        dialect,
        lines,
        client_runs,
    }
}

struct TreeBuilder {
    runs: Vec<ClientRun>,
    current: Option<RunState>,
    /// Identity lines seen before any run. Adopted if a synthetic run opens.
    staged: ClientRunData,
}

struct RunState {
    run: ClientRun,
    /// Slots whose top-of-stack unit is still open.
    open: BTreeMap<u32, bool>,
    /// A `Processing work unit` line waiting for its claim.
    pending_claim: Option<(u32, Option<NaiveTime>)>,
}

impl RunState {
    fn new(run: ClientRun) -> Self {
        Self {
            run,
            open: BTreeMap::new(),
            pending_claim: None,
        }
    }

    fn slot_mut(&mut self, folding_slot: u32) -> &mut SlotRun {
        self.run
            .slot_runs
            .entry(folding_slot)
            .or_insert_with(|| SlotRun::new(folding_slot))
    }

    fn is_open(&self, folding_slot: u32) -> bool {
        self.open.get(&folding_slot).copied().unwrap_or(false)
    }

    fn open_unit_mut(&mut self, folding_slot: u32) -> Option<&mut UnitRun> {
        if !self.is_open(folding_slot) {
            return None;
        }
        self.run
            .slot_runs
            .get_mut(&folding_slot)
            .and_then(|slot_run| slot_run.unit_runs.last_mut())
    }

    /// Fix the span end of every still-open unit, e.g. at a run boundary.
    fn seal_open_units(&mut self, end_line: u32) {
        for (slot, open) in &self.open {
            if *open
                && let Some(unit) = self
                    .run
                    .slot_runs
                    .get_mut(slot)
                    .and_then(|slot_run| slot_run.unit_runs.last_mut())
            {
                unit.line_span.end = end_line;
            }
        }
    }
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            runs: Vec::new(),
            current: None,
            staged: ClientRunData::new(DateTime::UNIX_EPOCH),
        }
    }

    fn apply(&mut self, line: &LogLine) -> Option<LineAnomaly> {
        let index = line.index;
        match (line.line_type, line.data.as_ref()) {
            (LineType::LogOpen, data) => {
                let start_time = match data {
                    Some(LineData::LogOpen { start_time }) => *start_time,
                    _ => DateTime::UNIX_EPOCH,
                };
                self.close_run(index);
                self.current = Some(RunState::new(ClientRun::new(
                    index,
                    ClientRunData::new(start_time),
                )));
                None
            }
            (LineType::ClientVersion, Some(LineData::ClientVersion { version })) => {
                self.run_data().client_version = Some(version.clone());
                None
            }
            (LineType::ClientArguments, Some(LineData::Arguments { arguments })) => {
                self.run_data().arguments = Some(arguments.clone());
                None
            }
            (
                LineType::ClientUserNameAndTeam,
                Some(LineData::UserNameAndTeam { folding_id, team }),
            ) => {
                let data = self.run_data();
                if let Some(folding_id) = folding_id {
                    data.folding_id = Some(folding_id.clone());
                }
                if let Some(team) = team {
                    data.team = Some(*team);
                }
                None
            }
            (
                LineType::ClientUserId | LineType::ClientReceivedUserId,
                Some(LineData::UserId { user_id }),
            ) => {
                self.run_data().user_id = Some(user_id.clone());
                None
            }
            (LineType::ClientMachineId, Some(LineData::MachineId { machine_id })) => {
                self.run_data().machine_id = Some(*machine_id);
                None
            }
            (LineType::ClientNumberOfUnitsCompleted, Some(LineData::UnitsCompleted { count })) => {
                // printed by the single-slot legacy client only
                if let Some(state) = self.current.as_mut() {
                    state.slot_mut(0).data.total_completed_units = Some(*count);
                }
                None
            }
            (LineType::WorkUnitProcessing, _) => {
                let stamp = line.time_of_day();
                let state = self.ensure_run();
                state.pending_claim = Some((index, stamp));
                None
            }
            (LineType::WorkUnitWorking, Some(LineData::UnitClaim { address })) => {
                self.handle_claim(index, *address, line.time_of_day());
                None
            }
            (LineType::WorkUnitCoreVersion, Some(LineData::CoreVersion { version, address })) => {
                let version = *version;
                self.mutate_open_unit(address.as_ref(), move |unit| {
                    unit.data.core_version = version;
                })
            }
            (LineType::WorkUnitProject, Some(LineData::Project { project, address })) => {
                let project = *project;
                self.mutate_open_unit(address.as_ref(), move |unit| {
                    unit.data.project_infos.push(project);
                })
            }
            (LineType::WorkUnitFrame, Some(LineData::Frame { frame, address })) => {
                let frame = *frame;
                let anomaly = self.mutate_open_unit(address.as_ref(), move |unit| {
                    let duration = match unit.data.current_frame.as_ref() {
                        Some(prev) => timestamp::frame_delta(prev.time_of_day, frame.time_of_day),
                        None => chrono::Duration::zero(),
                    };
                    unit.data.current_frame = Some(UnitFrame {
                        id: frame.id,
                        raw_frames_complete: frame.raw_frames_complete,
                        raw_frames_total: frame.raw_frames_total,
                        time_of_day: frame.time_of_day,
                        duration_secs: duration.num_seconds(),
                    });
                    unit.data.frames_observed += 1;
                });
                if anomaly.is_none() {
                    self.set_slot_status(address_slot(address.as_ref()), SlotStatus::RunningNoFrameTimes);
                }
                anomaly
            }
            (
                LineType::WorkUnitCoreShutdown
                | LineType::WorkUnitCoreReturn
                | LineType::ClientCoreCommunicationsError,
                Some(LineData::UnitResult { result, address }),
            ) => self.handle_result(*result, address.as_ref()),
            (LineType::WorkUnitCleaningUp, Some(LineData::CleaningUp { address })) => {
                self.handle_cleanup(index, *address)
            }
            (LineType::WorkUnitRunning, data) => {
                self.ensure_run();
                self.set_slot_status(data_slot(data), SlotStatus::RunningNoFrameTimes);
                None
            }
            (LineType::WorkUnitPaused | LineType::WorkUnitPausedForBattery, data) => {
                self.ensure_run();
                self.set_slot_status(data_slot(data), SlotStatus::Paused);
                None
            }
            (LineType::WorkUnitResumeFromBattery, data) => {
                self.ensure_run();
                self.set_slot_status(data_slot(data), SlotStatus::RunningNoFrameTimes);
                None
            }
            (LineType::ClientAttemptGetWorkPacket, data) => {
                self.set_slot_status(data_slot(data), SlotStatus::GettingWorkPacket);
                None
            }
            (
                LineType::ClientSendWorkToServer
                | LineType::ClientSendStart
                | LineType::ClientSendComplete,
                data,
            ) => {
                self.set_slot_status(data_slot(data), SlotStatus::SendingWorkPacket);
                None
            }
            (LineType::ClientEuePause, _) => {
                self.set_slot_status(0, SlotStatus::EuePause);
                None
            }
            (LineType::ClientShutdown | LineType::ClientCoreCommunicationsErrorShutdown, _) => {
                self.set_all_slots_status(SlotStatus::Stopped);
                None
            }
            _ => None,
        }
    }

    /// The current run, synthesizing one for logs whose head was truncated
    /// away. The synthetic run spans from line 0 and starts at the epoch.
    fn ensure_run(&mut self) -> &mut RunState {
        let staged = &mut self.staged;
        self.current.get_or_insert_with(|| {
            debug!("work unit lines before any log banner, opening synthetic run");
            let data = mem::replace(staged, ClientRunData::new(DateTime::UNIX_EPOCH));
            RunState::new(ClientRun::new(0, data))
        })
    }

    fn run_data(&mut self) -> &mut ClientRunData {
        match self.current.as_mut() {
            Some(state) => &mut state.run.data,
            None => &mut self.staged,
        }
    }

    fn close_run(&mut self, end_line: u32) {
        if let Some(mut state) = self.current.take() {
            state.seal_open_units(end_line);
            state.run.line_span.end = end_line;
            self.runs.push(state.run);
        }
    }

    fn handle_claim(&mut self, index: u32, address: UnitAddress, stamp: Option<NaiveTime>) {
        let slot = address.folding_slot.unwrap_or(0);
        let state = self.ensure_run();
        let pending = state.pending_claim.take();
        let was_open = state.is_open(slot);
        let slot_run = state.slot_mut(slot);

        if was_open && let Some(top) = slot_run.unit_runs.last_mut() {
            if top.queue_index == address.queue_index
                && top.data.work_unit_result == WorkUnitResult::Unknown
            {
                // the same unit resuming, not a new attempt
                slot_run.data.status = SlotStatus::RunningNoFrameTimes;
                return;
            }
            top.line_span.end = pending.map_or(index, |(processing, _)| processing);
        }

        let (start_line, start_stamp) = match pending {
            Some((processing, processing_stamp)) => (processing, processing_stamp.or(stamp)),
            None => (index, stamp),
        };
        let mut unit = UnitRun::new(address.queue_index, start_line);
        unit.data.unit_start_time_stamp = start_stamp;
        slot_run.unit_runs.push(unit);
        slot_run.data.status = SlotStatus::RunningNoFrameTimes;
        state.open.insert(slot, true);
    }

    fn mutate_open_unit(
        &mut self,
        address: Option<&UnitAddress>,
        mutate: impl FnOnce(&mut UnitRun),
    ) -> Option<LineAnomaly> {
        let slot = address_slot(address);
        let state = self.ensure_run();
        let Some(unit) = state.open_unit_mut(slot) else {
            debug!(slot, "unit line with no open work unit");
            return Some(LineAnomaly::new(format!("no open work unit on slot {slot}")));
        };
        if let Some(address) = address
            && address.queue_index != unit.queue_index
        {
            debug!(
                declared = address.queue_index,
                active = unit.queue_index,
                slot,
                "unit index mismatch, line ignored"
            );
            return Some(LineAnomaly::new(format!(
                "line addresses unit {:02} but unit {:02} is active on slot {}",
                address.queue_index, unit.queue_index, slot
            )));
        }
        mutate(unit);
        None
    }

    fn handle_result(
        &mut self,
        result: WorkUnitResult,
        address: Option<&UnitAddress>,
    ) -> Option<LineAnomaly> {
        let slot = address_slot(address);
        let state = self.ensure_run();
        if !state.is_open(slot) {
            return Some(LineAnomaly::new(format!(
                "result line with no open work unit on slot {slot}"
            )));
        }
        let Some(slot_run) = state.run.slot_runs.get_mut(&slot) else {
            return Some(LineAnomaly::new(format!(
                "result line with no open work unit on slot {slot}"
            )));
        };
        let Some(unit) = slot_run.unit_runs.last_mut() else {
            return Some(LineAnomaly::new(format!(
                "result line with no open work unit on slot {slot}"
            )));
        };
        if let Some(address) = address
            && address.queue_index != unit.queue_index
        {
            return Some(LineAnomaly::new(format!(
                "result addresses unit {:02} but unit {:02} is active on slot {}",
                address.queue_index, unit.queue_index, slot
            )));
        }
        let previous = unit.data.work_unit_result;
        if previous == result {
            // shutdown and return lines both report; count once
            return None;
        }
        unit.data.work_unit_result = result;

        let counters = &mut slot_run.data;
        if previous.is_completed() {
            counters.completed_units = counters.completed_units.saturating_sub(1);
        } else if previous.is_failed() {
            counters.failed_units = counters.failed_units.saturating_sub(1);
        }
        if result.is_completed() {
            counters.completed_units += 1;
        } else if result.is_failed() {
            counters.failed_units += 1;
        }
        None
    }

    fn handle_cleanup(&mut self, index: u32, address: UnitAddress) -> Option<LineAnomaly> {
        let slot = address.folding_slot.unwrap_or(0);
        let state = self.ensure_run();
        let Some(unit) = state.open_unit_mut(slot) else {
            return Some(LineAnomaly::new(format!(
                "cleanup line with no open work unit on slot {slot}"
            )));
        };
        if address.queue_index != unit.queue_index {
            return Some(LineAnomaly::new(format!(
                "cleanup addresses unit {:02} but unit {:02} is active on slot {}",
                address.queue_index, unit.queue_index, slot
            )));
        }
        unit.line_span.end = index + 1;
        state.open.insert(slot, false);
        None
    }

    /// Set a slot's status, creating the slot run. No-op before any run.
    fn set_slot_status(&mut self, folding_slot: u32, status: SlotStatus) {
        if let Some(state) = self.current.as_mut() {
            state.slot_mut(folding_slot).data.status = status;
        }
    }

    fn set_all_slots_status(&mut self, status: SlotStatus) {
        if let Some(state) = self.current.as_mut() {
            for slot_run in state.run.slot_runs.values_mut() {
                slot_run.data.status = status;
            }
        }
    }

    fn finish(mut self, total_lines: u32) -> Vec<ClientRun> {
        if let Some(mut state) = self.current.take() {
            state.seal_open_units(total_lines);
            state.run.line_span.end = total_lines;
            self.runs.push(state.run);
        }
        self.runs
    }
}

fn address_slot(address: Option<&UnitAddress>) -> u32 {
    address.and_then(|a| a.folding_slot).unwrap_or(0)
}

fn data_slot(data: Option<&LineData>) -> u32 {
    match data {
        Some(LineData::UnitClaim { address }) | Some(LineData::UnitActivity { address }) => {
            address_slot(Some(address))
        }
        Some(LineData::SlotActivity { folding_slot }) => *folding_slot,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fahtrace_types::ProjectInfo;

    fn legacy(lines: &[&str]) -> FahLog {
        build(LogDialect::Legacy, &lines.join("\n"))
    }

    fn fahclient(lines: &[&str]) -> FahLog {
        build(LogDialect::FahClient, &lines.join("\n"))
    }

    #[test]
    fn test_legacy_unit_lifecycle() {
        let log = legacy(&[
            "--- Opening Log file [September 7 23:11:31 UTC]",
            "[23:11:31] - User name: harlam357 (Team 32)",
            "[23:11:31] - Machine ID: 1",
            "[23:11:35] + Processing work unit",
            "[23:11:35] Working on queue slot 05 [September 7 23:11:35 UTC]",
            "[23:11:40] *------------------------------*",
            "[23:11:40] Version 1.90 (March 10, 2004)",
            "[23:11:44] Project: 2669 (Run 13, Clone 159, Gen 153)",
            "[23:19:02] Completed 2500 out of 250000 steps  (1%)",
            "[23:26:45] Completed 5000 out of 250000 steps  (2%)",
            "[06:01:10] Folding@home Core Shutdown: FINISHED_UNIT",
            "[06:01:15] + Attempting to send results",
        ]);

        assert_eq!(log.client_runs.len(), 1);
        let run = &log.client_runs[0];
        assert_eq!(run.line_span.start, 0);
        assert_eq!(run.line_span.end, 12);
        assert_eq!(run.data.folding_id.as_deref(), Some("harlam357"));
        assert_eq!(run.data.team, Some(32));
        assert_eq!(run.data.machine_id, Some(1));

        let slot = run.slot(0).unwrap();
        assert_eq!(slot.unit_runs.len(), 1);
        assert_eq!(slot.data.completed_units, 1);
        assert_eq!(slot.data.failed_units, 0);
        assert_eq!(slot.data.status, SlotStatus::SendingWorkPacket);

        let unit = &slot.unit_runs[0];
        assert_eq!(unit.queue_index, 5);
        // span starts at the Processing line and stays open to the end
        assert_eq!(unit.line_span.start, 3);
        assert_eq!(unit.line_span.end, 12);
        assert_eq!(unit.data.core_version, 1.9);
        assert_eq!(
            unit.data.project_info(),
            Some(&ProjectInfo::new(2669, 13, 159, 153))
        );
        assert_eq!(unit.data.frames_observed, 2);
        assert_eq!(unit.data.work_unit_result, WorkUnitResult::FinishedUnit);
        let frame = unit.data.current_frame.as_ref().unwrap();
        assert_eq!(frame.id, 2);
        assert_eq!(frame.duration_secs, 463);
    }

    #[test]
    fn test_new_claim_closes_previous_unit() {
        let log = legacy(&[
            "--- Opening Log file [September 7 23:11:31 UTC]",
            "[23:11:35] Working on queue slot 03 [September 7 23:11:35 UTC]",
            "[23:19:02] Completed 2500 out of 250000 steps  (1%)",
            "[04:41:52] Folding@home Core Shutdown: FINISHED_UNIT",
            "[04:42:00] + Processing work unit",
            "[04:42:01] Working on queue slot 04 [September 8 04:42:01 UTC]",
            "[04:50:30] Completed 2500 out of 250000 steps  (1%)",
        ]);

        let slot = log.client_runs[0].slot(0).unwrap();
        assert_eq!(slot.unit_runs.len(), 2);
        assert_eq!(slot.unit_runs[0].queue_index, 3);
        // closed where the next unit's Processing line begins
        assert_eq!(slot.unit_runs[0].line_span.end, 4);
        assert_eq!(slot.unit_runs[1].queue_index, 4);
        assert_eq!(slot.unit_runs[1].line_span.start, 4);
        assert_eq!(slot.unit_runs[1].line_span.end, 7);
    }

    #[test]
    fn test_same_index_reclaim_is_continuation() {
        let log = legacy(&[
            "--- Opening Log file [September 7 23:11:31 UTC]",
            "[23:11:35] Working on queue slot 05 [September 7 23:11:35 UTC]",
            "[23:19:02] Completed 2500 out of 250000 steps  (1%)",
            "[23:20:00] + Paused",
            "[23:40:00] Working on queue slot 05 [September 7 23:40:00 UTC]",
            "[23:48:15] Completed 5000 out of 250000 steps  (2%)",
        ]);

        let slot = log.client_runs[0].slot(0).unwrap();
        assert_eq!(slot.unit_runs.len(), 1);
        assert_eq!(slot.unit_runs[0].data.frames_observed, 2);
        assert_eq!(slot.data.status, SlotStatus::RunningNoFrameTimes);
    }

    #[test]
    fn test_fahclient_slots_interleave_independently() {
        let log = fahclient(&[
            "*********************** Log Started 2012-01-11T03:24:22Z ***********************",
            "03:25:32:WU00:FS00:Starting",
            "03:25:33:WU01:FS01:Starting",
            "03:25:40:WU00:FS00:0xa4:Project: 7610 (Run 630, Clone 0, Gen 59)",
            "03:25:41:WU01:FS01:0x11:Project: 5772 (Run 7, Clone 364, Gen 252)",
            "03:26:25:WU00:FS00:0xa4:Completed 20000 out of 2000000 steps  (1%)",
            "03:26:30:WU01:FS01:0x11:Completed 5%",
            "03:27:00:WU02:FS00:0xa4:Completed 40000 out of 2000000 steps  (2%)",
        ]);

        let run = &log.client_runs[0];
        let fs0 = run.slot(0).unwrap();
        let fs1 = run.slot(1).unwrap();
        assert_eq!(fs0.unit_runs.len(), 1);
        assert_eq!(fs1.unit_runs.len(), 1);
        assert_eq!(fs0.unit_runs[0].data.frames_observed, 1);
        assert_eq!(fs1.unit_runs[0].data.frames_observed, 1);
        assert_eq!(
            fs1.unit_runs[0].data.project_info(),
            Some(&ProjectInfo::new(5772, 7, 364, 252))
        );

        // the mismatched WU02 frame left FS00's unit untouched
        let mismatched = &log.lines[7];
        assert!(mismatched.anomaly.is_some());
        assert_eq!(fs0.unit_runs[0].data.raw_frames_complete(), Some(20000));
    }

    #[test]
    fn test_fahclient_cleanup_closes_and_result_counts_once() {
        let log = fahclient(&[
            "*********************** Log Started 2012-01-11T03:24:22Z ***********************",
            "03:25:32:WU00:FS01:Starting",
            "03:25:40:WU00:FS01:0xa4:Project: 7610 (Run 630, Clone 0, Gen 59)",
            "18:21:37:WU00:FS01:0xa4:Folding@home Core Shutdown: FINISHED_UNIT",
            "18:21:38:WU00:FS01:FahCore returned: FINISHED_UNIT (100 = 0x64)",
            "18:21:41:WU00:FS01:Cleaning up",
            "18:21:45:WU01:FS01:Starting",
        ]);

        let slot = log.client_runs[0].slot(1).unwrap();
        assert_eq!(slot.data.completed_units, 1);
        assert_eq!(slot.unit_runs.len(), 2);
        assert_eq!(slot.unit_runs[0].line_span.end, 6);
        assert_eq!(slot.unit_runs[1].queue_index, 1);
    }

    #[test]
    fn test_truncated_head_gets_synthetic_run() {
        let log = legacy(&[
            "[04:41:52] Completed 247500 out of 250000 steps  (99%)",
            "[04:46:45] Folding@home Core Shutdown: FINISHED_UNIT",
            "[04:47:00] + Processing work unit",
            "[04:47:01] Working on queue slot 08 [September 8 04:47:01 UTC]",
        ]);

        assert_eq!(log.client_runs.len(), 1);
        let run = &log.client_runs[0];
        assert_eq!(run.line_span.start, 0);
        assert_eq!(run.data.start_time, DateTime::UNIX_EPOCH);
        // the headless frame and result had no unit to land in
        assert!(log.lines[0].anomaly.is_some());
        assert!(log.lines[1].anomaly.is_some());
        let slot = run.slot(0).unwrap();
        assert_eq!(slot.unit_runs.len(), 1);
        assert_eq!(slot.unit_runs[0].queue_index, 8);
    }

    #[test]
    fn test_second_banner_rolls_the_run() {
        let log = legacy(&[
            "--- Opening Log file [September 7 23:11:31 UTC]",
            "[23:11:35] Working on queue slot 05 [September 7 23:11:35 UTC]",
            "[23:19:02] Completed 2500 out of 250000 steps  (1%)",
            "--- Opening Log file [September 8 10:00:00 UTC]",
            "[10:00:05] Working on queue slot 05 [September 8 10:00:05 UTC]",
        ]);

        assert_eq!(log.client_runs.len(), 2);
        assert_eq!(log.client_runs[0].line_span.end, 3);
        // the old run's open unit was sealed at the boundary
        let old_unit = &log.client_runs[0].slot(0).unwrap().unit_runs[0];
        assert_eq!(old_unit.line_span.end, 3);
        assert_eq!(log.client_runs[1].line_span.start, 3);
        assert_eq!(log.client_runs[1].line_span.end, 5);
    }

    #[test]
    fn test_clean_exit_stops_all_slots() {
        let log = fahclient(&[
            "*********************** Log Started 2012-01-11T03:24:22Z ***********************",
            "03:25:32:WU00:FS00:Starting",
            "03:25:33:WU01:FS01:Starting",
            "18:21:45:Clean exit",
        ]);

        let run = &log.client_runs[0];
        assert_eq!(run.slot(0).unwrap().data.status, SlotStatus::Stopped);
        assert_eq!(run.slot(1).unwrap().data.status, SlotStatus::Stopped);
    }

    #[test]
    fn test_eue_pause_status() {
        let log = legacy(&[
            "--- Opening Log file [September 7 23:11:31 UTC]",
            "[23:11:35] Working on queue slot 05 [September 7 23:11:35 UTC]",
            "[23:12:00] Folding@home Core Shutdown: UNSTABLE_MACHINE",
            "[23:12:01] EUE limit exceeded. Pausing 24 hours.",
        ]);

        let slot = log.client_runs[0].slot(0).unwrap();
        assert_eq!(slot.data.status, SlotStatus::EuePause);
        assert_eq!(slot.data.failed_units, 1);
    }
}
