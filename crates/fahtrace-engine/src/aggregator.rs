//! The reconciliation core: one pass over the ten queue positions (or the
//! current slot's unit stack when no queue exists) producing the fixed
//! array of unit records.

use tracing::debug;

use fahtrace_log::{ClientRun, FahLog, SlotRun, SnapshotInfo, UnitRun};
use fahtrace_queue::{QueueEntry, QueueSnapshot};
use fahtrace_types::{ProjectInfo, SlotStatus};

use crate::error::{AggregateError, AggregateResult};
use crate::model::{AggregatedUnitInfo, AggregationResult};

/// Fuse one parsed log with an optional queue and unitinfo snapshot.
///
/// The log drives everything: without at least one client run there is
/// nothing to reconcile and the call fails with [`AggregateError::EmptyLog`].
/// The queue fixes the record count at ten and supplies the cursor;
/// log-only aggregation reconstructs the current and previous unit from the
/// current slot's stack instead. Positions that cannot be corroborated stay
/// `None` rather than being guessed.
pub fn aggregate(
    log: &FahLog,
    queue: Option<&QueueSnapshot>,
    snapshot: Option<&SnapshotInfo>,
) -> AggregateResult<AggregationResult> {
    let current_run = log.current_run().ok_or(AggregateError::EmptyLog)?;
    let previous_run = log
        .client_runs
        .len()
        .checked_sub(2)
        .map(|index| &log.client_runs[index]);
    let current_slot = current_run
        .latest_active_slot()
        .and_then(|slot| current_run.slot(slot));

    let (mut unit_infos, current_unit_index) = match queue {
        Some(queue) => with_queue(current_run, previous_run, current_slot, queue),
        None => without_queue(current_run, current_slot),
    };

    if let Some(snapshot) = snapshot {
        // The snapshot only ever describes the unit being folded.
        if let Some(Some(info)) = unit_infos.get_mut(current_unit_index) {
            apply_snapshot(info, snapshot);
        }
    }

    let slot_data = current_slot.map(|slot| slot.data.clone()).unwrap_or_default();
    let current_record = unit_infos
        .get(current_unit_index)
        .and_then(|position| position.as_ref());

    // The builder never claims frame timing; upgrade once the current
    // unit's latest frame carries an observed duration.
    let mut status = slot_data.status;
    if status == SlotStatus::RunningNoFrameTimes
        && current_record
            .and_then(|info| info.current_frame)
            .is_some_and(|frame| frame.duration_secs > 0)
    {
        status = SlotStatus::Running;
    }

    let current_log_lines = current_record
        .and_then(|info| info.log_lines)
        .unwrap_or(current_run.line_span);

    debug!(
        positions = unit_infos.len(),
        current_unit_index,
        with_queue = queue.is_some(),
        "aggregated client telemetry"
    );

    Ok(AggregationResult {
        unit_infos,
        current_unit_index,
        start_time: current_run.data.start_time,
        arguments: current_run.data.arguments.clone(),
        client_version: current_run.data.client_version.clone(),
        user_id: current_run.data.user_id.clone(),
        machine_id: current_run.data.machine_id,
        status,
        completed_units: slot_data.completed_units,
        failed_units: slot_data.failed_units,
        total_completed_units: slot_data.total_completed_units,
        current_log_lines,
        queue: queue.cloned(),
    })
}

/// Ten positions, one per queue entry, resolved against the log.
fn with_queue(
    current_run: &ClientRun,
    previous_run: Option<&ClientRun>,
    current_slot: Option<&SlotRun>,
    queue: &QueueSnapshot,
) -> (Vec<Option<AggregatedUnitInfo>>, usize) {
    let cursor = queue.current_index;
    let mut unit_infos = Vec::with_capacity(queue.entries.len());

    for entry in &queue.entries {
        let index = entry.index;
        // Corroborated match: same claimed position and same project
        // tuple, most recent unit first, current run before the previous.
        let matched = find_unit(current_run, index, &entry.project_info)
            .map(|unit| (current_run, unit))
            .or_else(|| {
                previous_run
                    .and_then(|run| find_unit(run, index, &entry.project_info))
                    .map(|unit| (run_or(previous_run, current_run), unit))
            });

        let info = if let Some((run, unit)) = matched {
            Some(merge(entry, Some(unit), run))
        } else if index == cursor {
            // The cursor corroborates the claimed index on its own: the
            // log's project line may be missing or mangled, the position
            // still gets a record (queue + run identity only if even the
            // claim is absent).
            let unit = current_slot
                .and_then(|slot| slot.current_unit())
                .filter(|unit| unit.queue_index as usize == index);
            Some(merge(entry, unit, current_run))
        } else {
            None
        };
        unit_infos.push(info);
    }

    (unit_infos, cursor)
}

fn run_or<'a>(preferred: Option<&'a ClientRun>, fallback: &'a ClientRun) -> &'a ClientRun {
    preferred.unwrap_or(fallback)
}

/// Two positions from the current slot's stack: previous unit, then the
/// current one. The current position always holds a record, at minimum the
/// run identity.
fn without_queue(
    current_run: &ClientRun,
    current_slot: Option<&SlotRun>,
) -> (Vec<Option<AggregatedUnitInfo>>, usize) {
    let previous = current_slot
        .and_then(|slot| slot.previous_unit())
        .map(|unit| log_only(unit, current_run));
    let current = current_slot
        .and_then(|slot| slot.current_unit())
        .map(|unit| log_only(unit, current_run))
        .unwrap_or_else(|| identity_only(current_run));

    (vec![previous, Some(current)], 1)
}

/// Most-recent-first search for a unit that claimed `index` and printed
/// the entry's exact project tuple. A tuple-less entry corroborates
/// nothing.
fn find_unit<'a>(run: &'a ClientRun, index: usize, project: &ProjectInfo) -> Option<&'a UnitRun> {
    if project.is_unknown() {
        return None;
    }
    for slot in run.slot_runs.values() {
        for unit in slot.unit_runs.iter().rev() {
            if unit.queue_index as usize == index && unit.data.project_info() == Some(project) {
                return Some(unit);
            }
        }
    }
    None
}

/// Merge one queue entry with the unit run backing it, if any.
fn merge(entry: &QueueEntry, unit: Option<&UnitRun>, run: &ClientRun) -> AggregatedUnitInfo {
    let mut info = AggregatedUnitInfo {
        queue_index: entry.index as u32,
        folding_id: run.data.folding_id.clone(),
        team: run.data.team,
        project_info: Some(entry.project_info).filter(|project| !project.is_unknown()),
        download_time: entry.begin_time_utc,
        due_time: entry.due_time_utc(),
        // A non-terminal end time is "last touched", not "finished".
        finished_time: entry
            .status
            .is_terminal()
            .then_some(entry.end_time_utc)
            .flatten(),
        core_id: if entry.core_number == 0 {
            "Unknown".to_string()
        } else {
            entry.core_id()
        },
        slot_type: entry.slot_type(),
        ..AggregatedUnitInfo::default()
    };
    if let Some(unit) = unit {
        info.unit_start_time_stamp = unit.data.unit_start_time_stamp;
        info.core_version = unit.data.core_version;
        info.unit_result = unit.data.work_unit_result;
        info.frames_observed = unit.data.frames_observed;
        info.raw_frames_complete = unit.data.raw_frames_complete();
        info.raw_frames_total = unit.data.raw_frames_total();
        info.current_frame = unit.data.current_frame;
        info.log_lines = Some(unit.line_span);
        if info.project_info.is_none() {
            info.project_info = unit.data.project_info().copied();
        }
    }
    info
}

/// A record rebuilt from the log alone. Queue-derived identity stays at
/// its defaults: `"Unknown"` core, unknown slot type, no times.
fn log_only(unit: &UnitRun, run: &ClientRun) -> AggregatedUnitInfo {
    AggregatedUnitInfo {
        queue_index: unit.queue_index,
        folding_id: run.data.folding_id.clone(),
        team: run.data.team,
        project_info: unit.data.project_info().copied(),
        unit_start_time_stamp: unit.data.unit_start_time_stamp,
        core_version: unit.data.core_version,
        unit_result: unit.data.work_unit_result,
        frames_observed: unit.data.frames_observed,
        raw_frames_complete: unit.data.raw_frames_complete(),
        raw_frames_total: unit.data.raw_frames_total(),
        current_frame: unit.data.current_frame,
        log_lines: Some(unit.line_span),
        ..AggregatedUnitInfo::default()
    }
}

/// The run had no units at all: carry the identity so the caller still
/// sees who was folding.
fn identity_only(run: &ClientRun) -> AggregatedUnitInfo {
    AggregatedUnitInfo {
        folding_id: run.data.folding_id.clone(),
        team: run.data.team,
        ..AggregatedUnitInfo::default()
    }
}

/// Snapshot contribution. Name, tag and progress always come along; the
/// tuple and times fill only holes the queue left.
fn apply_snapshot(info: &mut AggregatedUnitInfo, snapshot: &SnapshotInfo) {
    info.protein_name = Some(snapshot.protein_name.clone());
    info.protein_tag = Some(snapshot.protein_tag.clone());
    info.progress = Some(snapshot.progress);
    if info.project_info.is_none() {
        info.project_info = snapshot.project_info;
    }
    if info.download_time.is_none() {
        info.download_time = Some(snapshot.download_time);
    }
    if info.due_time.is_none() {
        info.due_time = Some(snapshot.due_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fahtrace_log::{ClientRunData, LogDialect, SlotRun};
    use fahtrace_queue::EntryStatus;
    use fahtrace_types::{LineSpan, SlotType, UnitFrame, WorkUnitResult};

    fn identity_run(start_line: u32) -> ClientRun {
        let mut data = ClientRunData::new(Utc.with_ymd_and_hms(2010, 3, 20, 6, 0, 0).unwrap());
        data.folding_id = Some("harlam357".to_string());
        data.team = Some(32);
        data.user_id = Some("29A0C85F44EC6A0E".to_string());
        data.machine_id = Some(1);
        data.client_version = Some("6.30".to_string());
        data.arguments = Some("-smp -verbosity 9".to_string());
        let mut run = ClientRun::new(start_line, data);
        run.line_span = LineSpan::new(start_line, start_line + 40);
        run
    }

    fn unit(queue_index: u32, span: (u32, u32), project: Option<ProjectInfo>) -> UnitRun {
        let mut unit = UnitRun::new(queue_index, span.0);
        unit.line_span.end = span.1;
        if let Some(project) = project {
            unit.data.project_infos.push(project);
        }
        unit
    }

    fn slot_with(folding_slot: u32, units: Vec<UnitRun>) -> SlotRun {
        let mut slot = SlotRun::new(folding_slot);
        slot.unit_runs = units;
        slot
    }

    fn log_of(runs: Vec<ClientRun>) -> FahLog {
        FahLog {
            dialect: LogDialect::Legacy,
            lines: Vec::new(),
            client_runs: runs,
        }
    }

    fn blank_queue(cursor: usize) -> QueueSnapshot {
        QueueSnapshot {
            version: 600,
            current_index: cursor,
            entries: (0..10)
                .map(|index| QueueEntry {
                    index,
                    ..QueueEntry::default()
                })
                .collect(),
        }
    }

    fn folding_entry(index: usize, project: ProjectInfo) -> QueueEntry {
        QueueEntry {
            index,
            raw_status: 3,
            status: EntryStatus::FoldingNow,
            project_info: project,
            begin_time_utc: Some(Utc.with_ymd_and_hms(2010, 3, 20, 12, 0, 0).unwrap()),
            expiration_secs: 14 * 86_400,
            core_number: 0xa4,
            ..QueueEntry::default()
        }
    }

    #[test]
    fn test_empty_log_is_an_error() {
        let log = log_of(Vec::new());
        assert!(matches!(
            aggregate(&log, None, None),
            Err(AggregateError::EmptyLog)
        ));
    }

    #[test]
    fn test_log_only_builds_two_positions() {
        let project_old = ProjectInfo::new(2670, 1, 2, 3);
        let project_new = ProjectInfo::new(2677, 34, 40, 30);
        let mut run = identity_run(0);
        run.slot_runs.insert(
            0,
            slot_with(
                0,
                vec![
                    unit(1, (5, 20), Some(project_old)),
                    unit(2, (20, 40), Some(project_new)),
                ],
            ),
        );
        let log = log_of(vec![run]);

        let result = aggregate(&log, None, None).unwrap();
        assert_eq!(result.unit_infos.len(), 2);
        assert_eq!(result.current_unit_index, 1);

        let previous = result.unit_infos[0].as_ref().unwrap();
        assert_eq!(previous.queue_index, 1);
        assert_eq!(previous.project_info, Some(project_old));

        let current = result.current_unit().unwrap();
        assert_eq!(current.queue_index, 2);
        assert_eq!(current.project_info, Some(project_new));
        assert_eq!(current.folding_id.as_deref(), Some("harlam357"));
        assert_eq!(current.team, Some(32));
        assert_eq!(current.core_id, "Unknown");
        assert_eq!(current.slot_type, SlotType::Unknown);
        assert_eq!(current.log_lines, Some(LineSpan::new(20, 40)));
        assert_eq!(result.current_log_lines, LineSpan::new(20, 40));
    }

    #[test]
    fn test_log_only_identity_record_when_run_has_no_units() {
        let log = log_of(vec![identity_run(0)]);

        let result = aggregate(&log, None, None).unwrap();
        assert_eq!(result.unit_infos.len(), 2);
        assert!(result.unit_infos[0].is_none());

        let current = result.current_unit().unwrap();
        assert_eq!(current.folding_id.as_deref(), Some("harlam357"));
        assert!(current.log_lines.is_none());
        // No unit span to borrow: the whole run backs the view.
        assert_eq!(result.current_log_lines, LineSpan::new(0, 40));
    }

    #[test]
    fn test_queue_positions_resolve_by_index_and_tuple() {
        let project = ProjectInfo::new(2683, 2, 8, 24);
        let mut run = identity_run(0);
        run.slot_runs
            .insert(0, slot_with(0, vec![unit(3, (10, 30), Some(project))]));
        let log = log_of(vec![run]);

        let mut queue = blank_queue(3);
        queue.entries[3] = folding_entry(3, project);

        let result = aggregate(&log, Some(&queue), None).unwrap();
        assert_eq!(result.unit_infos.len(), 10);
        assert_eq!(result.current_unit_index, 3);

        let info = result.current_unit().unwrap();
        assert_eq!(info.project_info, Some(project));
        assert_eq!(info.core_id, "A4");
        assert_eq!(info.slot_type, SlotType::Cpu);
        assert_eq!(
            info.download_time,
            Some(Utc.with_ymd_and_hms(2010, 3, 20, 12, 0, 0).unwrap())
        );
        assert_eq!(
            info.due_time,
            Some(Utc.with_ymd_and_hms(2010, 4, 3, 12, 0, 0).unwrap())
        );
        assert_eq!(info.log_lines, Some(LineSpan::new(10, 30)));

        // Untouched positions resolve to nothing.
        for index in [0, 1, 2, 4, 5, 6, 7, 8, 9] {
            assert!(result.unit_infos[index].is_none(), "position {index}");
        }
        assert!(result.queue.is_some());
    }

    #[test]
    fn test_mismatched_tuple_does_not_resolve_off_cursor() {
        let mut run = identity_run(0);
        run.slot_runs.insert(
            0,
            slot_with(0, vec![unit(5, (10, 30), Some(ProjectInfo::new(1, 2, 3, 4)))]),
        );
        let log = log_of(vec![run]);

        let mut queue = blank_queue(3);
        // Same position, different tuple: a stale entry is never a match.
        queue.entries[5] = QueueEntry {
            raw_status: 0,
            status: EntryStatus::Deleted,
            ..folding_entry(5, ProjectInfo::new(9, 9, 9, 9))
        };

        let result = aggregate(&log, Some(&queue), None).unwrap();
        assert!(result.unit_infos[5].is_none());
    }

    #[test]
    fn test_cursor_corroborates_claimed_index_without_tuple() {
        // The unit never printed a usable project line.
        let mut run = identity_run(0);
        run.slot_runs.insert(0, slot_with(0, vec![unit(4, (12, 28), None)]));
        let log = log_of(vec![run]);

        let mut queue = blank_queue(4);
        queue.entries[4] = folding_entry(4, ProjectInfo::new(2190, 0, 5, 7));

        let result = aggregate(&log, Some(&queue), None).unwrap();
        let info = result.current_unit().unwrap();
        // Queue supplies the identity, the log still backs the lines.
        assert_eq!(info.project_info, Some(ProjectInfo::new(2190, 0, 5, 7)));
        assert_eq!(info.log_lines, Some(LineSpan::new(12, 28)));
        assert_eq!(result.current_log_lines, LineSpan::new(12, 28));
    }

    #[test]
    fn test_cursor_record_exists_even_without_any_unit() {
        let log = log_of(vec![identity_run(0)]);
        let mut queue = blank_queue(2);
        queue.entries[2] = folding_entry(2, ProjectInfo::new(2671, 11, 22, 33));

        let result = aggregate(&log, Some(&queue), None).unwrap();
        let info = result.current_unit().unwrap();
        assert_eq!(info.project_info, Some(ProjectInfo::new(2671, 11, 22, 33)));
        assert!(info.log_lines.is_none());
        assert_eq!(info.folding_id.as_deref(), Some("harlam357"));
        assert_eq!(result.current_log_lines, LineSpan::new(0, 40));
    }

    #[test]
    fn test_previous_run_is_searched_for_matches() {
        let project = ProjectInfo::new(2653, 6, 7, 8);
        let mut old_run = identity_run(0);
        old_run.slot_runs
            .insert(0, slot_with(0, vec![unit(1, (4, 18), Some(project))]));
        let mut new_run = identity_run(40);
        new_run.slot_runs.insert(
            0,
            slot_with(0, vec![unit(2, (45, 70), Some(ProjectInfo::new(2677, 1, 1, 1)))]),
        );
        let log = log_of(vec![old_run, new_run]);

        let mut queue = blank_queue(2);
        queue.entries[1] = QueueEntry {
            raw_status: 1,
            status: EntryStatus::Finished,
            end_time_utc: Some(Utc.with_ymd_and_hms(2010, 3, 19, 23, 0, 0).unwrap()),
            ..folding_entry(1, project)
        };
        queue.entries[2] = folding_entry(2, ProjectInfo::new(2677, 1, 1, 1));

        let result = aggregate(&log, Some(&queue), None).unwrap();
        let finished = result.unit_infos[1].as_ref().unwrap();
        assert_eq!(finished.project_info, Some(project));
        assert_eq!(finished.log_lines, Some(LineSpan::new(4, 18)));
        assert_eq!(
            finished.finished_time,
            Some(Utc.with_ymd_and_hms(2010, 3, 19, 23, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_non_terminal_end_time_is_not_a_finish() {
        let project = ProjectInfo::new(2683, 2, 8, 24);
        let mut run = identity_run(0);
        run.slot_runs
            .insert(0, slot_with(0, vec![unit(3, (10, 30), Some(project))]));
        let log = log_of(vec![run]);

        let mut queue = blank_queue(3);
        queue.entries[3] = QueueEntry {
            end_time_utc: Some(Utc.with_ymd_and_hms(2010, 3, 20, 18, 0, 0).unwrap()),
            ..folding_entry(3, project)
        };

        let result = aggregate(&log, Some(&queue), None).unwrap();
        assert_eq!(result.current_unit().unwrap().finished_time, None);
    }

    #[test]
    fn test_snapshot_fills_only_the_current_position() {
        let project = ProjectInfo::new(2683, 2, 8, 24);
        let other = ProjectInfo::new(2653, 1, 1, 1);
        let mut run = identity_run(0);
        run.slot_runs.insert(
            0,
            slot_with(
                0,
                vec![unit(2, (5, 10), Some(other)), unit(3, (10, 30), Some(project))],
            ),
        );
        let log = log_of(vec![run]);

        let mut queue = blank_queue(3);
        queue.entries[2] = QueueEntry {
            raw_status: 1,
            status: EntryStatus::Finished,
            ..folding_entry(2, other)
        };
        queue.entries[3] = folding_entry(3, project);

        let snapshot = SnapshotInfo {
            protein_name: "p2683_IBX in water".to_string(),
            protein_tag: "P2683R2C8G24".to_string(),
            project_info: Some(project),
            download_time: Utc.with_ymd_and_hms(2010, 3, 20, 11, 59, 0).unwrap(),
            due_time: Utc.with_ymd_and_hms(2010, 4, 10, 11, 59, 0).unwrap(),
            progress: 41,
        };

        let result = aggregate(&log, Some(&queue), Some(&snapshot)).unwrap();
        let current = result.current_unit().unwrap();
        assert_eq!(current.protein_name.as_deref(), Some("p2683_IBX in water"));
        assert_eq!(current.progress, Some(41));
        // The queue already supplied times: the snapshot must not override.
        assert_eq!(
            current.download_time,
            Some(Utc.with_ymd_and_hms(2010, 3, 20, 12, 0, 0).unwrap())
        );

        let neighbour = result.unit_infos[2].as_ref().unwrap();
        assert!(neighbour.protein_name.is_none());
        assert!(neighbour.progress.is_none());
    }

    #[test]
    fn test_snapshot_supplies_times_log_only() {
        let project = ProjectInfo::new(2683, 2, 8, 24);
        let mut run = identity_run(0);
        run.slot_runs
            .insert(0, slot_with(0, vec![unit(3, (10, 30), Some(project))]));
        let log = log_of(vec![run]);

        let download = Utc.with_ymd_and_hms(2010, 3, 20, 11, 59, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2010, 4, 10, 11, 59, 0).unwrap();
        let snapshot = SnapshotInfo {
            protein_name: "p2683_IBX in water".to_string(),
            protein_tag: "P2683R2C8G24".to_string(),
            project_info: Some(project),
            download_time: download,
            due_time: due,
            progress: 41,
        };

        let result = aggregate(&log, None, Some(&snapshot)).unwrap();
        let current = result.current_unit().unwrap();
        assert_eq!(current.download_time, Some(download));
        assert_eq!(current.due_time, Some(due));
    }

    #[test]
    fn test_status_upgrades_once_frames_are_timed() {
        let project = ProjectInfo::new(2677, 34, 40, 30);
        let timed_frame = UnitFrame {
            id: 3,
            raw_frames_complete: 7500,
            raw_frames_total: 250_000,
            time_of_day: chrono::NaiveTime::from_hms_opt(6, 35, 10).unwrap(),
            duration_secs: 95,
        };

        let mut run = identity_run(0);
        let mut working = unit(2, (10, 40), Some(project));
        working.data.frames_observed = 3;
        working.data.current_frame = Some(timed_frame);
        let mut slot = slot_with(0, vec![working]);
        slot.data.status = SlotStatus::RunningNoFrameTimes;
        run.slot_runs.insert(0, slot);
        let log = log_of(vec![run]);

        let result = aggregate(&log, None, None).unwrap();
        assert_eq!(result.status, SlotStatus::Running);
    }

    #[test]
    fn test_status_stays_without_frame_durations() {
        let project = ProjectInfo::new(2677, 34, 40, 30);
        let first_frame = UnitFrame {
            id: 1,
            raw_frames_complete: 2500,
            raw_frames_total: 250_000,
            time_of_day: chrono::NaiveTime::from_hms_opt(6, 33, 35).unwrap(),
            duration_secs: 0,
        };

        let mut run = identity_run(0);
        let mut working = unit(2, (10, 40), Some(project));
        working.data.frames_observed = 1;
        working.data.current_frame = Some(first_frame);
        let mut slot = slot_with(0, vec![working]);
        slot.data.status = SlotStatus::RunningNoFrameTimes;
        run.slot_runs.insert(0, slot);
        let log = log_of(vec![run]);

        let result = aggregate(&log, None, None).unwrap();
        assert_eq!(result.status, SlotStatus::RunningNoFrameTimes);

        // A pause is never upgraded, frames or not.
        let mut run = identity_run(0);
        let mut working = unit(2, (10, 40), Some(project));
        working.data.current_frame = Some(UnitFrame {
            duration_secs: 95,
            ..first_frame
        });
        let mut slot = slot_with(0, vec![working]);
        slot.data.status = SlotStatus::Paused;
        run.slot_runs.insert(0, slot);
        let log = log_of(vec![run]);

        let result = aggregate(&log, None, None).unwrap();
        assert_eq!(result.status, SlotStatus::Paused);
    }

    #[test]
    fn test_envelope_carries_run_identity_and_counters() {
        let project = ProjectInfo::new(2677, 34, 40, 30);
        let mut run = identity_run(0);
        let mut slot = slot_with(0, vec![unit(2, (10, 40), Some(project))]);
        slot.data.completed_units = 3;
        slot.data.failed_units = 1;
        slot.data.total_completed_units = Some(189);
        run.slot_runs.insert(0, slot);
        let log = log_of(vec![run]);

        let result = aggregate(&log, None, None).unwrap();
        assert_eq!(result.client_version.as_deref(), Some("6.30"));
        assert_eq!(result.arguments.as_deref(), Some("-smp -verbosity 9"));
        assert_eq!(result.user_id.as_deref(), Some("29A0C85F44EC6A0E"));
        assert_eq!(result.machine_id, Some(1));
        assert_eq!(result.completed_units, 3);
        assert_eq!(result.failed_units, 1);
        assert_eq!(result.total_completed_units, Some(189));
    }

    #[test]
    fn test_same_inputs_same_output() {
        let project = ProjectInfo::new(2683, 2, 8, 24);
        let mut run = identity_run(0);
        run.slot_runs
            .insert(0, slot_with(0, vec![unit(3, (10, 30), Some(project))]));
        let log = log_of(vec![run]);
        let mut queue = blank_queue(3);
        queue.entries[3] = folding_entry(3, project);

        let first = aggregate(&log, Some(&queue), None).unwrap();
        let second = aggregate(&log, Some(&queue), None).unwrap();
        assert_eq!(first, second);
    }
}
