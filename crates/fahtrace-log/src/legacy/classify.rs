use crate::line::LineType;

/// Classify one legacy client line.
///
/// Substring rules, ordered so the more specific shapes win (the EUE pause
/// line also says `+ Paused`, the units-completed line also says
/// `Completed`). Everything left over is `Note`.
pub(crate) fn classify(raw: &str) -> LineType {
    let trimmed = raw.trim_start();
    if trimmed.starts_with("--- Opening Log file") {
        return LineType::LogOpen;
    }
    if trimmed.starts_with('#') {
        return LineType::LogHeader;
    }
    if raw.contains("Folding@Home Client Version") {
        return LineType::ClientVersion;
    }
    if trimmed.starts_with("Arguments:") {
        return LineType::ClientArguments;
    }
    if raw.contains("] - User name:") {
        return LineType::ClientUserNameAndTeam;
    }
    if raw.contains("- Received User ID =") {
        return LineType::ClientReceivedUserId;
    }
    if raw.contains("] - User ID") {
        return LineType::ClientUserId;
    }
    if raw.contains("] - Machine ID") {
        return LineType::ClientMachineId;
    }
    if raw.contains("] + Attempting to get work packet") {
        return LineType::ClientAttemptGetWorkPacket;
    }
    if raw.contains("] + Attempting to send results") {
        return LineType::ClientSendStart;
    }
    if raw.contains("] + Results successfully sent") {
        return LineType::ClientSendComplete;
    }
    if raw.contains("] Sending work to server") {
        return LineType::ClientSendWorkToServer;
    }
    if raw.contains("] + Number of Units Completed:") {
        return LineType::ClientNumberOfUnitsCompleted;
    }
    if raw.contains("] Client-core communications error:") {
        return LineType::ClientCoreCommunicationsError;
    }
    if raw.contains("This is a sign of more serious problems, shutting down") {
        return LineType::ClientCoreCommunicationsErrorShutdown;
    }
    // Two EUE grammars: the v6 24-hour pause and the v5 sleep message.
    if raw.contains("] + Paused for 24 hours")
        || raw.contains("EUE limit exceeded")
        || raw.contains("Folding@Home will go to sleep for 1 day")
    {
        return LineType::ClientEuePause;
    }
    if raw.contains("Folding@Home Client Shutdown") {
        return LineType::ClientShutdown;
    }
    if raw.contains("] + Processing work unit") {
        return LineType::WorkUnitProcessing;
    }
    if raw.contains("] + Downloading new core") {
        return LineType::WorkUnitCoreDownload;
    }
    if raw.contains("] Working on queue slot") || raw.contains("] Working on Unit") {
        return LineType::WorkUnitWorking;
    }
    if raw.contains("] + Working ...") {
        return LineType::WorkUnitRunning;
    }
    if raw.contains("] - Calling") {
        return LineType::WorkUnitCallingCore;
    }
    if raw.contains("*------------------------------*") {
        return LineType::WorkUnitCoreStart;
    }
    if raw.contains("] Version") {
        return LineType::WorkUnitCoreVersion;
    }
    if raw.contains("] Project:") {
        return LineType::WorkUnitProject;
    }
    if raw.contains("] Completed ") {
        return LineType::WorkUnitFrame;
    }
    if raw.contains("] + Paused") {
        return LineType::WorkUnitPaused;
    }
    if raw.contains("] + Running on battery power") {
        return LineType::WorkUnitPausedForBattery;
    }
    if raw.contains("] + Off battery") {
        return LineType::WorkUnitResumeFromBattery;
    }
    if raw.contains("] Folding@home Core Shutdown:") {
        return LineType::WorkUnitCoreShutdown;
    }
    LineType::Note
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_boundary_and_header() {
        assert_eq!(
            classify("--- Opening Log file [September 7 23:11:31 UTC] "),
            LineType::LogOpen
        );
        assert_eq!(
            classify("# Windows SMP Console Edition #################################"),
            LineType::LogHeader
        );
        assert_eq!(
            classify("                       Folding@Home Client Version 6.24beta"),
            LineType::ClientVersion
        );
    }

    #[test]
    fn test_client_identity_lines() {
        assert_eq!(classify("Arguments: -smp -verbosity 9 "), LineType::ClientArguments);
        assert_eq!(
            classify("[23:11:31] - User name: harlam357 (Team 32)"),
            LineType::ClientUserNameAndTeam
        );
        assert_eq!(
            classify("[23:11:31] - User ID: 1A2B3C4D5E6F7A8B"),
            LineType::ClientUserId
        );
        assert_eq!(
            classify("[23:11:31] - Received User ID = 1A2B3C4D5E6F7A8B"),
            LineType::ClientReceivedUserId
        );
        assert_eq!(classify("[23:11:31] - Machine ID: 1"), LineType::ClientMachineId);
    }

    #[test]
    fn test_claim_both_grammars() {
        assert_eq!(
            classify("[23:11:33] Working on queue slot 01 [September 7 23:11:33 UTC]"),
            LineType::WorkUnitWorking
        );
        assert_eq!(
            classify("[17:35:42] Working on Unit 02 [July 1 17:35:42]"),
            LineType::WorkUnitWorking
        );
    }

    #[test]
    fn test_frame_both_grammars() {
        assert_eq!(
            classify("[04:32:20] Completed 2500 out of 250000 steps  (1%)"),
            LineType::WorkUnitFrame
        );
        assert_eq!(classify("[04:32:20] Completed 1%"), LineType::WorkUnitFrame);
    }

    #[test]
    fn test_units_completed_is_not_a_frame() {
        assert_eq!(
            classify("[03:24:35] + Number of Units Completed: 189"),
            LineType::ClientNumberOfUnitsCompleted
        );
    }

    #[test]
    fn test_eue_pause_wins_over_plain_pause() {
        assert_eq!(
            classify("[11:43:55] + Paused for 24 hours."),
            LineType::ClientEuePause
        );
        assert_eq!(classify("[10:25:05] + Paused"), LineType::WorkUnitPaused);
    }

    #[test]
    fn test_terminal_lines() {
        assert_eq!(
            classify("[03:24:26] Folding@home Core Shutdown: FINISHED_UNIT"),
            LineType::WorkUnitCoreShutdown
        );
        assert_eq!(
            classify("[21:44:33] Client-core communications error: ERROR 0x1"),
            LineType::ClientCoreCommunicationsError
        );
        assert_eq!(
            classify("[10:41:42] Folding@Home Client Shutdown."),
            LineType::ClientShutdown
        );
    }

    #[test]
    fn test_unrecognized_is_note() {
        assert_eq!(classify(""), LineType::Note);
        assert_eq!(classify("[23:11:33] Core found."), LineType::Note);
        assert_eq!(classify("random bytes \u{7}\u{8}"), LineType::Note);
    }
}
