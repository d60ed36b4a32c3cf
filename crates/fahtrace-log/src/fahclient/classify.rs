use crate::line::LineType;

use super::parse::{Scoped, scope, strip_core_prefix};

/// Classify one v7 daemon line.
///
/// The addressing prefix decides the scope (unit, slot, client); the text
/// after it decides the tag. Unit-scoped activity that matches a core
/// output shape gets the finer tag, anything else stays `WorkUnitRunning`.
pub(crate) fn classify(raw: &str) -> LineType {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('*') && trimmed.contains(" Log Started ") {
        return LineType::LogOpen;
    }
    match scope(raw) {
        Scoped::Unit { rest, .. } => classify_unit_rest(rest),
        Scoped::Slot { rest, .. } => classify_slot_rest(rest),
        Scoped::Client { rest } => classify_client_rest(rest),
        Scoped::Bare => {
            if trimmed.starts_with('*') {
                LineType::LogHeader
            } else {
                LineType::Note
            }
        }
    }
}

fn classify_unit_rest(rest: &str) -> LineType {
    let rest = rest.trim();
    if rest == "Starting" {
        return LineType::WorkUnitWorking;
    }
    if rest.starts_with("FahCore returned:") {
        return LineType::WorkUnitCoreReturn;
    }
    if rest == "Cleaning up" {
        return LineType::WorkUnitCleaningUp;
    }
    if rest.starts_with("Sending unit results:") {
        return LineType::ClientSendStart;
    }
    if rest.starts_with("Upload complete") {
        return LineType::ClientSendComplete;
    }
    let core_rest = strip_core_prefix(rest);
    if core_rest.starts_with("Project: ") {
        return LineType::WorkUnitProject;
    }
    if core_rest.starts_with("Version") {
        return LineType::WorkUnitCoreVersion;
    }
    if core_rest.starts_with("Completed ") {
        return LineType::WorkUnitFrame;
    }
    if core_rest.contains("Folding@home Core Shutdown:") {
        return LineType::WorkUnitCoreShutdown;
    }
    if core_rest.starts_with("*----") {
        return LineType::WorkUnitCoreStart;
    }
    LineType::WorkUnitRunning
}

fn classify_slot_rest(rest: &str) -> LineType {
    if rest.trim().starts_with("Paused") {
        return LineType::WorkUnitPaused;
    }
    LineType::Note
}

fn classify_client_rest(rest: &str) -> LineType {
    let trimmed = rest.trim_start();
    if trimmed.starts_with("Starting Unit ") {
        return LineType::WorkUnitWorking;
    }
    if trimmed.starts_with("FahCore, running Unit ") {
        return LineType::WorkUnitCoreReturn;
    }
    if trimmed.starts_with("Cleaning up Unit ") {
        return LineType::WorkUnitCleaningUp;
    }
    if trimmed.starts_with("Version: ") {
        return LineType::ClientVersion;
    }
    if trimmed.starts_with("Args: ") {
        return LineType::ClientArguments;
    }
    if trimmed.starts_with("User: ") || trimmed.starts_with("Team: ") {
        return LineType::ClientUserNameAndTeam;
    }
    if trimmed == "Clean exit" {
        return LineType::ClientShutdown;
    }
    if trimmed.starts_with('*') {
        return LineType::LogHeader;
    }
    LineType::Note
}
