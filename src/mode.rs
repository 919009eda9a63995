use crate::invocation::ModeFlags;

/// The single terminal action of a process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchDecision {
    PrintVersion,
    PrintDefaultConfig,
    PrintConfigDir,
    TailLogs,
    RunDaemon,
    RunInteractive,
}

/// First match wins. Informational flags are checked before daemon detection
/// so a daemon environment never hides them.
pub fn classify(modes: &ModeFlags, in_daemon_mode: bool) -> DispatchDecision {
    if modes.show_version {
        DispatchDecision::PrintVersion
    } else if modes.show_config {
        DispatchDecision::PrintDefaultConfig
    } else if modes.show_config_dir {
        DispatchDecision::PrintConfigDir
    } else if modes.tail_logs {
        DispatchDecision::TailLogs
    } else if in_daemon_mode {
        DispatchDecision::RunDaemon
    } else {
        DispatchDecision::RunInteractive
    }
}
