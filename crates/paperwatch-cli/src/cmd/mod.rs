pub mod render;
pub mod run;
pub mod show;
pub mod verify;

use std::process::ExitCode;

/// How a command finished, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Completed, but some topics were skipped or checks failed.
    Partial,
    Interrupted,
}

impl Status {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Partial => ExitCode::from(1),
            Self::Interrupted => ExitCode::from(130),
        }
    }
}

/// Exit code for fatal errors (configuration, persistence).
pub const FATAL: u8 = 2;
