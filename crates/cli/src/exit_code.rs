//! Exit code definitions for the backup CLI
//!
//! Upload failures never change the exit code: they are reported in the
//! output and the logs. Only problems that stop a run before any upload is
//! attempted produce a non-zero code.

/// Exit codes for the backup CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed, including runs where some uploads failed
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: missing input directory, invalid configuration, etc.
    UsageError = 2,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            _ => None,
        }
    }

    /// Exit code for an error from backup-core
    pub fn from_error(error: &backup_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }
}
