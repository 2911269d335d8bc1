use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KdumpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("This tool must be run as root (sudo)")]
    NotRoot,

    #[error("Cannot read {}: {}", .path.display(), .reason)]
    EnvironmentUnavailable { path: PathBuf, reason: String },

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{} not found. Is /boot mounted?", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("Regenerating the boot configuration with '{0}' failed with exit code {1}")]
    RegenerationFailed(String, i32),

    #[error("kexec could not load the crash kernel (exit code {0})")]
    LoadFailed(i32),

    #[error("Command '{0}' failed with exit code {1}")]
    CommandFailed(String, i32),

    #[error("Command '{0}' not found. Is it installed?")]
    CommandNotFound(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}
