mod action;
mod bootloader;
mod cmd;
mod config;
mod error;
mod installer;
mod kexec;
mod system;
mod ui;

use action::{Action, Context};
use cmd::HostRunner;
use error::KdumpError;
use system::{HostEnvironment, Sysroot};

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let Some(action) = action_from_args(std::env::args()) else {
        ui::print_usage();
        return;
    };

    std::process::exit(exit_code_for(run(action)));
}

/// The action named by the first argument after the program name.
/// `None` means usage should be printed.
fn action_from_args(mut args: impl Iterator<Item = String>) -> Option<Action> {
    args.nth(1).as_deref().and_then(Action::parse)
}

/// Reports a failure once on stderr and maps the outcome to an exit code.
fn exit_code_for(result: Result<(), KdumpError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            ui::print_error(&format!("{}", e));
            1
        }
    }
}

fn run(action: Action) -> Result<(), KdumpError> {
    check_root()?;

    let root = Sysroot::host();
    let env = HostEnvironment::new(root.clone());
    let ctx = Context {
        env: &env,
        root: &root,
        runner: &HostRunner,
    };

    action::execute(action, &ctx)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Checks that the process is running as root (UID 0).
fn check_root() -> Result<(), KdumpError> {
    let status = std::fs::read_to_string("/proc/self/status").unwrap_or_default();
    require_root(uid_from_status(&status))
}

/// Real UID from the contents of `/proc/<pid>/status`.
fn uid_from_status(status: &str) -> u32 {
    status
        .lines()
        .find(|l| l.starts_with("Uid:"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(1) // default to non-root if unreadable
}

fn require_root(uid: u32) -> Result<(), KdumpError> {
    if uid != 0 {
        return Err(KdumpError::NotRoot);
    }

    Ok(())
}
