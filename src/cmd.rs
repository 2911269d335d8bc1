use std::{
    io,
    process::{Command, ExitStatus, Stdio},
};

use dialoguer::Confirm;

use crate::{error::KdumpError, ui};

// ── Runner abstraction ────────────────────────────────────────────────────────

/// Executes the external tools this program delegates to (bootloader
/// regeneration, kexec, package queries).
pub trait ProcessRunner {
    /// Runs `program` to completion and returns its exit status.
    /// A non-zero status is not an error here; callers decide what it means.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExitStatus, KdumpError>;

    /// Whether `program` resolves in `PATH`.
    fn is_installed(&self, program: &str) -> bool;
}

pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn not_found_or_io(program: &str, err: io::Error) -> KdumpError {
    if err.kind() == io::ErrorKind::NotFound {
        KdumpError::CommandNotFound(program.to_string())
    } else {
        KdumpError::Io(err)
    }
}

fn print_captured_output(stdout: &[u8], stderr: &[u8]) {
    let out = String::from_utf8_lossy(stdout);
    let err = String::from_utf8_lossy(stderr);
    if !out.trim().is_empty() {
        eprintln!("{}", out.trim());
    }
    if !err.trim().is_empty() {
        eprintln!("{}", err.trim());
    }
}

/// Maps a binary name to the Arch package that ships it.
fn package_for(program: &str) -> &str {
    match program {
        "kexec" => "kexec-tools",
        "grub-mkconfig" | "grub-install" => "grub",
        "sdboot-manage" => "systemd-boot-manager",
        other => other,
    }
}

/// When `program` is not found, asks the user whether to install its package
/// via `pacman -S`. Declining, or running without a terminal, yields
/// `Err(CommandNotFound)`.
fn offer_install(program: &str) -> Result<(), KdumpError> {
    if !console::user_attended() {
        return Err(KdumpError::CommandNotFound(program.to_string()));
    }

    let pkg = package_for(program);

    ui::print_warning(&format!("Command '{}' not found.", program));
    println!();

    if !Confirm::new()
        .with_prompt(format!("Install '{}' with pacman?", pkg))
        .default(true)
        .interact()?
    {
        return Err(KdumpError::CommandNotFound(program.to_string()));
    }

    println!();
    let status = Command::new("pacman")
        .args(["-S", "--needed", "--noconfirm", pkg])
        .status()
        .map_err(|e| not_found_or_io("pacman", e))?;

    if !status.success() {
        return Err(KdumpError::CommandFailed("pacman".to_string(), exit_code(status)));
    }

    if which::which(program).is_err() {
        ui::print_error(&format!(
            "'{}' still not found after install. Check the package name.",
            program
        ));
        return Err(KdumpError::CommandNotFound(program.to_string()));
    }

    Ok(())
}

/// Runs a command silently behind a spinner. Captured output is only shown
/// when the command fails.
fn run_with_spinner(program: &str, args: &[&str]) -> Result<ExitStatus, KdumpError> {
    let pb = ui::spinner(format!("Running {}…", program));
    let result = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| not_found_or_io(program, e));
    pb.finish_and_clear();

    let output = result?;
    if !output.status.success() {
        print_captured_output(&output.stdout, &output.stderr);
    }
    Ok(output.status)
}

// ── Host implementation ───────────────────────────────────────────────────────

/// Runs real processes on the host.
pub struct HostRunner;

impl ProcessRunner for HostRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExitStatus, KdumpError> {
        match run_with_spinner(program, args) {
            Err(KdumpError::CommandNotFound(_)) => {
                offer_install(program)?;
                run_with_spinner(program, args)
            }
            other => other,
        }
    }

    fn is_installed(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

// ── Test double ───────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_for_known_tools() {
        assert_eq!(package_for("kexec"), "kexec-tools");
        assert_eq!(package_for("grub-mkconfig"), "grub");
        assert_eq!(package_for("sdboot-manage"), "systemd-boot-manager");
        assert_eq!(package_for("foo"), "foo");
    }

    #[test]
    fn test_not_found_maps_to_command_not_found() {
        let err = not_found_or_io("kexec", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, KdumpError::CommandNotFound(ref p) if p == "kexec"));

        let err = not_found_or_io("kexec", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, KdumpError::Io(_)));
    }

    #[test]
    fn test_host_runner_reports_exit_status() {
        let status = HostRunner.run("sh", &["-c", "exit 3"]).unwrap();
        assert_eq!(exit_code(status), 3);
        assert!(HostRunner.is_installed("sh"));
        assert!(!HostRunner.is_installed("definitely_not_a_real_command_12345"));
    }
}
