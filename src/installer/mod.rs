//! Injects and removes the `crashkernel=` boot parameter.
//!
//! Each bootloader gets its own [`BootloaderHandler`]. `apply` only touches
//! the detected bootloader, while `remove_all` visits every handler so that
//! artifacts left behind by a previous bootloader are cleaned up too.

pub mod grub;
pub mod refind;
pub mod systemd_boot;

use std::{fs, io, path::Path};

use crate::{
    bootloader::BootloaderVariant,
    cmd::{exit_code, ProcessRunner},
    config::{CrashKernelConfig, Prerequisite},
    error::KdumpError,
    system::Sysroot,
    ui,
};

// ── Handler trait ─────────────────────────────────────────────────────────────

pub trait BootloaderHandler {
    fn config(&self) -> &'static CrashKernelConfig;

    /// Human-readable bootloader name.
    fn name(&self) -> &'static str;

    fn apply(&self, root: &Sysroot, runner: &dyn ProcessRunner) -> Result<(), KdumpError>;

    /// Removes whatever `apply` may have left. Absent artifacts are a no-op.
    fn remove(&self, root: &Sysroot) -> Result<(), KdumpError>;
}

const HANDLERS: [&dyn BootloaderHandler; 3] = [
    &grub::Grub,
    &systemd_boot::SystemdBoot,
    &refind::Refind,
];

pub fn handler_for(variant: BootloaderVariant) -> Option<&'static dyn BootloaderHandler> {
    match variant {
        BootloaderVariant::Grub => Some(&grub::Grub),
        BootloaderVariant::SystemdBoot => Some(&systemd_boot::SystemdBoot),
        BootloaderVariant::Refind => Some(&refind::Refind),
        BootloaderVariant::Unknown => None,
    }
}

// ── Installer ─────────────────────────────────────────────────────────────────

pub struct Installer<'a> {
    root: &'a Sysroot,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Installer<'a> {
    pub fn new(root: &'a Sysroot, runner: &'a dyn ProcessRunner) -> Self {
        Installer { root, runner }
    }

    pub fn apply(&self, variant: BootloaderVariant) -> Result<(), KdumpError> {
        let handler = handler_for(variant).ok_or_else(|| {
            KdumpError::PreconditionFailed(
                "Could not identify the bootloader. \
                 Add crashkernel=256M to the kernel command line manually."
                    .to_string(),
            )
        })?;
        handler.apply(self.root, self.runner)
    }

    /// Not gated by detection: the user may have switched bootloaders since `setup`.
    /// Every handler runs even if an earlier one fails; the first error is returned.
    pub fn remove_all(&self) -> Result<(), KdumpError> {
        let mut first_error = None;
        for handler in HANDLERS {
            if let Err(e) = handler.remove(self.root) {
                ui::print_warning(&format!("{} cleanup failed: {}", handler.name(), e));
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Fails with `PreconditionFailed` unless the bootloader looks installed.
pub(crate) fn check_prerequisite(
    handler: &dyn BootloaderHandler,
    root: &Sysroot,
    runner: &dyn ProcessRunner,
) -> Result<(), KdumpError> {
    let missing = match handler.config().prerequisite {
        Prerequisite::File(path) if !root.path(path).exists() => path,
        Prerequisite::Tool(tool) if !runner.is_installed(tool) => tool,
        _ => return Ok(()),
    };

    Err(KdumpError::PreconditionFailed(format!(
        "{} not found: {} doesn't seem installed.",
        missing,
        handler.name()
    )))
}

/// Runs the regeneration command of `config`, if any.
/// A failure is reported as-is; files already written are left in place.
pub(crate) fn regenerate(
    config: &CrashKernelConfig,
    runner: &dyn ProcessRunner,
) -> Result<(), KdumpError> {
    let Some((program, args)) = config.regenerate.split_first() else {
        return Ok(());
    };

    let status = runner.run(program, args)?;
    if !status.success() {
        return Err(KdumpError::RegenerationFailed(
            config.regenerate.join(" "),
            exit_code(status),
        ));
    }
    Ok(())
}

/// Returns `true` if a file was actually removed.
pub(crate) fn remove_file_if_present(path: &Path) -> Result<bool, KdumpError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cmd::testing::RecordingRunner,
        config,
        system::testing::{fake_root, put},
    };

    #[test]
    fn test_unknown_bootloader_has_no_handler() {
        let (_temp, root) = fake_root();
        let runner = RecordingRunner::default();

        let err = Installer::new(&root, &runner)
            .apply(BootloaderVariant::Unknown)
            .unwrap_err();
        assert!(matches!(err, KdumpError::PreconditionFailed(ref m) if m.contains("manually")));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_remove_all_is_idempotent() {
        let (_temp, root) = fake_root();
        let runner = RecordingRunner::with_installed(&[config::SDBOOT_MANAGE]);
        put(&root, "/etc/default/grub", "GRUB_TIMEOUT=5\n");
        fs::create_dir_all(root.path("/etc/sdboot-manage.d")).unwrap();

        let installer = Installer::new(&root, &runner);
        installer.apply(BootloaderVariant::Grub).unwrap();
        installer.apply(BootloaderVariant::SystemdBoot).unwrap();
        put(&root, config::REFIND.target, "\"Boot\" \"rw crashkernel=256M\"\n");

        installer.remove_all().unwrap();
        let after_first = (
            root.path(config::GRUB.target).exists(),
            root.path(config::SYSTEMD_BOOT.target).exists(),
            fs::read_to_string(root.path(config::REFIND.target)).unwrap(),
        );

        installer.remove_all().unwrap();
        let after_second = (
            root.path(config::GRUB.target).exists(),
            root.path(config::SYSTEMD_BOOT.target).exists(),
            fs::read_to_string(root.path(config::REFIND.target)).unwrap(),
        );

        assert_eq!(after_first, (false, false, "\"Boot\" \"rw \"\n".to_string()));
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_remove_all_continues_past_a_failure() {
        let (_temp, root) = fake_root();
        let runner = RecordingRunner::default();
        // A non-empty directory where the GRUB fragment should be cannot be unlinked.
        put(&root, &format!("{}/stray", config::GRUB.target), "x\n");
        put(&root, config::SYSTEMD_BOOT.target, "LINUX_OPTIONS+=\" crashkernel=256M\"\n");

        let result = Installer::new(&root, &runner).remove_all();

        assert!(result.is_err());
        assert!(root.path(config::GRUB.target).is_dir());
        assert!(!root.path(config::SYSTEMD_BOOT.target).exists());
    }

    #[test]
    fn test_remove_all_on_clean_system() {
        let (_temp, root) = fake_root();
        let runner = RecordingRunner::default();

        Installer::new(&root, &runner).remove_all().unwrap();
        assert!(!root.path(config::REFIND.target).exists());
    }

    #[test]
    fn test_regenerate_without_command_is_noop() {
        let runner = RecordingRunner::default();
        regenerate(&config::REFIND, &runner).unwrap();
        assert!(runner.calls().is_empty());
    }
}
