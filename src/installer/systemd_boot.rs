use std::fs;

use super::{check_prerequisite, regenerate, remove_file_if_present, BootloaderHandler};
use crate::{
    cmd::ProcessRunner,
    config::{CrashKernelConfig, SYSTEMD_BOOT},
    error::KdumpError,
    system::Sysroot,
    ui,
};

/// systemd-boot as managed by `sdboot-manage`, which rebuilds the loader
/// entries from its options drop-ins.
pub struct SystemdBoot;

impl BootloaderHandler for SystemdBoot {
    fn config(&self) -> &'static CrashKernelConfig {
        &SYSTEMD_BOOT
    }

    fn name(&self) -> &'static str {
        "systemd-boot-manager"
    }

    fn apply(&self, root: &Sysroot, runner: &dyn ProcessRunner) -> Result<(), KdumpError> {
        check_prerequisite(self, root, runner)?;

        // The drop-in directory ships with sdboot-manage.
        fs::write(
            root.path(SYSTEMD_BOOT.target),
            format!("{}\n", SYSTEMD_BOOT.content),
        )?;
        ui::print_success(&format!("Wrote {}.", SYSTEMD_BOOT.target));

        regenerate(&SYSTEMD_BOOT, runner)?;
        ui::print_success("Boot entries regenerated.");
        Ok(())
    }

    fn remove(&self, root: &Sysroot) -> Result<(), KdumpError> {
        if remove_file_if_present(&root.path(SYSTEMD_BOOT.target))? {
            ui::print_success(&format!("Removed {}.", SYSTEMD_BOOT.target));
        }
        Ok(())
    }
}
