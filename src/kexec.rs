use std::fs;

use crate::{
    cmd::{exit_code, ProcessRunner},
    config::{BOOT_DIR, CRASH_APPEND, CRASH_DIR, KEXEC},
    error::KdumpError,
    system::{SystemEnvironment, Sysroot},
    ui,
};

/// Whether a crash kernel is currently loaded. Owned by the kernel; it can
/// change between invocations (e.g. after a panic), so it is always re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
}

pub struct CrashKernelController<'a> {
    env: &'a dyn SystemEnvironment,
    root: &'a Sysroot,
    runner: &'a dyn ProcessRunner,
}

impl<'a> CrashKernelController<'a> {
    pub fn new(
        env: &'a dyn SystemEnvironment,
        root: &'a Sysroot,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        CrashKernelController { env, root, runner }
    }

    pub fn state(&self) -> Result<LoadState, KdumpError> {
        Ok(if self.env.read_crash_loaded_flag()? {
            LoadState::Loaded
        } else {
            LoadState::NotLoaded
        })
    }

    /// Loads the running kernel and its initramfs as the crash kernel.
    ///
    /// Requires memory reserved through `crashkernel=`, which only takes
    /// effect after a reboot following `setup`. Loading over an existing
    /// crash kernel is left to kexec.
    pub fn load(&self) -> Result<(), KdumpError> {
        let reserved = self.env.read_crash_reserved_size()?;
        if reserved == 0 {
            return Err(KdumpError::PreconditionFailed(
                "No memory is reserved for a crash kernel. Run `kdump-setup setup` and reboot, \
                 or add crashkernel=256M to the kernel command line manually."
                    .to_string(),
            ));
        }

        let release = self.env.current_kernel_release()?;
        let base = self.env.kernel_base_name(&release)?;
        let image = self.root.path(&format!("{}/vmlinuz-{}", BOOT_DIR, base));
        let initramfs = self.root.path(&format!("{}/initramfs-{}.img", BOOT_DIR, base));

        for path in [&image, &initramfs] {
            if !path.exists() {
                return Err(KdumpError::ResourceNotFound(path.clone()));
            }
        }

        fs::create_dir_all(self.root.path(CRASH_DIR))?;

        let image_arg = image.to_string_lossy();
        let initrd_arg = format!("--initrd={}", initramfs.display());
        let append_arg = format!("--append={}", CRASH_APPEND);

        let status = self.runner.run(
            KEXEC,
            &["-p", &image_arg, &initrd_arg, "--reuse-cmdline", &append_arg],
        )?;
        if !status.success() {
            return Err(KdumpError::LoadFailed(exit_code(status)));
        }

        ui::print_success(&format!(
            "Crash kernel {} loaded ({} MiB reserved).",
            release,
            reserved >> 20
        ));
        Ok(())
    }

    /// Unloads the crash kernel. Nothing loaded is a successful no-op.
    ///
    /// Never fails: an unreadable state or a failing kexec is reported as a
    /// warning and the invocation still succeeds.
    pub fn unload(&self) -> Result<(), KdumpError> {
        match self.state() {
            Ok(LoadState::Loaded) => {}
            Ok(LoadState::NotLoaded) => {
                ui::print_info("No crash kernel is loaded, nothing to unload.");
                return Ok(());
            }
            Err(e) => {
                ui::print_warning(&format!("{}. Nothing was unloaded.", e));
                return Ok(());
            }
        }

        match self.runner.run(KEXEC, &["-p", "-u"]) {
            Ok(status) if status.success() => ui::print_success("Crash kernel unloaded."),
            Ok(status) => ui::print_warning(&format!(
                "'{} -p -u' failed with exit code {}. The crash kernel may still be loaded.",
                KEXEC,
                exit_code(status)
            )),
            Err(e) => ui::print_warning(&format!("{}", e)),
        }
        Ok(())
    }
}
