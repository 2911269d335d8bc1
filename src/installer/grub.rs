use std::{fs, os::unix::fs::PermissionsExt};

use super::{check_prerequisite, regenerate, remove_file_if_present, BootloaderHandler};
use crate::{
    cmd::ProcessRunner,
    config::{CrashKernelConfig, GRUB},
    error::KdumpError,
    system::Sysroot,
    ui,
};

/// GRUB: a dedicated fragment under `/etc/default/grub.d`, picked up when
/// `grub-mkconfig` sources the defaults. The main config is never edited.
pub struct Grub;

impl BootloaderHandler for Grub {
    fn config(&self) -> &'static CrashKernelConfig {
        &GRUB
    }

    fn name(&self) -> &'static str {
        "GRUB"
    }

    fn apply(&self, root: &Sysroot, runner: &dyn ProcessRunner) -> Result<(), KdumpError> {
        check_prerequisite(self, root, runner)?;

        let fragment = root.path(GRUB.target);
        if let Some(parent) = fragment.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&fragment, format!("{}\n", GRUB.content))?;
        // Fragments are sourced as shell during regeneration.
        fs::set_permissions(&fragment, fs::Permissions::from_mode(0o755))?;
        ui::print_success(&format!("Wrote {}.", GRUB.target));

        regenerate(&GRUB, runner)?;
        ui::print_success("GRUB configuration regenerated.");
        Ok(())
    }

    fn remove(&self, root: &Sysroot) -> Result<(), KdumpError> {
        if remove_file_if_present(&root.path(GRUB.target))? {
            ui::print_success(&format!("Removed {}.", GRUB.target));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cmd::testing::RecordingRunner,
        system::testing::{fake_root, put},
    };

    #[test]
    fn test_apply_without_grub_writes_nothing() {
        let (_temp, root) = fake_root();
        let runner = RecordingRunner::default();

        let err = Grub.apply(&root, &runner).unwrap_err();
        assert!(
            matches!(err, KdumpError::PreconditionFailed(ref m) if m.contains("GRUB doesn't seem installed"))
        );
        assert!(!root.path(GRUB.target).exists());
        assert!(!root.path("/etc/default/grub.d").exists());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_apply_writes_executable_fragment_and_regenerates() {
        let (_temp, root) = fake_root();
        put(&root, "/etc/default/grub", "GRUB_TIMEOUT=5\n");
        let runner = RecordingRunner::default();

        Grub.apply(&root, &runner).unwrap();

        let fragment = root.path(GRUB.target);
        assert_eq!(
            fs::read_to_string(&fragment).unwrap(),
            "GRUB_CMDLINE_LINUX_DEFAULT=\"$GRUB_CMDLINE_LINUX_DEFAULT crashkernel=256M\"\n"
        );
        let mode = fs::metadata(&fragment).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(
            runner.calls(),
            vec![vec!["grub-mkconfig", "-o", "/boot/grub/grub.cfg"]]
        );
    }

    #[test]
    fn test_regeneration_failure_keeps_fragment() {
        let (_temp, root) = fake_root();
        put(&root, "/etc/default/grub", "GRUB_TIMEOUT=5\n");
        let runner = RecordingRunner::default().failing("grub-mkconfig");

        let err = Grub.apply(&root, &runner).unwrap_err();
        assert!(matches!(err, KdumpError::RegenerationFailed(ref cmd, 1) if cmd.starts_with("grub-mkconfig")));
        assert!(root.path(GRUB.target).exists());
    }

    #[test]
    fn test_reapply_overwrites_fragment() {
        let (_temp, root) = fake_root();
        put(&root, "/etc/default/grub", "GRUB_TIMEOUT=5\n");
        let runner = RecordingRunner::default();

        Grub.apply(&root, &runner).unwrap();
        Grub.apply(&root, &runner).unwrap();

        let content = fs::read_to_string(root.path(GRUB.target)).unwrap();
        assert_eq!(content.matches("crashkernel=").count(), 1);
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_remove_deletes_fragment() {
        let (_temp, root) = fake_root();
        put(&root, GRUB.target, "anything\n");

        Grub.remove(&root).unwrap();
        assert!(!root.path(GRUB.target).exists());
        Grub.remove(&root).unwrap();
    }
}
