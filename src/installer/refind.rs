use std::fs;

use super::{check_prerequisite, BootloaderHandler};
use crate::{
    cmd::ProcessRunner,
    config::{CrashKernelConfig, REFIND, REFIND_CLEANUP},
    error::KdumpError,
    system::Sysroot,
    ui,
};

/// rEFInd: edits the options of `refind_linux.conf` in place.
///
/// Each line of that file is `"<label>" "<kernel options>"`. The parameter
/// goes into the first such line, before its closing quote.
pub struct Refind;

impl BootloaderHandler for Refind {
    fn config(&self) -> &'static CrashKernelConfig {
        &REFIND
    }

    fn name(&self) -> &'static str {
        "rEFInd"
    }

    fn apply(&self, root: &Sysroot, runner: &dyn ProcessRunner) -> Result<(), KdumpError> {
        check_prerequisite(self, root, runner)?;

        let path = root.path(REFIND.target);
        let original = fs::read_to_string(&path)?;

        match insert_parameter(&original, REFIND.content)? {
            Some(updated) => {
                fs::write(&path, updated)?;
                ui::print_success(&format!(
                    "Added{} to {}.",
                    REFIND.content, REFIND.target
                ));
            }
            None => ui::print_info(&format!(
                "{} already sets crashkernel, leaving it unchanged.",
                REFIND.target
            )),
        }
        Ok(())
    }

    fn remove(&self, root: &Sysroot) -> Result<(), KdumpError> {
        let path = root.path(REFIND.target);
        if !path.exists() {
            return Ok(());
        }

        let original = fs::read_to_string(&path)?;
        if original.contains(REFIND_CLEANUP) {
            fs::write(&path, original.replace(REFIND_CLEANUP, ""))?;
            ui::print_success(&format!("Removed {} from {}.", REFIND_CLEANUP, REFIND.target));
        }
        Ok(())
    }
}

/// Inserts `parameter` before the trailing quote of the first options line.
///
/// The first line that is neither blank nor a `#` comment is the only
/// candidate: if it does not end in `"` the edit is refused rather than
/// guessing at a later line. Returns `None` when that line already carries
/// a `crashkernel=` option.
pub(crate) fn insert_parameter(text: &str, parameter: &str) -> Result<Option<String>, KdumpError> {
    // Lines keep their terminators so CRLF files round-trip unchanged.
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let index = lines
        .iter()
        .position(|l| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('#')
        })
        .ok_or_else(|| {
            KdumpError::PreconditionFailed(format!(
                "{} has no boot options line. Add{} manually.",
                REFIND.target, parameter
            ))
        })?;

    let line = lines[index];
    let body = line.trim_end();
    let ending = &line[body.len()..];

    if body.contains("crashkernel=") {
        return Ok(None);
    }
    let Some(head) = body.strip_suffix('"') else {
        return Err(KdumpError::PreconditionFailed(format!(
            "The first options line of {} does not end in a quote. Add{} manually.",
            REFIND.target, parameter
        )));
    };

    let mut updated = String::with_capacity(text.len() + parameter.len());
    for l in &lines[..index] {
        updated.push_str(l);
    }
    updated.push_str(head);
    updated.push_str(parameter);
    updated.push('"');
    updated.push_str(ending);
    for l in &lines[index + 1..] {
        updated.push_str(l);
    }
    Ok(Some(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cmd::testing::RecordingRunner,
        system::testing::{fake_root, put},
    };

    const STOCK: &str = "\"Boot with standard options\"  \"root=UUID=1234 rw quiet\"\n\
                         \"Boot to single-user mode\"    \"root=UUID=1234 rw single\"\n";

    #[test]
    fn test_insert_into_first_line_only() {
        let updated = insert_parameter(STOCK, " crashkernel=128M").unwrap().unwrap();
        assert_eq!(
            updated,
            "\"Boot with standard options\"  \"root=UUID=1234 rw quiet crashkernel=128M\"\n\
             \"Boot to single-user mode\"    \"root=UUID=1234 rw single\"\n"
        );
    }

    #[test]
    fn test_insert_skips_leading_comments() {
        let text = "# generated by mkrlconf\n\n\"Boot\" \"rw\"";
        let updated = insert_parameter(text, " crashkernel=128M").unwrap().unwrap();
        assert_eq!(updated, "# generated by mkrlconf\n\n\"Boot\" \"rw crashkernel=128M\"");
    }

    #[test]
    fn test_insert_keeps_crlf_line_endings() {
        let text = "\"Boot\" \"rw\"\r\n\"Fb\" \"rw single\"\r\n";
        let updated = insert_parameter(text, " crashkernel=128M").unwrap().unwrap();
        assert_eq!(
            updated,
            "\"Boot\" \"rw crashkernel=128M\"\r\n\"Fb\" \"rw single\"\r\n"
        );
    }

    #[test]
    fn test_insert_refuses_unquoted_first_line() {
        let text = "\"Boot\" \"rw\" extra\n\"Fallback\" \"rw\"\n";
        let err = insert_parameter(text, " crashkernel=128M").unwrap_err();
        assert!(matches!(err, KdumpError::PreconditionFailed(_)));
    }

    #[test]
    fn test_insert_refuses_empty_file() {
        let err = insert_parameter("# nothing here\n", " crashkernel=128M").unwrap_err();
        assert!(matches!(err, KdumpError::PreconditionFailed(_)));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let once = insert_parameter(STOCK, " crashkernel=128M").unwrap().unwrap();
        assert_eq!(insert_parameter(&once, " crashkernel=128M").unwrap(), None);
    }

    #[test]
    fn test_apply_requires_config_file() {
        let (_temp, root) = fake_root();
        let err = Refind.apply(&root, &RecordingRunner::default()).unwrap_err();
        assert!(matches!(err, KdumpError::PreconditionFailed(ref m) if m.contains("rEFInd")));
    }

    #[test]
    fn test_apply_leaves_ambiguous_file_untouched() {
        let (_temp, root) = fake_root();
        put(&root, REFIND.target, "timeout 5\n\"Boot\" \"rw\"\n");

        assert!(Refind.apply(&root, &RecordingRunner::default()).is_err());
        assert_eq!(
            fs::read_to_string(root.path(REFIND.target)).unwrap(),
            "timeout 5\n\"Boot\" \"rw\"\n"
        );
    }

    #[test]
    fn test_cleanup_does_not_match_inserted_size() {
        // Known inconsistency: apply inserts 128M, cleanup strips 256M.
        let (_temp, root) = fake_root();
        put(&root, REFIND.target, STOCK);
        let runner = RecordingRunner::default();

        Refind.apply(&root, &runner).unwrap();
        Refind.remove(&root).unwrap();

        let content = fs::read_to_string(root.path(REFIND.target)).unwrap();
        assert!(content.contains("crashkernel=128M"));
    }

    #[test]
    fn test_cleanup_strips_256m() {
        let (_temp, root) = fake_root();
        put(&root, REFIND.target, "\"Boot\" \"rw crashkernel=256M quiet\"\n");

        Refind.remove(&root).unwrap();
        assert_eq!(
            fs::read_to_string(root.path(REFIND.target)).unwrap(),
            "\"Boot\" \"rw  quiet\"\n"
        );
    }
}
