use std::{fs, path::PathBuf, str::FromStr};

use crate::{config, error::KdumpError};

// ── Sysroot ───────────────────────────────────────────────────────────────────

/// Filesystem root against which every absolute path is resolved.
/// `/` on a real system.
#[derive(Debug, Clone)]
pub struct Sysroot(PathBuf);

impl Sysroot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Sysroot(root.into())
    }

    pub fn host() -> Self {
        Sysroot::new("/")
    }

    /// `/etc/default/grub` → `<root>/etc/default/grub`
    pub fn path(&self, absolute: &str) -> PathBuf {
        self.0.join(absolute.trim_start_matches('/'))
    }
}

// ── Kernel-exposed state ──────────────────────────────────────────────────────

/// Values the kernel exposes through `/proc` and `/sys`.
/// Every call is a fresh read; nothing is cached between calls.
pub trait SystemEnvironment {
    fn read_bootloader_descriptor(&self) -> Result<u32, KdumpError>;
    fn read_crash_reserved_size(&self) -> Result<u64, KdumpError>;
    fn read_crash_loaded_flag(&self) -> Result<bool, KdumpError>;
    fn current_kernel_release(&self) -> Result<String, KdumpError>;
    /// Base name of the `/boot` image and initramfs for `release` (e.g. `linux-lts`).
    fn kernel_base_name(&self, release: &str) -> Result<String, KdumpError>;
}

/// Reads the live pseudo-files under a [`Sysroot`].
pub struct HostEnvironment {
    root: Sysroot,
}

impl HostEnvironment {
    pub fn new(root: Sysroot) -> Self {
        HostEnvironment { root }
    }

    fn read_value(&self, absolute: &str) -> Result<String, KdumpError> {
        let path = self.root.path(absolute);
        fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|e| KdumpError::EnvironmentUnavailable {
                path,
                reason: e.to_string(),
            })
    }

    fn read_number<T: FromStr>(&self, absolute: &str) -> Result<T, KdumpError> {
        let raw = self.read_value(absolute)?;
        raw.parse().map_err(|_| KdumpError::EnvironmentUnavailable {
            path: self.root.path(absolute),
            reason: format!("unexpected value '{}'", raw),
        })
    }
}

impl SystemEnvironment for HostEnvironment {
    fn read_bootloader_descriptor(&self) -> Result<u32, KdumpError> {
        self.read_number(config::BOOTLOADER_TYPE)
    }

    fn read_crash_reserved_size(&self) -> Result<u64, KdumpError> {
        self.read_number(config::KEXEC_CRASH_SIZE)
    }

    fn read_crash_loaded_flag(&self) -> Result<bool, KdumpError> {
        self.read_number::<u8>(config::KEXEC_CRASH_LOADED)
            .map(|flag| flag != 0)
    }

    fn current_kernel_release(&self) -> Result<String, KdumpError> {
        self.read_value(config::OS_RELEASE)
    }

    fn kernel_base_name(&self, release: &str) -> Result<String, KdumpError> {
        self.read_value(&format!("{}/{}/pkgbase", config::MODULES_DIR, release))
    }
}

// ── Test helpers ──────────────────────────────────────────────────────────────
