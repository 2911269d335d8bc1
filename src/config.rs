// ── Kernel interfaces ─────────────────────────────────────────────────────────

pub const BOOTLOADER_TYPE: &str = "/proc/sys/kernel/bootloader_type";
pub const KEXEC_CRASH_SIZE: &str = "/sys/kernel/kexec_crash_size";
pub const KEXEC_CRASH_LOADED: &str = "/sys/kernel/kexec_crash_loaded";
pub const OS_RELEASE: &str = "/proc/sys/kernel/osrelease";

/// `<MODULES_DIR>/<release>/pkgbase` names the package the running kernel came from.
pub const MODULES_DIR: &str = "/usr/lib/modules";
pub const BOOT_DIR: &str = "/boot";
pub const CRASH_DIR: &str = "/var/crash";

/// High nibble of `bootloader_type`.
pub const FAMILY_GRUB: u32 = 0x7;
pub const FAMILY_EFI_STUB: u32 = 0x2;

// ── kexec ─────────────────────────────────────────────────────────────────────

pub const KEXEC: &str = "kexec";

/// Appended to the reused command line of the crash kernel. The capture
/// environment inherits whatever device and IRQ state the panic left behind.
pub const CRASH_APPEND: &str = "fsck.mode=force fsck.repair=yes nr_cpus=1 irqpoll reset_devices";

// ── Bootloaders ───────────────────────────────────────────────────────────────

pub const SDBOOT_MANAGE: &str = "sdboot-manage";

/// What must be present before a bootloader's configuration is touched.
#[derive(Debug, Clone, Copy)]
pub enum Prerequisite {
    File(&'static str),
    Tool(&'static str),
}

/// Where and how the crashkernel parameter is injected for one bootloader.
#[derive(Debug, Clone, Copy)]
pub struct CrashKernelConfig {
    pub prerequisite: Prerequisite,
    /// File written (or edited in place) by `apply`.
    pub target: &'static str,
    /// Written verbatim, or inserted for in-place edits.
    pub content: &'static str,
    /// Command that makes the change visible on next boot. Empty when none.
    pub regenerate: &'static [&'static str],
}

pub const GRUB: CrashKernelConfig = CrashKernelConfig {
    prerequisite: Prerequisite::File("/etc/default/grub"),
    target: "/etc/default/grub.d/kdump.cfg",
    content: r#"GRUB_CMDLINE_LINUX_DEFAULT="$GRUB_CMDLINE_LINUX_DEFAULT crashkernel=256M""#,
    regenerate: &["grub-mkconfig", "-o", "/boot/grub/grub.cfg"],
};

pub const SYSTEMD_BOOT: CrashKernelConfig = CrashKernelConfig {
    prerequisite: Prerequisite::Tool(SDBOOT_MANAGE),
    target: "/etc/sdboot-manage.d/kdump.conf",
    content: r#"LINUX_OPTIONS+=" crashkernel=256M""#,
    regenerate: &[SDBOOT_MANAGE, "gen"],
};

pub const REFIND: CrashKernelConfig = CrashKernelConfig {
    prerequisite: Prerequisite::File("/boot/refind_linux.conf"),
    target: "/boot/refind_linux.conf",
    content: " crashkernel=128M",
    regenerate: &[],
};

/// Stripped from the rEFInd file by `cleanup`. Note this is not the 128M
/// value `REFIND` inserts, so a rEFInd setup survives cleanup.
pub const REFIND_CLEANUP: &str = "crashkernel=256M";
