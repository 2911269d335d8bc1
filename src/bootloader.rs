use crate::{
    cmd::ProcessRunner,
    config::{FAMILY_EFI_STUB, FAMILY_GRUB, SDBOOT_MANAGE},
    error::KdumpError,
    system::SystemEnvironment,
};

/// Bootloader families this tool knows how to configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootloaderVariant {
    Grub,
    SystemdBoot,
    Refind,
    Unknown,
}

impl BootloaderVariant {
    /// Human-readable label shown to the user.
    pub fn display_name(self) -> &'static str {
        match self {
            BootloaderVariant::Grub => "GRUB",
            BootloaderVariant::SystemdBoot => "systemd-boot",
            BootloaderVariant::Refind => "rEFInd",
            BootloaderVariant::Unknown => "unknown",
        }
    }
}

/// Maps a raw `bootloader_type` value to a variant.
///
/// The EFI-stub family is split by asking whether the systemd-boot manager
/// is installed; without it the system is assumed to boot through rEFInd.
/// Installed means `sdboot-manage` resolves in `PATH`.
pub fn classify(descriptor: u32, runner: &dyn ProcessRunner) -> BootloaderVariant {
    match descriptor >> 4 {
        FAMILY_GRUB => BootloaderVariant::Grub,
        FAMILY_EFI_STUB if runner.is_installed(SDBOOT_MANAGE) => BootloaderVariant::SystemdBoot,
        FAMILY_EFI_STUB => BootloaderVariant::Refind,
        _ => BootloaderVariant::Unknown,
    }
}

/// Reads the live descriptor and classifies it. Only an unreadable
/// descriptor is an error; an unrecognised one is `Unknown`.
pub fn detect(
    env: &dyn SystemEnvironment,
    runner: &dyn ProcessRunner,
) -> Result<BootloaderVariant, KdumpError> {
    let descriptor = env.read_bootloader_descriptor()?;
    Ok(classify(descriptor, runner))
}
