use crate::{
    bootloader::{self, BootloaderVariant},
    cmd::ProcessRunner,
    error::KdumpError,
    installer::Installer,
    kexec::{CrashKernelController, LoadState},
    system::{SystemEnvironment, Sysroot},
    ui,
};

/// One invocation, one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Setup,
    Load,
    Unload,
    Cleanup,
    Status,
}

impl Action {
    pub fn parse(arg: &str) -> Option<Self> {
        match arg {
            "setup" => Some(Action::Setup),
            "load" => Some(Action::Load),
            "unload" => Some(Action::Unload),
            "cleanup" => Some(Action::Cleanup),
            "status" => Some(Action::Status),
            _ => None,
        }
    }
}

/// The system an action runs against.
pub struct Context<'a> {
    pub env: &'a dyn SystemEnvironment,
    pub root: &'a Sysroot,
    pub runner: &'a dyn ProcessRunner,
}

impl Context<'_> {
    fn installer(&self) -> Installer<'_> {
        Installer::new(self.root, self.runner)
    }

    fn controller(&self) -> CrashKernelController<'_> {
        CrashKernelController::new(self.env, self.root, self.runner)
    }
}

pub fn execute(action: Action, ctx: &Context) -> Result<(), KdumpError> {
    match action {
        Action::Setup => setup(ctx),
        Action::Load => ctx.controller().load(),
        Action::Unload => ctx.controller().unload(),
        Action::Cleanup => ctx.installer().remove_all(),
        Action::Status => status(ctx),
    }
}

fn setup(ctx: &Context) -> Result<(), KdumpError> {
    let variant = bootloader::detect(ctx.env, ctx.runner)?;
    if variant != BootloaderVariant::Unknown {
        ui::print_info(&format!("Detected bootloader: {}", variant.display_name()));
    }

    ctx.installer().apply(variant)?;

    ui::print_warning("Reboot to reserve crash kernel memory, then run `kdump-setup load`.");
    Ok(())
}

/// Read-only summary. Values that cannot be read are shown as such
/// instead of failing the whole report.
fn status(ctx: &Context) -> Result<(), KdumpError> {
    let bootloader = match bootloader::detect(ctx.env, ctx.runner) {
        Ok(variant) => variant.display_name().to_string(),
        Err(_) => "unavailable".to_string(),
    };
    let reserved = match ctx.env.read_crash_reserved_size() {
        Ok(bytes) => format!("{} MiB", bytes >> 20),
        Err(_) => "unavailable".to_string(),
    };
    let loaded = match ctx.controller().state() {
        Ok(LoadState::Loaded) => "loaded",
        Ok(LoadState::NotLoaded) => "not loaded",
        Err(_) => "unavailable",
    };
    let release = ctx
        .env
        .current_kernel_release()
        .unwrap_or_else(|_| "unavailable".to_string());

    println!();
    ui::print_kv_box(
        "kdump status",
        &[
            ("Bootloader", bootloader.as_str()),
            ("Reserved", reserved.as_str()),
            ("Crash kernel", loaded),
            ("Kernel", release.as_str()),
        ],
    );
    println!();
    Ok(())
}
