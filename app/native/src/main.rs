#![allow(clippy::multiple_crate_versions)]

//! Wallpaper Agent binary.
//!
//! Runs the rotation agent when called without a subcommand and the
//! maintenance commands (`list`, `cache`, `config`, `schema`) otherwise.

// The desktop integration relies on gsettings, D-Bus and the DRM sysfs tree
#[cfg(not(target_os = "linux"))]
compile_error!("This application only supports Linux.");

fn main() {
    if let Err(err) = wallpaper_agent_lib::cli::run() {
        eprintln!("wallpaper-agent: {err}");
        std::process::exit(1);
    }
}
