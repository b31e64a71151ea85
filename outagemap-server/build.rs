//! Build script for outagemap-server with platform-specific linker selection

use std::env;

fn main() {
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    println!("cargo:rerun-if-changed=build.rs");

    match (target_os.as_str(), target_arch.as_str()) {
        ("linux", "x86_64") | ("linux", "aarch64") => {
            // Faster links when LLD is installed
            if which::which("ld.lld").is_ok() {
                println!("cargo:rustc-link-arg=-fuse-ld=lld");
            }
        }
        _ => {}
    }
}
