//! Build script for the embedded report store
//!
//! The `surrealdb-embedded` feature links RocksDB; this locates a system
//! RocksDB where one is commonly installed and prefers LLD when present.

use std::env;

fn main() {
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ROCKSDB_LIB_DIR");

    if env::var("CARGO_FEATURE_SURREALDB_EMBEDDED").is_err() {
        return;
    }

    match (target_os.as_str(), target_arch.as_str()) {
        ("linux", _) => {
            if let Ok(lib_dir) = env::var("ROCKSDB_LIB_DIR") {
                println!("cargo:rustc-link-search=native={}", lib_dir);
            } else {
                for path in &["/usr/lib/x86_64-linux-gnu", "/usr/local/lib", "/usr/lib64"] {
                    if std::path::Path::new(path).exists() {
                        println!("cargo:rustc-env=ROCKSDB_LIB_DIR={}", path);
                        break;
                    }
                }
            }

            if which::which("ld.lld").is_ok() {
                println!("cargo:rustc-link-arg=-fuse-ld=lld");
            }
        }
        ("macos", _) => {
            println!("cargo:rustc-link-search=native=/usr/local/lib");
            println!("cargo:rustc-link-search=native=/opt/homebrew/lib");
        }
        _ => {}
    }
}
