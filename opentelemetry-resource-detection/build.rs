use std::env;
use std::process::Command;

// Exports the compiler version for the `process` detector.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RUSTC");

    // Cargo points RUSTC at the compiler building this crate.
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let Some(description) = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|stdout| stdout.trim().to_string())
    else {
        return;
    };

    // "rustc 1.76.0 (07dca489a 2024-02-04)" has version "1.76.0".
    if let Some(version) = description.split_whitespace().nth(1) {
        println!("cargo:rustc-env=RUSTC_VERSION={version}");
    }
    println!("cargo:rustc-env=RUSTC_VERSION_DESCRIPTION={description}");
}
