use std::process::Command;

/// Capture the toolchain version for `metadata.rust_version`.
fn main() {
    let version = Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    if !version.is_empty() {
        println!("cargo:rustc-env=GAZE_RUSTC_VERSION={version}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
