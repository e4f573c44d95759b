//! Stamps the binary with the commit it was built from, when, and how.
//!
//! Sets `GIT_HASH` (short hash, `-dirty` suffix for uncommitted changes),
//! `BUILD_TIMESTAMP` (RFC 3339, UTC) and `BUILD_PROFILE`.

use std::process::Command;

/// Trimmed stdout of a successful git invocation
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn commit_label() -> String {
    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|changes| !changes.is_empty());
    if dirty {
        format!("{}-dirty", hash)
    } else {
        hash
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    if let Some(head) = git(&["rev-parse", "--git-path", "HEAD"]) {
        println!("cargo:rerun-if-changed={}", head);
    }

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    println!("cargo:rustc-env=GIT_HASH={}", commit_label());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built_at);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
