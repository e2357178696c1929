//! Build metadata for the startup log line
//!
//! - `FSKC_SOURCE_REVISION`: `git describe` of the checkout, `-dirty` marked
//! - `FSKC_BUILT_AT`: RFC 3339 time, taken from `SOURCE_DATE_EPOCH` when set
//! - `FSKC_BUILD_TARGET`: `<target triple>/<profile>`

use chrono::{DateTime, SecondsFormat, Utc};
use std::env;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn built_at() -> String {
    let pinned = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    pinned
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn main() {
    let revision = git(&["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| format!("v{}-nogit", env!("CARGO_PKG_VERSION")));

    let target = format!(
        "{}/{}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string()),
        env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string())
    );

    println!("cargo:rustc-env=FSKC_SOURCE_REVISION={}", revision);
    println!("cargo:rustc-env=FSKC_BUILT_AT={}", built_at());
    println!("cargo:rustc-env=FSKC_BUILD_TARGET={}", target);

    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    // Package dir is below the workspace root
    if let Some(git_dir) = git(&["rev-parse", "--absolute-git-dir"]) {
        println!("cargo:rerun-if-changed={}/HEAD", git_dir);
        println!("cargo:rerun-if-changed={}/index", git_dir);
    }
}
