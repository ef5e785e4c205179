use std::process::Command;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Embed the commit and build time reported by `/health`.
fn main() {
    // The crate lives two levels below the repository root.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let git_sha = commit_hash().unwrap_or_else(|| "unknown".into());
    let build_date = build_timestamp().unwrap_or_else(|| "unknown-date".into());

    println!("cargo:rustc-env=GIT_SHA={git_sha}");
    println!("cargo:rustc-env=BUILD_DATE={build_date}");
}

fn commit_hash() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?;
    let sha = sha.trim();
    (!sha.is_empty()).then(|| sha.to_string())
}

/// `SOURCE_DATE_EPOCH` when set, for reproducible builds; now otherwise.
fn build_timestamp() -> Option<String> {
    let at = match std::env::var("SOURCE_DATE_EPOCH") {
        Ok(secs) => OffsetDateTime::from_unix_timestamp(secs.trim().parse().ok()?).ok()?,
        Err(_) => OffsetDateTime::now_utc(),
    };
    at.format(&Rfc3339).ok()
}
