use std::process::Command;

fn main() {
    let version = git_tag_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    let version = match git_short_hash() {
        Some(hash) => format!("{} ({})", version, hash),
        None => version,
    };

    println!("cargo:rustc-env=APP_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Latest tag without its `v` prefix
fn git_tag_version() -> Option<String> {
    let tag = git(&["describe", "--tags", "--abbrev=0"])?;
    Some(tag.strip_prefix('v').unwrap_or(&tag).to_string())
}

fn git_short_hash() -> Option<String> {
    git(&["rev-parse", "--short", "HEAD"])
}
