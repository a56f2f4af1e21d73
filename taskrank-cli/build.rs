//! Embeds build provenance for `taskrank --version`.
//!
//! TASKRANK_BUILD_SHA is the short commit, suffixed `-dirty` when the tree has
//! local changes. Outside a git checkout (crate tarball, vendored source) it
//! falls back to `v<CARGO_PKG_VERSION>`.

use std::path::Path;
use std::process::Command;

fn git(repo_root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn build_sha(repo_root: &Path) -> String {
    let Some(sha) = git(repo_root, &["rev-parse", "--short", "HEAD"]).filter(|s| !s.is_empty())
    else {
        let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
        return format!("v{version}");
    };

    let dirty = git(repo_root, &["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|s| !s.is_empty());
    if dirty { format!("{sha}-dirty") } else { sha }
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = Path::new(&manifest_dir).join("..");

    println!("cargo:rustc-env=TASKRANK_BUILD_SHA={}", build_sha(&repo_root));
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
}
