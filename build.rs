use std::env;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = match env::var("PROFILE").as_deref() {
        Ok("release") => "release",
        _ => "development",
    };

    let commit = git(&["rev-parse", "--short", "HEAD"])
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|s| !s.is_empty());

    println!("cargo:rustc-env=ELECTIVE_VERSION={}", version);
    println!("cargo:rustc-env=ELECTIVE_TARGET={}", target);
    println!("cargo:rustc-env=ELECTIVE_PROFILE={}", profile);
    println!(
        "cargo:rustc-env=ELECTIVE_GIT_HASH={}{}",
        commit,
        if dirty { "-dirty" } else { "" }
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=PROFILE");
}
