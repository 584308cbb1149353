//! GIT_VERSION を埋め込む。
//! git の無いソース配布物では SIGN_RECOGNIZER_GIT_VERSION で上書きできる。

const OVERRIDE_VAR: &str = "SIGN_RECOGNIZER_GIT_VERSION";

fn git_describe() -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed={}", OVERRIDE_VAR);

    let version = std::env::var(OVERRIDE_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(git_describe)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_VERSION={}", version);
}
