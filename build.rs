// Embed git hash for --version. No git = "unknown".
fn main() {
    let mut hash = String::from("unknown");
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(s) = String::from_utf8(output.stdout) {
                hash = s.trim().to_owned();
            }
        }
    }
    println!("cargo:rustc-env=MATCHDAY_GIT_HASH={hash}");
}
