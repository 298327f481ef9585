use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn demo_catalog() -> PathBuf {
    repo_root().join("catalog").join("roles.json")
}

pub fn demo_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_role-demo"));
    cmd.env_remove("ROLECRAFT_CATALOG").env_remove("RUST_LOG");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Write `contents` to a temporary `.json` catalog that lives as long as the
/// returned handle.
pub fn write_catalog(contents: &serde_json::Value) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .context("failed to allocate catalog file")?;
    serde_json::to_writer_pretty(&mut file, contents)?;
    file.flush()?;
    Ok(file)
}
