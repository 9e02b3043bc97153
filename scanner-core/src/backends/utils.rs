use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::process::Command;

/// Runs `program args...` to completion and returns its stdout.
///
/// A binary that cannot be found maps to `Error::ToolUnavailable`; a
/// non-success exit status maps to `Error::CommandFailed` with the stderr text.
pub async fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    let output = match Command::new(program).args(args).output().await {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::ToolUnavailable(program.to_string()));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    if !output.status.success() {
        let err = String::from_utf8_lossy(&output.stderr);
        return Err(Error::CommandFailed(format!(
            "{} {} exited with {}: {}",
            program,
            args.join(" "),
            output.status,
            err.trim()
        )));
    }

    Ok(String::from_utf8(output.stdout)?)
}

/// Whether `program` exists: absolute/relative paths are checked directly,
/// bare names are searched on `PATH`.
pub fn binary_exists(program: &str) -> bool {
    if program.contains('/') {
        return Path::new(program).exists();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
