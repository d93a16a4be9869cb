//! Running external tools
//!
//! Every subprocess call returns its own captured output (stdout followed by
//! stderr) to the caller. A non-zero exit becomes [`Error::Subprocess`]
//! carrying that output, so the failing tool's diagnostics reach the operator.

use std::path::Path;
use std::process::{Command, ExitStatus};

use log::trace;

use crate::error::{Error, Result};

/// Render a command line for logs and error messages.
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `program` in `dir` and return its exit status with combined output,
/// without judging the status.
pub fn output(program: &str, args: &[&str], dir: &Path) -> Result<(ExitStatus, String)> {
    trace!("running `{}` in {}", display_command(program, args), dir.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::ToolNotFound {
            tool: program.to_string(),
            message: e.to_string(),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok((output.status, combined))
}

/// Run `program` in `dir`, failing on a non-zero exit.
pub fn run(program: &str, args: &[&str], dir: &Path) -> Result<String> {
    let (status, combined) = output(program, args, dir)?;
    if !status.success() {
        return Err(Error::Subprocess {
            command: display_command(program, args),
            dir: dir.to_path_buf(),
            output: combined,
        });
    }
    Ok(combined)
}
