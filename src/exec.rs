use anyhow::{Context, Result, anyhow, bail};
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};

use crate::logging;

const INSTALL_HINT: &str =
    "Install the ConductR CLI (pip3 install conductr-cli) and make sure it is on the PATH.";

/// Runs `command args...` with stdout piped and stderr inherited, feeding
/// each stdout line to `on_line` as it arrives. Blocks until the process
/// exits and returns its exit code.
pub fn stream<F>(command: &str, args: &[String], mut on_line: F) -> Result<i32>
where
    F: FnMut(&str),
{
    let mut child = Command::new(command)
        .args(args)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(command, &e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("Failed to open the output of `{command}`"))?;
    for line in BufReader::new(stdout).lines() {
        let line = line.with_context(|| format!("Failed to read the output of `{command}`"))?;
        on_line(&line);
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for `{command}`"))?;
    Ok(status.code().unwrap_or(1))
}

pub fn run(command: &str, args: &[String]) -> Result<()> {
    let code = run_passthrough(command, args)?;
    if code != 0 {
        bail!("`{command}` exited with status {code}");
    }
    Ok(())
}

pub fn run_passthrough(command: &str, args: &[String]) -> Result<i32> {
    stream(command, args, |line| logging::info(line))
}

pub fn capture(command: &str, args: &[String]) -> Result<(i32, Vec<String>)> {
    let mut lines = Vec::new();
    let code = stream(command, args, |line| lines.push(line.to_string()))?;
    Ok((code, lines))
}

pub fn render(command: &str, args: &[String]) -> String {
    let mut rendered = String::from(command);
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

fn spawn_error(command: &str, error: &io::Error) -> anyhow::Error {
    if error.kind() == io::ErrorKind::NotFound {
        anyhow!("`{command}` was not found on the PATH. {INSTALL_HINT}")
    } else {
        anyhow!("Failed to start `{command}`: {error}")
    }
}
