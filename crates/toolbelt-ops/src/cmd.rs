//! Running subprocesses and a few git conveniences.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{Result, ToolError};

/// Format a command as its program base name followed by its arguments.
pub fn fmt_cmd_short(cmd: &Command) -> String {
    let program = Path::new(cmd.get_program())
        .file_name()
        .unwrap_or(cmd.get_program())
        .to_string_lossy()
        .into_owned();
    std::iter::once(program)
        .chain(cmd.get_args().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command to completion and return its output (stdout followed by
/// stderr). A non-zero exit is an error carrying that output.
pub fn run_cmd(cmd: &mut Command) -> Result<String> {
    let short = fmt_cmd_short(cmd);
    tracing::info!("> {short}");

    let output = cmd.output().map_err(|e| ToolError::CommandSpawn {
        command: short.clone(),
        source: e,
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        tracing::warn!(command = %short, status = %output.status, "command failed");
        return Err(ToolError::Command {
            command: short,
            status: output.status.to_string(),
            output: combined,
        });
    }
    if !combined.is_empty() {
        tracing::debug!(command = %short, "output:\n{combined}");
    }
    Ok(combined)
}

/// Run a command with its output going straight to this process's stdout
/// and stderr.
pub fn run_cmd_logged(cmd: &mut Command) -> Result<()> {
    let short = fmt_cmd_short(cmd);
    tracing::info!("> {short}");

    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ToolError::CommandSpawn {
            command: short.clone(),
            source: e,
        })?;

    if !status.success() {
        return Err(ToolError::Command {
            command: short,
            status: status.to_string(),
            output: String::new(),
        });
    }
    Ok(())
}

fn git(dir: Option<&Path>, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd
}

/// `git pull` in `dir` (the current directory when `None`).
pub fn git_pull(dir: Option<&Path>) -> Result<String> {
    run_cmd(&mut git(dir, &["pull"]))
}

/// `git status` output for `dir` (the current directory when `None`).
pub fn git_status(dir: Option<&Path>) -> Result<String> {
    run_cmd(&mut git(dir, &["status"]))
}

/// Whether the checkout in `dir` has no modified, staged or untracked files.
pub fn is_git_clean(dir: Option<&Path>) -> Result<bool> {
    let porcelain = run_cmd(&mut git(dir, &["status", "--porcelain"]))?;
    let clean = porcelain.trim().is_empty();
    if !clean {
        tracing::info!(
            dir = %dir.unwrap_or(Path::new(".")).display(),
            "git repo not clean:\n{porcelain}"
        );
    }
    Ok(clean)
}

/// Error unless the checkout in `dir` is clean.
pub fn ensure_git_clean(dir: Option<&Path>) -> Result<()> {
    if is_git_clean(dir)? {
        Ok(())
    } else {
        Err(ToolError::GitNotClean {
            dir: dir.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fmt_cmd_short() {
        let mut cmd = Command::new("/usr/bin/git");
        cmd.args(["status", "-s"]);
        assert_eq!(fmt_cmd_short(&cmd), "git status -s");

        assert_eq!(fmt_cmd_short(&Command::new("ls")), "ls");
    }

    #[test]
    fn test_spawn_failure() {
        let err = run_cmd(&mut Command::new("toolbelt-no-such-program")).unwrap_err();
        assert!(matches!(err, ToolError::CommandSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_cmd_captures_output() {
        let out = run_cmd(Command::new("sh").args(["-c", "echo out; echo err >&2"])).unwrap();
        assert_eq!(out, "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_cmd_failure_keeps_output() {
        let err = run_cmd(Command::new("sh").args(["-c", "echo oops; exit 3"])).unwrap_err();
        match err {
            ToolError::Command { command, output, .. } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(output, "oops\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_cmd_logged_status() {
        assert!(run_cmd_logged(Command::new("sh").args(["-c", "exit 0"])).is_ok());
        assert!(run_cmd_logged(Command::new("sh").args(["-c", "exit 1"])).is_err());
    }

    #[test]
    fn test_git_clean_detection() {
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let dir = Some(temp.path());
        run_cmd(&mut git(dir, &["init", "-q"])).unwrap();

        assert!(is_git_clean(dir).unwrap());
        assert!(ensure_git_clean(dir).is_ok());

        std::fs::write(temp.path().join("new.txt"), "x").unwrap();
        assert!(!is_git_clean(dir).unwrap());
        assert!(matches!(
            ensure_git_clean(dir).unwrap_err(),
            ToolError::GitNotClean { .. }
        ));
    }
}
