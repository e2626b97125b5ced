//! Error type shared by the toolbelt crates.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by toolbelt helpers.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path was expected to be a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Invalid argument passed to a helper.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Reading or writing an archive failed.
    #[error("Archive error at {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// A command could not be started.
    #[error("Failed to start '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A command exited unsuccessfully.
    #[error("Command '{command}' failed with {status}. Output:\n{output}")]
    Command {
        command: String,
        status: String,
        output: String,
    },

    /// A git checkout has uncommitted changes.
    #[error("Git repo in '{dir}' is not clean")]
    GitNotClean { dir: PathBuf },

    /// Operation was interrupted.
    #[error("Operation interrupted")]
    Interrupted,
}

impl ToolError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an archive error.
    pub fn archive(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_io() {
        let err = ToolError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ToolError::PermissionDenied { .. }));

        let err = ToolError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ToolError::NotFound { .. }));

        let err = ToolError::io("/test/path", std::io::Error::other("boom"));
        assert!(matches!(err, ToolError::Io { .. }));
    }

    #[test]
    fn test_command_error_message() {
        let err = ToolError::Command {
            command: "git status".to_string(),
            status: "exit status: 128".to_string(),
            output: "fatal: not a git repository".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git status"));
        assert!(msg.contains("fatal: not a git repository"));
    }
}
