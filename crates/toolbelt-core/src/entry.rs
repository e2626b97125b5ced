//! Walk entry and file metadata types.

use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use compact_str::CompactString;

/// Kind of a directory child as seen by a lister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Anything else (symlinks, sockets, devices, fifos).
    Other,
}

impl EntryKind {
    /// Classify a file type without following symlinks.
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Other
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// Snapshot of file metadata taken when the entry was visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// File name, exactly as returned by the OS.
    pub name: OsString,
    /// Size in bytes.
    pub size: u64,
    /// Unix permission and type bits (0 on platforms without them).
    pub mode: u32,
    /// Last modification time.
    pub modified: SystemTime,
    /// Whether the file is read-only.
    pub readonly: bool,
}

impl FileInfo {
    /// Create file info from explicit values.
    pub fn new(name: impl Into<OsString>, size: u64, mode: u32, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            size,
            mode,
            modified,
            readonly: false,
        }
    }

    /// Build file info from filesystem metadata.
    pub fn from_metadata(name: impl Into<OsString>, metadata: &Metadata) -> Self {
        Self {
            name: name.into(),
            size: metadata.len(),
            mode: get_mode(metadata),
            modified: metadata.modified().unwrap_or(std::time::UNIX_EPOCH),
            readonly: metadata.permissions().readonly(),
        }
    }

    /// File name as a compact, lossily converted string for display.
    pub fn name_lossy(&self) -> CompactString {
        CompactString::new(self.name.to_string_lossy())
    }

    /// Check if any execute bit is set (always false off unix).
    pub fn is_executable(&self) -> bool {
        self.mode & 0o111 != 0
    }
}

#[cfg(unix)]
fn get_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

#[cfg(not(unix))]
fn get_mode(_metadata: &Metadata) -> u32 {
    0
}

/// A regular file discovered by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Directory containing the file, as reached from the walk root.
    pub directory: PathBuf,
    /// Metadata captured at visit time.
    pub info: FileInfo,
}

impl WalkEntry {
    /// Create a new walk entry.
    pub fn new(directory: impl Into<PathBuf>, info: FileInfo) -> Self {
        Self {
            directory: directory.into(),
            info,
        }
    }

    /// Full path of the file: the directory joined with the file name.
    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.info.name)
    }

    /// The file name.
    pub fn file_name(&self) -> &OsStr {
        &self.info.name
    }

    /// The containing directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.info.size
    }
}
