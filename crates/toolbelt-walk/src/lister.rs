//! Directory listing abstraction.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use toolbelt_core::{EntryKind, FileInfo};

/// One child of a listed directory.
#[derive(Debug, Clone)]
pub struct ListedEntry {
    /// Name of the child within its directory.
    pub name: OsString,
    /// What the child is, without following symlinks.
    pub kind: EntryKind,
    /// Metadata for regular files. `None` for other kinds, or when the
    /// metadata could not be read.
    pub info: Option<FileInfo>,
}

impl ListedEntry {
    /// A regular file with the given metadata.
    pub fn file(info: FileInfo) -> Self {
        Self {
            name: info.name.clone(),
            kind: EntryKind::File,
            info: Some(info),
        }
    }

    /// A regular file with only a name and size.
    pub fn file_named(name: impl Into<OsString>, size: u64) -> Self {
        Self::file(FileInfo::new(name, size, 0o644, SystemTime::UNIX_EPOCH))
    }

    /// A subdirectory.
    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            info: None,
        }
    }

    /// Anything that is neither a file nor a directory.
    pub fn other(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Other,
            info: None,
        }
    }
}

/// Lists the immediate children of a directory.
///
/// The walker calls this once per visited directory from its worker thread.
pub trait DirLister: Send + Sync {
    /// List `dir`. An error means the whole directory is skipped.
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>>;
}

/// Lists directories on the host filesystem. Symlinks are reported as
/// [`EntryKind::Other`] and never followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
        let mut children = Vec::new();

        for entry_result in fs::read_dir(dir)? {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    tracing::trace!(dir = %dir.display(), error = %err, "unreadable directory entry");
                    continue;
                }
            };

            let name = entry.file_name();
            let kind = match entry.file_type() {
                Ok(t) => EntryKind::from_file_type(t),
                Err(err) => {
                    tracing::trace!(dir = %dir.display(), error = %err, "unreadable file type");
                    EntryKind::Other
                }
            };

            let info = if kind.is_file() {
                match entry.metadata() {
                    Ok(m) => Some(FileInfo::from_metadata(name.clone(), &m)),
                    Err(err) => {
                        tracing::trace!(dir = %dir.display(), error = %err, "unreadable metadata");
                        None
                    }
                }
            } else {
                None
            };

            children.push(ListedEntry { name, kind, info });
        }

        Ok(children)
    }
}
