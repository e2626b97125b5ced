//! Small filesystem helpers.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::{Result, ToolError};

/// Check if a path exists. Any error (including lack of permission) counts
/// as non-existence.
pub fn path_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).is_ok()
}

/// Check if a path exists and is a regular file.
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Check if a path exists and is a directory.
pub fn dir_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Whether `path` is a directory. Errors if it cannot be stat'ed.
pub fn path_is_dir(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| ToolError::io(path, e))?;
    Ok(metadata.is_dir())
}

/// Size of the file at `path`, without following a final symlink.
pub fn file_size(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let metadata = fs::symlink_metadata(path).map_err(|e| ToolError::io(path, e))?;
    Ok(metadata.len())
}

/// Create `dir` and all missing parents.
pub fn create_dir_if_not_exists(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| ToolError::io(dir, e))
}

/// Create the parent directories of `path`. Returns the parent.
pub fn create_dir_for_file(path: impl AsRef<Path>) -> Result<PathBuf> {
    let parent = path
        .as_ref()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    if !parent.as_os_str().is_empty() {
        create_dir_if_not_exists(&parent)?;
    }
    Ok(parent)
}

/// Write `data` to `path`, creating parent directories as needed.
pub fn write_bytes_to_file(data: &[u8], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    create_dir_for_file(path)?;
    fs::write(path, data).map_err(|e| ToolError::io(path, e))
}

/// Copy `src` to `dst`, returning the number of bytes copied.
pub fn copy_file(dst: impl AsRef<Path>, src: impl AsRef<Path>) -> Result<u64> {
    let (dst, src) = (dst.as_ref(), src.as_ref());
    fs::copy(src, dst).map_err(|e| ToolError::io(src, e))
}

/// List the files in `dir`, descending into subdirectories when
/// `recursive` is set. Order follows the directory traversal.
pub fn list_files_in_dir(dir: impl AsRef<Path>, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(dir.as_ref(), recursive, &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ToolError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()
        .map_err(|e| ToolError::io(dir, e))?;
    entries.sort();

    for path in entries {
        if path_is_dir(&path)? {
            if recursive {
                collect_files(&path, recursive, files)?;
            }
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Read all lines from a reader, without line terminators.
pub fn read_lines_from_reader(reader: impl BufRead) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

/// Read all lines from a file, without line terminators.
pub fn read_lines_from_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ToolError::io(path, e))?;
    read_lines_from_reader(BufReader::new(file)).map_err(|e| ToolError::io(path, e))
}

/// Spread a long hash-like file name over nested directories:
/// `abcdefghijkl` becomes `ab/cd/ef/gh/ij/kl`.
pub fn dirify_file_name(name: &str) -> Result<PathBuf> {
    if name.len() < 11 || !name.is_ascii() {
        return Err(ToolError::invalid_argument(format!(
            "'{name}' is too short to split into directories"
        )));
    }
    let mut path = PathBuf::new();
    for i in (0..10).step_by(2) {
        path.push(&name[i..i + 2]);
    }
    path.push(&name[10..]);
    Ok(path)
}

/// The current user's home directory.
pub fn user_home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Replace a leading `~` with the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = user_home_dir() {
            let rest = rest.trim_start_matches(['/', '\\']);
            return if rest.is_empty() { home } else { home.join(rest) };
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exists_helpers() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "data").unwrap();

        assert!(file_exists(&file));
        assert!(!file_exists(temp.path()));
        assert!(dir_exists(temp.path()));
        assert!(!dir_exists(&file));
        assert!(path_exists(&file));
        assert!(!path_exists(temp.path().join("nope")));
        assert!(path_is_dir(temp.path()).unwrap());
        assert!(path_is_dir(temp.path().join("nope")).is_err());
        assert_eq!(file_size(&file).unwrap(), 4);
    }

    #[test]
    fn test_write_bytes_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/c.bin");

        write_bytes_to_file(b"xyz", &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"xyz");

        let copy = temp.path().join("copy.bin");
        assert_eq!(copy_file(&copy, &path).unwrap(), 3);
        assert_eq!(fs::read(copy).unwrap(), b"xyz");
    }

    #[test]
    fn test_list_files_in_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("a.txt"), "").unwrap();
        fs::write(temp.path().join("sub/b.txt"), "").unwrap();

        let flat = list_files_in_dir(temp.path(), false).unwrap();
        assert_eq!(flat, vec![temp.path().join("a.txt")]);

        let deep = list_files_in_dir(temp.path(), true).unwrap();
        assert_eq!(deep, vec![temp.path().join("a.txt"), temp.path().join("sub/b.txt")]);
    }

    #[test]
    fn test_read_lines() {
        let lines = read_lines_from_reader("line 1\nline 2\r\nline 3".as_bytes()).unwrap();
        assert_eq!(lines, vec!["line 1", "line 2", "line 3"]);

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lines.txt");
        fs::write(&path, "line 1\nline 2\nline 3\n").unwrap();
        let lines = read_lines_from_file(&path).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "line 1");
    }

    #[test]
    fn test_dirify_file_name() {
        let path = dirify_file_name("abcdefghijkl").unwrap();
        assert_eq!(path, PathBuf::from("ab/cd/ef/gh/ij/kl"));
        assert!(dirify_file_name("short").is_err());
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = user_home_dir() {
            assert_eq!(expand_tilde("~/notes.txt"), home.join("notes.txt"));
            assert_eq!(expand_tilde("~"), home);
        }
    }
}
