//! Zip archive creation and reading.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{Result, ToolError};

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Name of `path` inside an archive: relative to `base`, `/`-separated.
fn zip_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|_| {
        ToolError::invalid_argument(format!(
            "{} is not inside {}",
            path.display(),
            base.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    zip_path: &Path,
    name: &str,
    path: &Path,
) -> Result<()> {
    let mut input = File::open(path).map_err(|e| ToolError::io(path, e))?;
    zip.start_file(name, file_options())
        .map_err(|e| ToolError::archive(zip_path, e))?;
    io::copy(&mut input, zip).map_err(|e| ToolError::io(path, e))?;
    tracing::trace!(name, from = %path.display(), "added to zip");
    Ok(())
}

/// Add every regular file under `dir` (recursively) to `zip`, named
/// relative to `base`. Anything that is neither a file nor a directory is
/// rejected.
fn add_dir_recursive<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    zip_path: &Path,
    base: &Path,
    dir: &Path,
) -> Result<()> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ToolError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()
        .map_err(|e| ToolError::io(dir, e))?;
    children.sort();

    for path in children {
        let file_type = fs::symlink_metadata(&path)
            .map_err(|e| ToolError::io(&path, e))?
            .file_type();
        if file_type.is_dir() {
            add_dir_recursive(zip, zip_path, base, &path)?;
        } else if file_type.is_file() {
            let name = zip_name(base, &path)?;
            add_file(zip, zip_path, &name, &path)?;
        } else {
            return Err(ToolError::invalid_argument(format!(
                "{} is not a dir or regular file",
                path.display()
            )));
        }
    }
    Ok(())
}

fn finish<W: Write + Seek>(zip: ZipWriter<W>, zip_path: &Path) -> Result<()> {
    zip.finish()
        .map_err(|e| ToolError::archive(zip_path, e))?
        .flush()
        .map_err(|e| ToolError::io(zip_path, e))
}

/// Create `zip_path` containing every file under `dir`.
///
/// Entry names are relative to `dir`: `dir/foo/bar.txt` is stored as
/// `foo/bar.txt`.
pub fn create_zip_with_dir_content(zip_path: impl AsRef<Path>, dir: impl AsRef<Path>) -> Result<()> {
    let (zip_path, dir) = (zip_path.as_ref(), dir.as_ref());
    let metadata = fs::metadata(dir).map_err(|e| ToolError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(ToolError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let file = File::create(zip_path).map_err(|e| ToolError::io(zip_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    add_dir_recursive(&mut zip, zip_path, dir, dir)?;
    finish(zip, zip_path)
}

/// Create `dst` from files and directories named relative to `base_dir`.
///
/// An existing `dst` is replaced. Directories are added recursively and
/// entries keep their path relative to `base_dir`.
pub fn create_zip_file<S: AsRef<Path>>(
    dst: impl AsRef<Path>,
    base_dir: impl AsRef<Path>,
    to_zip: &[S],
) -> Result<()> {
    let (dst, base_dir) = (dst.as_ref(), base_dir.as_ref());
    if to_zip.is_empty() {
        return Err(ToolError::invalid_argument("nothing to zip"));
    }

    match fs::remove_file(dst) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(ToolError::io(dst, e)),
    }
    tracing::info!(dst = %dst.display(), "creating zip file");

    let file = File::create(dst).map_err(|e| ToolError::io(dst, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for name in to_zip {
        let path = base_dir.join(name);
        let file_type = fs::metadata(&path)
            .map_err(|e| ToolError::io(&path, e))?
            .file_type();
        if file_type.is_dir() {
            add_dir_recursive(&mut zip, dst, base_dir, &path)?;
        } else if file_type.is_file() {
            let zip_name = zip_name(base_dir, &path)?;
            add_file(&mut zip, dst, &zip_name, &path)?;
        } else {
            return Err(ToolError::invalid_argument(format!(
                "{} is not a dir or regular file",
                path.display()
            )));
        }
    }

    finish(zip, dst)
}

/// Read every file stored in a zip archive, keyed by entry name.
pub fn read_zip_file(path: impl AsRef<Path>) -> Result<BTreeMap<String, Vec<u8>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ToolError::io(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ToolError::archive(path, e))?;

    let mut contents = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ToolError::archive(path, e))?;
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| ToolError::io(path, e))?;
        contents.insert(entry.name().to_string(), data);
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("site");
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::write(root.join("css/main.css"), "body {}").unwrap();
        temp
    }

    #[test]
    fn test_zip_dir_content_uses_relative_names() {
        let temp = create_tree();
        let zip_path = temp.path().join("site.zip");

        create_zip_with_dir_content(&zip_path, temp.path().join("site")).unwrap();
        let contents = read_zip_file(&zip_path).unwrap();

        assert_eq!(
            contents.keys().collect::<Vec<_>>(),
            vec!["css/main.css", "index.html"]
        );
        assert_eq!(contents["css/main.css"], b"body {}");
    }

    #[test]
    fn test_zip_dir_content_requires_directory() {
        let temp = create_tree();
        let zip_path = temp.path().join("bad.zip");

        let err =
            create_zip_with_dir_content(&zip_path, temp.path().join("site/index.html")).unwrap_err();
        assert!(matches!(err, ToolError::NotADirectory { .. }));
    }

    #[test]
    fn test_create_zip_file_mixed_inputs() {
        let temp = create_tree();
        let base = temp.path().join("site");
        let dst = temp.path().join("out.zip");
        fs::write(&dst, "stale").unwrap();

        create_zip_file(&dst, &base, &["index.html", "css"]).unwrap();
        let contents = read_zip_file(&dst).unwrap();

        assert_eq!(contents.len(), 2);
        assert_eq!(contents["index.html"], b"<html></html>");
        assert!(contents.contains_key("css/main.css"));
    }

    #[test]
    fn test_create_zip_file_requires_inputs() {
        let temp = create_tree();
        let empty: [&str; 0] = [];
        let err = create_zip_file(temp.path().join("x.zip"), temp.path(), &empty).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }

    #[test]
    fn test_read_zip_file_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("not.zip");
        fs::write(&path, "not a zip").unwrap();

        assert!(matches!(
            read_zip_file(&path).unwrap_err(),
            ToolError::Archive { .. }
        ));
    }
}
