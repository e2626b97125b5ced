//! Transparent reading of compressed files and gzip writing.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::{Result, ToolError};

/// Compression format, inferred from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    /// Not compressed.
    None,
    /// `.gz`
    Gzip,
    /// `.bz2`
    Bzip2,
    /// `.xz`
    Xz,
}

impl CompressionKind {
    /// Infer the format from the extension of `path` (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("gz") => CompressionKind::Gzip,
            Some("bz2") => CompressionKind::Bzip2,
            Some("xz") => CompressionKind::Xz,
            _ => CompressionKind::None,
        }
    }
}

/// Open a file for reading, decompressing it on the fly when its extension
/// says it is gzip, bzip2 or xz.
pub fn open_maybe_compressed(path: impl AsRef<Path>) -> Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ToolError::io(path, e))?;
    let reader = BufReader::new(file);

    let boxed: Box<dyn Read + Send> = match CompressionKind::from_path(path) {
        CompressionKind::None => Box::new(reader),
        CompressionKind::Gzip => Box::new(MultiGzDecoder::new(reader)),
        CompressionKind::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
        CompressionKind::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
    };
    Ok(boxed)
}

/// Read a whole file, decompressing it if needed.
pub fn read_maybe_compressed(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut reader = open_maybe_compressed(path)?;
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| ToolError::io(path, e))?;
    Ok(data)
}

/// Write `data` to `path` with best gzip compression.
///
/// A partially written file is removed on failure.
pub fn write_gzipped(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let result = (|| -> io::Result<()> {
        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::best());
        encoder.write_all(data)?;
        encoder.finish()?.flush()
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(path);
        return Err(ToolError::io(path, e));
    }
    Ok(())
}

/// Compress `src` with best gzip compression into `dst`.
pub fn gzip_file(dst: impl AsRef<Path>, src: impl AsRef<Path>) -> Result<()> {
    let (dst, src) = (dst.as_ref(), src.as_ref());
    let mut input = File::open(src).map_err(|e| ToolError::io(src, e))?;
    let output = File::create(dst).map_err(|e| ToolError::io(dst, e))?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::best());
    io::copy(&mut input, &mut encoder).map_err(|e| ToolError::io(dst, e))?;
    encoder
        .finish()
        .and_then(|mut w| w.flush())
        .map_err(|e| ToolError::io(dst, e))?;

    tracing::debug!(src = %src.display(), dst = %dst.display(), "gzipped file");
    Ok(())
}
