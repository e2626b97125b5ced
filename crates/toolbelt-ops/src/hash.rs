//! File and byte hashing.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha1::{Digest, Sha1};

use crate::{Result, ToolError};

/// Supported content hash algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-1, 20 bytes.
    #[default]
    Sha1,
    /// BLAKE3, 32 bytes.
    Blake3,
}

impl HashAlgorithm {
    /// Length of the hex digest in characters.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Blake3 => 64,
        }
    }
}

/// SHA-1 of a byte slice.
pub fn sha1_of_bytes(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Sha1::digest(data));
    out
}

/// Hex SHA-1 of a byte slice.
pub fn sha1_hex_of_bytes(data: &[u8]) -> String {
    hex::encode(sha1_of_bytes(data))
}

/// SHA-1 of a file's content.
pub fn sha1_of_file(path: impl AsRef<Path>) -> Result<[u8; 20]> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let mut hasher = Sha1::new();
    io::copy(&mut reader, &mut hasher).map_err(|e| ToolError::io(path, e))?;
    let mut out = [0u8; 20];
    out.copy_from_slice(&hasher.finalize());
    Ok(out)
}

/// 40 character hex SHA-1 of a file's content.
pub fn sha1_hex_of_file(path: impl AsRef<Path>) -> Result<String> {
    sha1_of_file(path).map(hex::encode)
}

/// Hex digest of a file's content with the given algorithm.
pub fn hash_file_hex(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> Result<String> {
    let path = path.as_ref();
    match algorithm {
        HashAlgorithm::Sha1 => sha1_hex_of_file(path),
        HashAlgorithm::Blake3 => {
            let mut reader = open(path)?;
            let mut hasher = blake3::Hasher::new();
            io::copy(&mut reader, &mut hasher).map_err(|e| ToolError::io(path, e))?;
            Ok(hasher.finalize().to_hex().to_string())
        }
    }
}

/// Hash many files in parallel. Results keep the order of `paths`.
pub fn hash_files(
    paths: &[PathBuf],
    algorithm: HashAlgorithm,
) -> Vec<(PathBuf, Result<String>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), hash_file_hex(path, algorithm)))
        .collect()
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ToolError::io(path, e))
}
