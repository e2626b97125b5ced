//! File, archive, hashing and process helpers for toolbelt.
//!
//! Every helper is a thin, stateless wrapper over the standard library or a
//! codec crate, returning [`ToolError`] with path context on failure.

pub mod archive;
pub mod cmd;
pub mod compress;
pub mod file;
pub mod hash;
pub mod request;
mod semaphore;

pub use archive::{create_zip_file, create_zip_with_dir_content, read_zip_file};
pub use cmd::{fmt_cmd_short, run_cmd, run_cmd_logged};
pub use compress::{
    CompressionKind, gzip_file, open_maybe_compressed, read_maybe_compressed, write_gzipped,
};
pub use hash::{HashAlgorithm, hash_file_hex, hash_files, sha1_hex_of_file};
pub use semaphore::{Semaphore, SemaphoreGuard};

pub use toolbelt_core::ToolError;

/// Result type used throughout the ops helpers.
pub type Result<T> = std::result::Result<T, ToolError>;
