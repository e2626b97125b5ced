//! Core types and helpers for toolbelt.
//!
//! This crate provides the data structures shared by the walker and the
//! file operation helpers: walk entries and file metadata, walk
//! configuration, the common error type, plus small text utilities
//! (duration formatting, string deduplication, mime lookup).

mod config;
mod duration;
mod entry;
mod error;
mod mime;
mod strings;

pub use config::{
    DEFAULT_CHANNEL_CAPACITY, MAX_CHANNEL_CAPACITY, MAX_EVENT_CAPACITY, WalkConfig,
    WalkConfigBuilder,
};
pub use duration::{FormattedDuration, duration_to_string, format_duration, time_since_as_string};
pub use entry::{EntryKind, FileInfo, WalkEntry};
pub use error::ToolError;
pub use mime::{DEFAULT_MIME_TYPE, mime_type_from_file_name};
pub use strings::{remove_duplicate_strings, remove_first};
