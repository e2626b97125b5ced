//! Walk configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Default number of entries buffered between the walk worker and its consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64 * 1024;

/// Largest accepted entry channel capacity.
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 24;

/// Largest accepted event channel capacity. The event buffer is allocated
/// up front, so this stays small.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Configuration for a directory walk.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WalkConfig {
    /// Directory the walk starts from. Not validated: an unreadable root
    /// simply yields no entries.
    pub root: PathBuf,

    /// Maximum number of entries buffered before the worker waits.
    #[builder(default = "DEFAULT_CHANNEL_CAPACITY")]
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Visit the children of each directory in file name order.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub sort_entries: bool,

    /// Capacity of the walk event broadcast channel. Subscribers that fall
    /// further behind lose the oldest events.
    #[builder(default = "64")]
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_event_capacity() -> usize {
    64
}

impl WalkConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(capacity) = self.channel_capacity {
            check_capacity("Channel", capacity, MAX_CHANNEL_CAPACITY)?;
        }
        if let Some(capacity) = self.event_capacity {
            check_capacity("Event", capacity, MAX_EVENT_CAPACITY)?;
        }
        Ok(())
    }
}

fn check_capacity(what: &str, capacity: usize, max: usize) -> Result<(), String> {
    if capacity == 0 {
        return Err(format!("{what} capacity must be greater than zero"));
    }
    if capacity > max {
        return Err(format!("{what} capacity {capacity} exceeds the maximum of {max}"));
    }
    Ok(())
}

impl WalkConfig {
    /// Create a new walk config builder.
    pub fn builder() -> WalkConfigBuilder {
        WalkConfigBuilder::default()
    }

    /// Create a config with defaults for walking a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            sort_entries: true,
            event_capacity: default_event_capacity(),
        }
    }
}

impl WalkConfig {
    /// Check the capacities of a config that did not come from the builder,
    /// such as one deserialized from a file.
    pub fn validate(&self) -> Result<(), ToolError> {
        check_capacity("Channel", self.channel_capacity, MAX_CHANNEL_CAPACITY)
            .and_then(|()| check_capacity("Event", self.event_capacity, MAX_EVENT_CAPACITY))
            .map_err(|message| ToolError::InvalidConfig { message })
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
