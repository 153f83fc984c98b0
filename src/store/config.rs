//! Store configuration
//!
//! Block size, blocks per segment and the segment limit are supplied once,
//! at load time, from a JSON document, a file, or the environment. A store reads them when it
//! is created and again on every reset. There is no ambient global.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event};

use super::errors::{StoreError, StoreResult};

/// Environment variable overriding the block size
pub const BLOCK_SIZE_ENV: &str = "SEGSTORE_BLOCK_SIZE";

/// Environment variable overriding the number of blocks per segment
pub const BLOCKS_PER_SEGMENT_ENV: &str = "SEGSTORE_BLOCKS_PER_SEGMENT";

/// Environment variable overriding the segment limit
pub const MAX_SEGMENTS_ENV: &str = "SEGSTORE_MAX_SEGMENTS";

/// Default block size in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 4000;

/// Default number of block slots per segment
pub const DEFAULT_BLOCKS_PER_SEGMENT: usize = 1000;

/// Default cap on chain length (4 TB of address space at the default
/// geometry)
pub const DEFAULT_MAX_SEGMENTS: usize = 1 << 20;

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Bytes per block (default: 4000)
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Block slots per segment (default: 1000)
    #[serde(default = "default_blocks_per_segment")]
    pub blocks_per_segment: usize,

    /// Longest chain a write may grow (default: 1048576)
    #[serde(default = "default_max_segments")]
    pub max_segments: usize,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_blocks_per_segment() -> usize {
    DEFAULT_BLOCKS_PER_SEGMENT
}

fn default_max_segments() -> usize {
    DEFAULT_MAX_SEGMENTS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            blocks_per_segment: default_blocks_per_segment(),
            max_segments: default_max_segments(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration with explicit geometry and the default
    /// segment limit
    pub fn new(block_size: usize, blocks_per_segment: usize) -> Self {
        Self {
            block_size,
            blocks_per_segment,
            max_segments: DEFAULT_MAX_SEGMENTS,
        }
    }

    /// Replace the segment limit
    pub fn with_max_segments(mut self, max_segments: usize) -> Self {
        self.max_segments = max_segments;
        self
    }

    /// Validate the configuration.
    ///
    /// Every value must be at least 1 and the bytes covered by one segment
    /// must fit in a `u64` offset.
    pub fn validate(&self) -> StoreResult<()> {
        if self.block_size == 0 {
            return Err(StoreError::invalid_config("block_size must be at least 1"));
        }
        if self.blocks_per_segment == 0 {
            return Err(StoreError::invalid_config(
                "blocks_per_segment must be at least 1",
            ));
        }
        if self.max_segments == 0 {
            return Err(StoreError::invalid_config("max_segments must be at least 1"));
        }
        let span = self
            .block_size
            .checked_mul(self.blocks_per_segment)
            .and_then(|span| u64::try_from(span).ok());
        if span.is_none() {
            return Err(StoreError::invalid_config(format!(
                "segment span {} x {} overflows",
                self.block_size, self.blocks_per_segment
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let config: StoreConfig = serde_json::from_str(json).map_err(|e| {
            StoreError::invalid_config_with_source("Failed to parse store config", e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::invalid_config_with_source(
                format!("Failed to read store config: {}", path.display()),
                e,
            )
        })?;
        let config = Self::from_json(&content)?;
        config.log_loaded(&path.display().to_string());
        Ok(config)
    }

    /// Build from `SEGSTORE_BLOCK_SIZE`, `SEGSTORE_BLOCKS_PER_SEGMENT` and
    /// `SEGSTORE_MAX_SEGMENTS`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> StoreResult<Self> {
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_loaded("env");
        Ok(config)
    }

    fn log_loaded(&self, origin: &str) {
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("block_size", self.block_size.to_string().as_str()),
                ("blocks_per_segment", self.blocks_per_segment.to_string().as_str()),
                ("max_segments", self.max_segments.to_string().as_str()),
                ("origin", origin),
            ],
        );
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(BLOCK_SIZE_ENV) {
            config.block_size = parse_param(BLOCK_SIZE_ENV, &value)?;
        }
        if let Some(value) = lookup(BLOCKS_PER_SEGMENT_ENV) {
            config.blocks_per_segment = parse_param(BLOCKS_PER_SEGMENT_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_SEGMENTS_ENV) {
            config.max_segments = parse_param(MAX_SEGMENTS_ENV, &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Bytes covered by one segment
    pub fn segment_span(&self) -> u64 {
        (self.block_size as u64).saturating_mul(self.blocks_per_segment as u64)
    }
}

fn parse_param(key: &str, value: &str) -> StoreResult<usize> {
    value.trim().parse::<usize>().map_err(|e| {
        StoreError::invalid_config_with_source(format!("{} is not a count: {:?}", key, value), e)
    })
}
