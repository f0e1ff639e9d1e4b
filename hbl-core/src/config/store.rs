//! Binary configuration blob
//!
//! Channel configuration serialized with postcard behind a magic number
//! and version byte, for nodes that keep their calibration in flash or
//! receive it over a provisioning link.

use serde::{Deserialize, Serialize};

use super::types::{ChannelConfig, ConfigError};

/// Magic number to identify a channel configuration blob
pub const CONFIG_MAGIC: u32 = 0x4842_4C43; // "HBLC"

/// Current blob layout version
pub const CONFIG_VERSION: u8 = 1;

/// Upper bound on the encoded size
pub const MAX_CONFIG_BLOB: usize = 128;

/// Blob encode/decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Output buffer too small
    BufferTooSmall,
    /// Bytes are not a postcard-encoded blob
    Deserialize,
    /// Magic number mismatch (blank or foreign data)
    BadMagic,
    /// Blob written by an incompatible layout version
    VersionMismatch,
    /// Blob decoded but the configuration is unusable
    Invalid(ConfigError),
}

#[derive(Serialize, Deserialize)]
struct StoredConfig {
    magic: u32,
    version: u8,
    config: ChannelConfig,
}

/// Encode a configuration into `buffer`
///
/// Returns the used prefix of `buffer`.
pub fn encode<'a>(config: &ChannelConfig, buffer: &'a mut [u8]) -> Result<&'a mut [u8], StoreError> {
    let stored = StoredConfig {
        magic: CONFIG_MAGIC,
        version: CONFIG_VERSION,
        config: *config,
    };
    postcard::to_slice(&stored, buffer).map_err(|_| StoreError::BufferTooSmall)
}

/// Decode and validate a configuration blob
pub fn decode(bytes: &[u8]) -> Result<ChannelConfig, StoreError> {
    let stored: StoredConfig = postcard::from_bytes(bytes).map_err(|_| StoreError::Deserialize)?;

    if stored.magic != CONFIG_MAGIC {
        return Err(StoreError::BadMagic);
    }
    if stored.version != CONFIG_VERSION {
        return Err(StoreError::VersionMismatch);
    }

    stored.config.validate().map_err(StoreError::Invalid)?;
    Ok(stored.config)
}
