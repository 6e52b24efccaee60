//! # Pool Configuration
//!
//! Geometry of a pool: how big each block is, how many there are and how
//! they must be aligned. Can be built in code or loaded from a TOML file
//! once at startup.
//!
//! ```toml
//! block_size = 64
//! capacity = 32
//! align = 8
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};
use crate::sync::FreeList;

/// Block geometry for a pool.
///
/// Validated when the pool is created; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Bytes per block.
    pub block_size: usize,
    /// Number of blocks.
    pub capacity: usize,
    /// Alignment of the arena base and of every block. Defaults to 1.
    #[serde(default = "PoolConfig::default_align")]
    pub align: usize,
}

impl PoolConfig {
    /// Creates a byte-aligned config.
    ///
    /// # Arguments
    ///
    /// * `block_size` - Bytes per block
    /// * `capacity` - Number of blocks
    #[inline]
    #[must_use]
    pub const fn new(block_size: usize, capacity: usize) -> Self {
        Self {
            block_size,
            capacity,
            align: 1,
        }
    }

    /// Creates a config sized and aligned for `capacity` values of `T`.
    #[inline]
    #[must_use]
    pub const fn for_type<T>(capacity: usize) -> Self {
        Self {
            block_size: core::mem::size_of::<T>(),
            capacity,
            align: core::mem::align_of::<T>(),
        }
    }

    /// Returns a copy with a different alignment.
    #[inline]
    #[must_use]
    pub const fn with_align(mut self, align: usize) -> Self {
        self.align = align;
        self
    }

    const fn default_align() -> usize {
        1
    }

    /// Total arena size in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ArenaSizeOverflow`] if the product overflows.
    pub fn arena_len(&self) -> PoolResult<usize> {
        self.block_size
            .checked_mul(self.capacity)
            .ok_or(PoolError::ArenaSizeOverflow)
    }

    /// Checks every geometry rule that does not depend on the storage.
    ///
    /// # Errors
    ///
    /// Returns the first rule that is violated.
    pub fn validate(&self) -> PoolResult<()> {
        if self.block_size == 0 {
            return Err(PoolError::ZeroBlockSize);
        }
        if self.capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        if self.capacity > FreeList::MAX_CAPACITY {
            return Err(PoolError::CapacityTooLarge {
                capacity: self.capacity,
                max: FreeList::MAX_CAPACITY,
            });
        }
        if !self.align.is_power_of_two() {
            return Err(PoolError::InvalidAlignment(self.align));
        }
        if self.block_size % self.align != 0 {
            return Err(PoolError::BlockSizeNotAligned {
                block_size: self.block_size,
                align: self.align,
            });
        }
        self.arena_len().map(|_| ())
    }

    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] on malformed TOML, or the
    /// validation error for well-formed but unusable geometry.
    pub fn from_toml_str(text: &str) -> PoolResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PoolError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> PoolResult<String> {
        toml::to_string(self).map_err(|e| PoolError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_type_matches_layout() {
        let config = PoolConfig::for_type::<u64>(16);
        assert_eq!(config.block_size, 8);
        assert_eq!(config.align, core::mem::align_of::<u64>());
        assert_eq!(config.arena_len(), Ok(128));
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert_eq!(PoolConfig::new(0, 4).validate(), Err(PoolError::ZeroBlockSize));
        assert_eq!(PoolConfig::new(4, 0).validate(), Err(PoolError::ZeroCapacity));
        assert_eq!(
            PoolConfig::new(12, 4).with_align(3).validate(),
            Err(PoolError::InvalidAlignment(3))
        );
        assert_eq!(
            PoolConfig::new(12, 4).with_align(8).validate(),
            Err(PoolError::BlockSizeNotAligned { block_size: 12, align: 8 })
        );
        assert_eq!(
            PoolConfig::new(usize::MAX, 2).validate(),
            Err(PoolError::ArenaSizeOverflow)
        );
        assert!(matches!(
            PoolConfig::new(1, FreeList::MAX_CAPACITY + 1).validate(),
            Err(PoolError::CapacityTooLarge { .. })
        ));
    }

    #[test]
    fn test_from_toml() {
        let config = PoolConfig::from_toml_str("block_size = 64\ncapacity = 32\nalign = 8\n").unwrap();
        assert_eq!(config, PoolConfig::new(64, 32).with_align(8));
    }

    #[test]
    fn test_from_toml_default_align() {
        let config = PoolConfig::from_toml_str("block_size = 3\ncapacity = 5\n").unwrap();
        assert_eq!(config.align, 1);
    }

    #[test]
    fn test_from_toml_rejects_unknown_and_invalid() {
        assert!(matches!(
            PoolConfig::from_toml_str("block_size = 8\ncapacity = 2\ncolour = 1\n"),
            Err(PoolError::InvalidConfig(_))
        ));
        assert!(matches!(
            PoolConfig::from_toml_str("block_size = 8\n"),
            Err(PoolError::InvalidConfig(_))
        ));
        assert_eq!(
            PoolConfig::from_toml_str("block_size = 8\ncapacity = 0\n"),
            Err(PoolError::ZeroCapacity)
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PoolConfig::new(48, 10).with_align(16);
        let text = config.to_toml_string().unwrap();
        assert_eq!(PoolConfig::from_toml_str(&text), Ok(config));
    }
}
