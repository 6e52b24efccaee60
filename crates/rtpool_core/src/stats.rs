//! # Pool Statistics
//!
//! Point-in-time counters for sizing pools during development.

use std::fmt;

/// Snapshot of a pool's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Bytes per block.
    pub block_size: usize,
    /// Total blocks.
    pub capacity: usize,
    /// Blocks currently allocated.
    pub used: usize,
    /// Blocks currently free.
    pub free: usize,
    /// Most blocks ever allocated at once.
    pub peak: usize,
    /// Allocation requests that found no free block.
    pub exhausted: usize,
    /// Release calls that were rejected.
    pub rejected: usize,
}

impl PoolStats {
    /// Current utilization as a percentage (0.0 to 100.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.used as f64 * 100.0 / self.capacity as f64
    }

    /// Peak utilization as a percentage (0.0 to 100.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn peak_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.peak as f64 * 100.0 / self.capacity as f64
    }

    /// Returns whether the pool has ever been completely drained.
    #[inline]
    #[must_use]
    pub const fn has_hit_capacity(&self) -> bool {
        self.capacity != 0 && self.peak >= self.capacity
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} blocks of {} bytes in use (peak {}, exhausted {}, rejected {})",
            self.used, self.capacity, self.block_size, self.peak, self.exhausted, self.rejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization() {
        let stats = PoolStats {
            block_size: 8,
            capacity: 4,
            used: 1,
            free: 3,
            peak: 4,
            exhausted: 2,
            rejected: 0,
        };
        assert!((stats.utilization_percent() - 25.0).abs() < f64::EPSILON);
        assert!((stats.peak_percent() - 100.0).abs() < f64::EPSILON);
        assert!(stats.has_hit_capacity());
    }

    #[test]
    fn test_default_is_empty() {
        let stats = PoolStats::default();
        assert!(stats.utilization_percent().abs() < f64::EPSILON);
        assert!(!stats.has_hit_capacity());
    }

    #[test]
    fn test_display() {
        let stats = PoolStats {
            block_size: 16,
            capacity: 8,
            used: 3,
            free: 5,
            peak: 6,
            exhausted: 1,
            rejected: 0,
        };
        assert_eq!(
            stats.to_string(),
            "3/8 blocks of 16 bytes in use (peak 6, exhausted 1, rejected 0)"
        );
    }
}
