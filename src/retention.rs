//! Disk-space retention estimate
//!
//! Advisory only: tells the overlay how many more pieces can be exported
//! before the configured free-space reserve would be consumed. Recomputed
//! between runs from a fresh folder scan, never incrementally.

use crate::consts::DEFAULT_AVG_IMAGE_BYTES;

/// Snapshot of the output folder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetentionStats {
    pub image_count: usize,
    pub avg_bytes_per_image: f64,
}

impl RetentionStats {
    /// Compute from the sizes of the images currently on disk. An empty
    /// folder assumes a 2 MiB average rather than dividing by zero.
    pub fn from_sizes(sizes: &[u64]) -> Self {
        let image_count = sizes.len();
        let avg_bytes_per_image = if sizes.is_empty() {
            DEFAULT_AVG_IMAGE_BYTES as f64
        } else {
            sizes.iter().sum::<u64>() as f64 / image_count as f64
        };
        Self {
            image_count,
            avg_bytes_per_image,
        }
    }
}

impl Default for RetentionStats {
    fn default() -> Self {
        Self::from_sizes(&[])
    }
}

/// Images storable before eating into the reserve: `(free - reserve) / avg`,
/// clamped to zero when the average is zero or no usable space remains.
pub fn estimate_remaining(free_bytes: u64, reserve_bytes: u64, avg_bytes_per_image: f64) -> u64 {
    if avg_bytes_per_image <= 0.0 || free_bytes <= reserve_bytes {
        return 0;
    }
    let usable = (free_bytes - reserve_bytes) as f64;
    (usable / avg_bytes_per_image) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;
    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_estimate_basic() {
        // (5 GiB - 1 GiB) / 2 MiB = 2048
        assert_eq!(estimate_remaining(5 * GIB, GIB, (2 * MIB) as f64), 2048);
    }

    #[test]
    fn test_estimate_zero_when_free_at_or_below_reserve() {
        assert_eq!(estimate_remaining(GIB, GIB, (2 * MIB) as f64), 0);
        assert_eq!(estimate_remaining(GIB / 2, GIB, 1.0), 0);
    }

    #[test]
    fn test_estimate_zero_average() {
        assert_eq!(estimate_remaining(5 * GIB, GIB, 0.0), 0);
    }

    #[test]
    fn test_stats_from_sizes() {
        let stats = RetentionStats::from_sizes(&[MIB, 3 * MIB]);
        assert_eq!(stats.image_count, 2);
        assert_eq!(stats.avg_bytes_per_image, (2 * MIB) as f64);
    }

    #[test]
    fn test_stats_empty_folder_default() {
        let stats = RetentionStats::from_sizes(&[]);
        assert_eq!(stats.image_count, 0);
        assert_eq!(stats.avg_bytes_per_image, (2 * MIB) as f64);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The estimate never exceeds usable space divided by the average
            #[test]
            fn prop_estimate_bounded(
                free in 0u64..(1u64 << 50),
                reserve in 0u64..(1u64 << 50),
                avg in 1u64..(16 * MIB),
            ) {
                let est = estimate_remaining(free, reserve, avg as f64);
                if free > reserve {
                    prop_assert!(est <= (free - reserve) / avg + 1);
                } else {
                    prop_assert_eq!(est, 0);
                }
            }
        }
    }
}
