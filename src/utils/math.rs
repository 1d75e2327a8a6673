//! # Generation Mathematics
//!
//! Hashing, low-discrepancy sequences and dimension helpers.

use crate::config::MIN_DIMENSION;

/// 32-bit FNV-1a over the UTF-8 bytes of a string.
pub fn fnv1a_32(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Murmur3 32-bit finaliser.
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Order-sensitive hash of a list of integers.
///
/// Used to derive per-chunk and per-edge generators from the world seed so
/// that any caller hashing the same tuple gets the same stream.
pub fn hash_ints(values: &[i32]) -> u32 {
    let hash = values.iter().fold(0x811c_9dc5u32, |hash, &value| {
        fmix32((hash ^ value as u32).wrapping_mul(0x9e37_79b1))
    });
    fmix32(hash ^ values.len() as u32)
}

/// Golden-ratio conjugate, the x increment of [`LowDiscrepancy`].
pub const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_894_9;

/// Inverse plastic number, the y increment of [`LowDiscrepancy`].
pub const PLASTIC_CONJUGATE: f64 = 0.754_877_666_246_692_7;

/// Additive-recurrence point sequence in the unit square.
///
/// Successive points fill the square far more evenly than independent
/// uniform samples, which keeps stamped rooms from clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowDiscrepancy {
    phase_x: f64,
    phase_y: f64,
}

impl LowDiscrepancy {
    pub fn new(phase_x: f64, phase_y: f64) -> Self {
        Self { phase_x, phase_y }
    }

    /// The `index`-th point, both coordinates in [0, 1).
    pub fn point(&self, index: u32) -> (f64, f64) {
        let i = f64::from(index);
        (
            (self.phase_x + i * GOLDEN_RATIO_CONJUGATE).fract(),
            (self.phase_y + i * PLASTIC_CONJUGATE).fract(),
        )
    }
}

/// Clamps a requested grid side to an odd value of at least `MIN_DIMENSION`.
///
/// # Examples
///
/// ```
/// use mazeforge::normalize_dimension;
///
/// assert_eq!(normalize_dimension(2), 5);
/// assert_eq!(normalize_dimension(10), 11);
/// assert_eq!(normalize_dimension(21), 21);
/// ```
pub fn normalize_dimension(requested: usize) -> usize {
    let side = requested.max(MIN_DIMENSION);
    if side % 2 == 0 {
        side + 1
    } else {
        side
    }
}

/// Maps a unit value onto `count` slots, never returning `count` itself.
pub fn scale_unit(unit: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    ((unit * count as f64) as usize).min(count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
        assert_eq!(fnv1a_32("hello"), 1_335_831_723);
    }

    #[test]
    fn test_hash_ints_is_order_sensitive() {
        assert_eq!(hash_ints(&[1, 2, 3]), hash_ints(&[1, 2, 3]));
        assert_ne!(hash_ints(&[1, 0]), hash_ints(&[0, 1]));
        assert_ne!(hash_ints(&[7, 0, 0, 1]), hash_ints(&[7, 0, 0, 2]));
        assert_ne!(hash_ints(&[0]), hash_ints(&[0, 0]));
    }

    #[test]
    fn test_low_discrepancy_stays_in_unit_square() {
        let sequence = LowDiscrepancy::new(0.3, 0.9);
        for i in 0..500 {
            let (u, v) = sequence.point(i);
            assert!((0.0..1.0).contains(&u));
            assert!((0.0..1.0).contains(&v));
        }
        assert_eq!(sequence.point(0), (0.3, 0.9));
    }

    #[test]
    fn test_low_discrepancy_spreads_points() {
        // Ten points split across ten buckets should hit most of them
        let sequence = LowDiscrepancy::new(0.0, 0.0);
        let mut buckets = [false; 10];
        for i in 0..10 {
            buckets[scale_unit(sequence.point(i).0, 10)] = true;
        }
        assert!(buckets.iter().filter(|&&hit| hit).count() >= 9);
    }

    #[test]
    fn test_normalize_dimension() {
        assert_eq!(normalize_dimension(0), 5);
        assert_eq!(normalize_dimension(5), 5);
        assert_eq!(normalize_dimension(6), 7);
        assert_eq!(normalize_dimension(100), 101);
    }

    #[test]
    fn test_scale_unit() {
        assert_eq!(scale_unit(0.0, 4), 0);
        assert_eq!(scale_unit(0.999_999, 4), 3);
        assert_eq!(scale_unit(0.5, 0), 0);
    }
}
