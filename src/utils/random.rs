//! # Deterministic Randomness
//!
//! The seeded generator every randomized decision in the crate flows through,
//! plus normalisation of user supplied seeds.

use crate::utils::math::fnv1a_32;
use log::debug;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Mulberry32: a 32-bit state advanced by a fixed increment and mixed with two
/// xorshift/multiply rounds.
///
/// The same seed always yields the same infinite sequence of floats in [0, 1).
///
/// # Examples
///
/// ```
/// use mazeforge::Mulberry32;
///
/// let mut a = Mulberry32::new(7);
/// let mut b = Mulberry32::new(7);
/// assert_eq!(a.next_f64(), b.next_f64());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    const INCREMENT: u32 = 0x6D2B_79F5;

    /// Creates a generator from a signed 32-bit seed.
    pub fn new(seed: i32) -> Self {
        Self { state: seed as u32 }
    }

    /// Creates a generator from an unsigned hash value.
    pub fn from_hash(hash: u32) -> Self {
        Self { state: hash }
    }

    /// Advances the state and returns the next raw 32-bit output.
    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(a | 1);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61)) ^ t;
        t ^ (t >> 14)
    }

    /// Next uniform float in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / 4_294_967_296.0
    }

    /// Uniform integer in [0, n). Returns 0 when `n` is 0.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }

    /// Uniform integer in [lo, hi] inclusive.
    pub fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        lo + self.below(hi - lo + 1)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Fisher-Yates shuffle, walking from the back.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_raw());
        let lo = u64::from(self.next_raw());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(i32::from_le_bytes(seed))
    }
}

/// A seed as supplied by a caller or a config file.
///
/// `None` at the use site (`Option<SeedInput>`) means "pick one for me".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedInput {
    Number(f64),
    Text(String),
}

impl From<i32> for SeedInput {
    fn from(value: i32) -> Self {
        SeedInput::Number(f64::from(value))
    }
}

impl From<i64> for SeedInput {
    fn from(value: i64) -> Self {
        SeedInput::Number(value as f64)
    }
}

impl From<u32> for SeedInput {
    fn from(value: u32) -> Self {
        SeedInput::Number(f64::from(value))
    }
}

impl From<u64> for SeedInput {
    fn from(value: u64) -> Self {
        SeedInput::Number(value as f64)
    }
}

impl From<f64> for SeedInput {
    fn from(value: f64) -> Self {
        SeedInput::Number(value)
    }
}

impl From<&str> for SeedInput {
    fn from(value: &str) -> Self {
        SeedInput::Text(value.to_string())
    }
}

impl From<String> for SeedInput {
    fn from(value: String) -> Self {
        SeedInput::Text(value)
    }
}

/// Where a normalised seed came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedSource {
    #[default]
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string:number")]
    StringNumber,
    #[serde(rename = "string:hash")]
    StringHash,
}

impl SeedSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SeedSource::Random => "random",
            SeedSource::Number => "number",
            SeedSource::StringNumber => "string:number",
            SeedSource::StringHash => "string:hash",
        }
    }
}

/// A normalised 32-bit seed and its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed {
    pub value: i32,
    pub source: SeedSource,
}

impl Seed {
    /// Normalises an optional seed input.
    ///
    /// - absent, blank or non-finite: random seed
    /// - number: truncated and wrapped to i32
    /// - numeric string: parsed then treated as a number
    /// - any other string: FNV-1a hash
    ///
    /// # Examples
    ///
    /// ```
    /// use mazeforge::{Seed, SeedInput, SeedSource};
    ///
    /// let seed = Seed::normalize(Some(&SeedInput::from("1234")));
    /// assert_eq!(seed.value, 1234);
    /// assert_eq!(seed.source, SeedSource::StringNumber);
    /// ```
    pub fn normalize(input: Option<&SeedInput>) -> Seed {
        match input {
            Some(SeedInput::Number(value)) if value.is_finite() => Seed {
                value: to_int32(*value),
                source: SeedSource::Number,
            },
            Some(SeedInput::Text(text)) if !text.trim().is_empty() => {
                let trimmed = text.trim();
                match trimmed.parse::<f64>() {
                    Ok(value) if value.is_finite() => Seed {
                        value: to_int32(value),
                        source: SeedSource::StringNumber,
                    },
                    _ => Seed {
                        value: fnv1a_32(trimmed) as i32,
                        source: SeedSource::StringHash,
                    },
                }
            }
            _ => Seed::random(),
        }
    }

    /// Builds a seed directly from an integer.
    pub fn from_number(value: i32) -> Seed {
        Seed {
            value,
            source: SeedSource::Number,
        }
    }

    /// Draws a fresh seed from the thread-local entropy source.
    pub fn random() -> Seed {
        let value = rand::random::<i32>();
        debug!("No usable seed supplied, drew random seed {}", value);
        Seed {
            value,
            source: SeedSource::Random,
        }
    }

    /// Creates the generator for this seed.
    pub fn rng(&self) -> Mulberry32 {
        Mulberry32::new(self.value)
    }
}

/// Truncates toward zero and wraps modulo 2^32 into the i32 range.
fn to_int32(value: f64) -> i32 {
    let wrapped = value.trunc().rem_euclid(4_294_967_296.0);
    (wrapped as u64 as u32) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_known_sequence() {
        let mut rng = Mulberry32::new(42);
        assert_eq!(rng.next_raw(), 2_581_720_956);
        assert_eq!(rng.next_raw(), 1_925_393_290);
        assert_eq!(rng.next_raw(), 3_661_312_704);

        let mut rng = Mulberry32::new(0);
        assert_eq!(rng.next_raw(), 1_144_304_738);
    }

    #[test]
    fn test_floats_in_unit_interval() {
        let mut rng = Mulberry32::new(-99);
        for _ in 0..10_000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_below_and_range() {
        let mut rng = Mulberry32::new(5);
        for _ in 0..1000 {
            assert!(rng.below(7) < 7);
            let value = rng.range_inclusive(3, 5);
            assert!((3..=5).contains(&value));
        }
        assert_eq!(rng.below(0), 0);
        assert_eq!(rng.range_inclusive(4, 4), 4);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Mulberry32::new(11);
        let mut items = [0, 1, 2, 3, 4, 5, 6, 7];
        rng.shuffle(&mut items);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_rand_interop() {
        let mut rng = Mulberry32::from_seed(7i32.to_le_bytes());
        let value: u32 = rng.gen_range(0..10);
        assert!(value < 10);
        let mut bytes = [0u8; 7];
        rng.fill_bytes(&mut bytes);
    }

    #[test]
    fn test_seed_normalization() {
        let seed = Seed::normalize(Some(&SeedInput::from(42)));
        assert_eq!(seed, Seed { value: 42, source: SeedSource::Number });

        let seed = Seed::normalize(Some(&SeedInput::from(3.9)));
        assert_eq!(seed.value, 3);

        let seed = Seed::normalize(Some(&SeedInput::from(4_294_967_297.0)));
        assert_eq!(seed.value, 1);

        let seed = Seed::normalize(Some(&SeedInput::from(-1.5)));
        assert_eq!(seed.value, -1);

        let seed = Seed::normalize(Some(&SeedInput::from(" 77 ")));
        assert_eq!(seed, Seed { value: 77, source: SeedSource::StringNumber });

        let seed = Seed::normalize(Some(&SeedInput::from("hello")));
        assert_eq!(seed, Seed { value: 1_335_831_723, source: SeedSource::StringHash });

        assert_eq!(Seed::normalize(None).source, SeedSource::Random);
        assert_eq!(Seed::normalize(Some(&SeedInput::from(""))).source, SeedSource::Random);
        assert_eq!(
            Seed::normalize(Some(&SeedInput::Number(f64::NAN))).source,
            SeedSource::Random
        );
    }

    #[test]
    fn test_seed_input_deserializes_untagged() {
        let number: SeedInput = serde_json::from_str("12").unwrap();
        assert_eq!(number, SeedInput::Number(12.0));
        let text: SeedInput = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(text, SeedInput::Text("abc".to_string()));
        let source = serde_json::to_string(&SeedSource::StringHash).unwrap();
        assert_eq!(source, "\"string:hash\"");
    }
}
