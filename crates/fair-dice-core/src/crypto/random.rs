//! Secure random source: commitment keys and unbiased uniform integers.

use super::CommitmentKey;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

/// Largest number of bytes drawn per sample (enough to cover any `u64` range)
const MAX_SAMPLE_BYTES: usize = 8;

/// Errors from the secure random source
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RandomError {
    #[error("Invalid range: must be a positive integer")]
    InvalidRange,

    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),
}

/// Rejection sampling parameters for drawing uniformly from `[0, n)`.
///
/// `byte_len` is the smallest `L >= 1` with `256^L >= n`. Draws at or above
/// `threshold` are discarded, so every accepted value maps onto `[0, n)` the
/// same number of times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingPlan {
    pub range: u64,
    pub byte_len: usize,
    pub threshold: u128,
}

impl SamplingPlan {
    /// Compute the plan for range `n`
    pub fn for_range(n: u64) -> Result<Self, RandomError> {
        if n == 0 {
            return Err(RandomError::InvalidRange);
        }

        let range = u128::from(n);
        let mut byte_len = 1;
        while byte_len < MAX_SAMPLE_BYTES && (1u128 << (8 * byte_len)) < range {
            byte_len += 1;
        }

        let space = 1u128 << (8 * byte_len);
        Ok(Self {
            range: n,
            byte_len,
            threshold: (space / range) * range,
        })
    }

    /// Map a big-endian draw into the range, or `None` if it must be rejected
    pub fn accept(&self, bytes: &[u8]) -> Option<u64> {
        let value = bytes
            .iter()
            .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte));
        if value >= self.threshold {
            return None;
        }
        // value % range < range <= u64::MAX
        Some((value % u128::from(self.range)) as u64)
    }
}

/// Source of cryptographically secure randomness.
///
/// Everything feeding a commitment or a fair-value result must come from an
/// implementation of this trait. Casual randomness (tie-breaking, picking
/// among equivalent options) belongs to a separate non-cryptographic RNG.
pub trait SecureRandomSource {
    /// Fill `dest` with secure random bytes
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<(), RandomError>;

    /// Generate a fresh 256-bit commitment key
    fn generate_key(&mut self) -> Result<CommitmentKey, RandomError> {
        let mut bytes = [0u8; 32];
        self.try_fill(&mut bytes)?;
        Ok(CommitmentKey::from_bytes(bytes))
    }

    /// Draw a uniform integer in `[0, n)` without modulo bias
    fn generate_uniform(&mut self, n: u64) -> Result<u64, RandomError> {
        let plan = SamplingPlan::for_range(n)?;
        if n == 1 {
            return Ok(0);
        }

        let mut buf = [0u8; MAX_SAMPLE_BYTES];
        loop {
            let draw = &mut buf[..plan.byte_len];
            self.try_fill(draw)?;
            if let Some(value) = plan.accept(draw) {
                return Ok(value);
            }
        }
    }
}

/// Secure source backed by any cryptographic RNG
pub struct CryptoRngSource<R>(R);

impl<R: RngCore + CryptoRng> CryptoRngSource<R> {
    /// Wrap a cryptographic RNG
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

/// Secure source reading the operating system CSPRNG
pub type OsRandomSource = CryptoRngSource<OsRng>;

impl Default for CryptoRngSource<OsRng> {
    fn default() -> Self {
        Self::new(OsRng)
    }
}

impl<R: RngCore + CryptoRng> SecureRandomSource for CryptoRngSource<R> {
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<(), RandomError> {
        self.0
            .try_fill_bytes(dest)
            .map_err(|e| RandomError::EntropyUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    /// Replays a fixed byte stream, then reports exhausted entropy
    struct ScriptedSource {
        bytes: VecDeque<u8>,
        draws: usize,
    }

    impl ScriptedSource {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.iter().copied().collect(),
                draws: 0,
            }
        }
    }

    impl SecureRandomSource for ScriptedSource {
        fn try_fill(&mut self, dest: &mut [u8]) -> Result<(), RandomError> {
            self.draws += 1;
            for slot in dest.iter_mut() {
                *slot = self
                    .bytes
                    .pop_front()
                    .ok_or_else(|| RandomError::EntropyUnavailable("script exhausted".into()))?;
            }
            Ok(())
        }
    }

    /// Chi-square critical value (Wilson-Hilferty) for `df` degrees of
    /// freedom at roughly five standard deviations.
    fn chi_square_critical(df: f64) -> f64 {
        let z = 5.0;
        let k = 2.0 / (9.0 * df);
        df * (1.0 - k + z * k.sqrt()).powi(3)
    }

    fn assert_uniform(n: u64, samples_per_value: usize) {
        let mut source = OsRandomSource::default();
        let mut counts = vec![0usize; n as usize];
        let total = samples_per_value * n as usize;

        for _ in 0..total {
            let value = source.generate_uniform(n).unwrap();
            assert!(value < n);
            counts[value as usize] += 1;
        }

        assert!(
            counts.iter().all(|&c| c > 0),
            "value unreachable for n = {}",
            n
        );

        let expected = samples_per_value as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        let critical = chi_square_critical((n - 1) as f64);
        assert!(
            chi_square < critical,
            "n = {}: chi-square {} exceeds {}",
            n,
            chi_square,
            critical
        );
    }

    #[test]
    fn test_sampling_plan_byte_lengths() {
        assert_eq!(SamplingPlan::for_range(1).unwrap().byte_len, 1);
        assert_eq!(SamplingPlan::for_range(2).unwrap().byte_len, 1);
        assert_eq!(SamplingPlan::for_range(255).unwrap().byte_len, 1);
        assert_eq!(SamplingPlan::for_range(256).unwrap().byte_len, 1);
        assert_eq!(SamplingPlan::for_range(257).unwrap().byte_len, 2);
        assert_eq!(SamplingPlan::for_range(65_536).unwrap().byte_len, 2);
        assert_eq!(SamplingPlan::for_range(65_537).unwrap().byte_len, 3);
        assert_eq!(SamplingPlan::for_range(u64::MAX).unwrap().byte_len, 8);
    }

    #[test]
    fn test_sampling_plan_thresholds() {
        assert_eq!(SamplingPlan::for_range(6).unwrap().threshold, 252);
        assert_eq!(SamplingPlan::for_range(200).unwrap().threshold, 200);
        assert_eq!(SamplingPlan::for_range(256).unwrap().threshold, 256);
        assert_eq!(SamplingPlan::for_range(257).unwrap().threshold, 65_535);
    }

    #[test]
    fn test_zero_range_rejected() {
        assert_eq!(SamplingPlan::for_range(0), Err(RandomError::InvalidRange));
        let mut source = ScriptedSource::new(&[1, 2, 3]);
        assert_eq!(source.generate_uniform(0), Err(RandomError::InvalidRange));
        assert_eq!(source.draws, 0);
    }

    #[test]
    fn test_range_one_does_not_sample() {
        let mut source = ScriptedSource::new(&[]);
        assert_eq!(source.generate_uniform(1), Ok(0));
        assert_eq!(source.draws, 0);
    }

    #[test]
    fn test_rejects_draws_above_threshold() {
        // n = 200: one byte, threshold 200, so 250 and 201 are redrawn
        let mut source = ScriptedSource::new(&[250, 201, 7]);
        assert_eq!(source.generate_uniform(200), Ok(7));
        assert_eq!(source.draws, 3);
    }

    #[test]
    fn test_accepted_draw_reduced_modulo_range() {
        // n = 6: threshold 252, 251 is accepted and maps to 251 % 6 = 5
        let mut source = ScriptedSource::new(&[252, 255, 251]);
        assert_eq!(source.generate_uniform(6), Ok(5));
        assert_eq!(source.draws, 3);
    }

    #[test]
    fn test_multi_byte_draw_is_big_endian() {
        // n = 257: two bytes, 0x0102 = 258, 258 % 257 = 1
        let mut source = ScriptedSource::new(&[0x01, 0x02]);
        assert_eq!(source.generate_uniform(257), Ok(1));
    }

    #[test]
    fn test_exhausted_source_reports_entropy_unavailable() {
        let mut source = ScriptedSource::new(&[255]);
        assert!(matches!(
            source.generate_uniform(200),
            Err(RandomError::EntropyUnavailable(_))
        ));
        assert!(matches!(
            source.generate_key(),
            Err(RandomError::EntropyUnavailable(_))
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        let mut source = OsRandomSource::default();
        let key1 = source.generate_key().unwrap();
        let key2 = source.generate_key().unwrap();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = CryptoRngSource::new(StdRng::seed_from_u64(11));
        let mut b = CryptoRngSource::new(StdRng::seed_from_u64(11));

        assert_eq!(a.generate_key().unwrap(), b.generate_key().unwrap());
        for _ in 0..20 {
            let value = a.generate_uniform(257).unwrap();
            assert!(value < 257);
            assert_eq!(value, b.generate_uniform(257).unwrap());
        }
    }

    #[test]
    fn test_uniform_five() {
        assert_uniform(5, 2_000);
    }

    #[test]
    fn test_uniform_six() {
        assert_uniform(6, 2_000);
    }

    #[test]
    fn test_uniform_two_hundred() {
        assert_uniform(200, 300);
    }

    #[test]
    fn test_uniform_two_hundred_fifty_seven() {
        assert_uniform(257, 300);
    }
}
