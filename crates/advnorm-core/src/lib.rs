//! Advantage normalization engine for reinforcement-learning post-training.
//!
//! This crate rescales per-token advantage estimates (the credit-assignment
//! signal behind a policy-gradient update) before the loss consumes them.
//! It is a pure, stateless transform: one call takes a batch, a validity
//! mask, and a config, rewrites the batch in place, and returns a fresh
//! statistics report.
//!
//! # Pipeline
//!
//! 1. **Config resolution** ([`config`]): four settings with defaults;
//!    an absent config section means "off".
//! 2. **Normalization**: dispatch on [`NormLevel`] to the batch-level or
//!    group-level pass. Only positions on the *effective mask* (valid under
//!    the token mask AND carrying a nonzero advantage) participate; all
//!    other positions are left bit-for-bit unchanged.
//! 3. **Sign diagnostics** ([`report`]): token- and sequence-granularity
//!    sign counts over the final batch, regardless of which pass ran.
//!
//! # Degenerate cases
//!
//! Degenerate statistics are never errors:
//!
//! - An empty effective set reports `median = 0.0`, `std = 1.0` and rescales
//!   nothing.
//! - A zero-variance group under [`NormType::WithStd`] is skipped untouched
//!   and counted in `zero_groups`.
//! - A degenerate global std under [`NormType::BatchStd`] degrades that
//!   pass to centering only.
//!
//! The only fatal conditions are caller contract violations (shape
//! mismatch) and unknown config strings at the parse boundary
//! ([`ConfigError`]).
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use advnorm_core::{AdvantageMatrix, NormConfig, TokenMask, normalize_advantages};
//!
//! let mut advantages = AdvantageMatrix::from_rows(vec![
//!     vec![1.0, 2.0, 0.0],
//!     vec![3.0, 4.0, 100.0],
//! ]);
//! let mask = TokenMask::from_rows(vec![
//!     vec![true, true, false],
//!     vec![true, true, true],
//! ]);
//!
//! let config = NormConfig::default(); // batch-level, with_std
//! let rollout_n = NonZeroUsize::new(8).unwrap();
//! let report = normalize_advantages(&mut advantages, &mask, &config, rollout_n).unwrap();
//!
//! assert_eq!(report.summary.tokens_normed, 5);
//! assert_eq!(advantages.get(0, 2), 0.0); // padding untouched
//! ```

use std::num::NonZeroUsize;

mod batch_level;
pub mod config;
mod group_level;
pub mod matrix;
pub mod report;

pub use self::{
    config::{ConfigError, NormConfig, NormLevel, NormType},
    matrix::{AdvantageMatrix, TokenMask},
    report::{LevelSummary, NormReport, SignStats},
};

/// Smallest usable standard deviation; scales at or below this floor are
/// treated as degenerate.
pub const MIN_STD: f32 = 1e-8;

/// Normalizes a batch of per-token advantages in place.
///
/// Dispatches on `config.level`, then tallies sign diagnostics over the
/// final batch. In group mode the group size is `config.group_size`, falling
/// back to `default_group_size` (typically the number of rollouts sampled
/// per prompt — grouping is positional, so the caller must order rows so
/// that rollouts of the same prompt are adjacent).
///
/// Returns `None` without touching the batch when `config.enable` is false;
/// otherwise returns the statistics record for this call.
///
/// The engine holds no cross-call state. Calls on independent batches may
/// run concurrently; the same batch must not be shared between concurrent
/// calls since it is mutated in place.
///
/// # Panics
///
/// Panics if `advantages` and `mask` have different shapes (caller contract
/// violation, not a recoverable condition).
pub fn normalize_advantages(
    advantages: &mut AdvantageMatrix,
    mask: &TokenMask,
    config: &NormConfig,
    default_group_size: NonZeroUsize,
) -> Option<NormReport> {
    if !config.enable {
        return None;
    }
    assert_eq!(
        advantages.shape(),
        mask.shape(),
        "advantages and mask must have identical shapes"
    );

    let summary = match config.level {
        NormLevel::Batch => batch_level::normalize(advantages, mask, config.normalization_type),
        NormLevel::Group => {
            let group_size = config.group_size.unwrap_or(default_group_size);
            group_level::normalize(advantages, mask, group_size, config.normalization_type)
        }
    };
    let signs = SignStats::collect(advantages, mask);

    Some(NormReport {
        level: config.level,
        normalization_type: config.normalization_type,
        summary,
        signs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rollout_n(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn sample_batch() -> (AdvantageMatrix, TokenMask) {
        let adv = AdvantageMatrix::from_rows(vec![
            vec![1.0, 2.0, 0.0],
            vec![3.0, 4.0, 100.0],
            vec![-1.0, 0.0, 2.5],
        ]);
        let mask = TokenMask::from_rows(vec![
            vec![true, true, false],
            vec![true, true, true],
            vec![true, true, true],
        ]);
        (adv, mask)
    }

    #[test]
    fn test_disabled_config_is_a_no_op() {
        let (mut adv, mask) = sample_batch();
        let before = adv.clone();
        let config = NormConfig {
            enable: false,
            level: NormLevel::Group,
            normalization_type: NormType::NoStd,
            ..NormConfig::default()
        };
        let report = normalize_advantages(&mut adv, &mask, &config, rollout_n(8));
        assert!(report.is_none());
        assert_eq!(adv, before);
    }

    #[test]
    fn test_shape_is_always_preserved() {
        let (mut adv, mask) = sample_batch();
        let shape = adv.shape();
        for level in [NormLevel::Batch, NormLevel::Group] {
            for normalization_type in [NormType::WithStd, NormType::NoStd, NormType::BatchStd] {
                let config = NormConfig {
                    level,
                    normalization_type,
                    ..NormConfig::default()
                };
                normalize_advantages(&mut adv, &mask, &config, rollout_n(2));
                assert_eq!(adv.shape(), shape);
            }
        }
    }

    #[test]
    fn test_pass_through_for_masked_and_zero_positions() {
        let (mut adv, mask) = sample_batch();
        let config = NormConfig::default();
        normalize_advantages(&mut adv, &mask, &config, rollout_n(8)).unwrap();
        // Masked padding and exact-zero advantages are untouched.
        assert_eq!(adv.get(0, 2), 0.0);
        assert_eq!(adv.get(2, 1), 0.0);
    }

    #[test]
    #[should_panic(expected = "identical shapes")]
    fn test_shape_mismatch_panics() {
        let mut adv = AdvantageMatrix::from_rows(vec![vec![1.0, 2.0]]);
        let mask = TokenMask::from_rows(vec![vec![true]]);
        let _ = normalize_advantages(&mut adv, &mask, &NormConfig::default(), rollout_n(1));
    }

    #[test]
    fn test_config_group_size_overrides_default() {
        // group_size 1 in config: every row is its own group, so a config
        // override must produce different results than the default of 3.
        let (adv0, mask) = sample_batch();

        let mut by_config = adv0.clone();
        let config = NormConfig {
            level: NormLevel::Group,
            group_size: NonZeroUsize::new(1),
            ..NormConfig::default()
        };
        let report = normalize_advantages(&mut by_config, &mask, &config, rollout_n(3)).unwrap();
        assert_eq!(report.summary.groups, 3);

        let mut by_default = adv0.clone();
        let config = NormConfig {
            level: NormLevel::Group,
            ..NormConfig::default()
        };
        let report = normalize_advantages(&mut by_default, &mask, &config, rollout_n(3)).unwrap();
        assert_eq!(report.summary.groups, 1);
        assert_ne!(by_config, by_default);
    }

    #[test]
    fn test_single_group_batch_std_matches_batch_with_std() {
        // group_size >= num_sequences: group-level batch_std must be
        // bit-for-bit identical to batch-level with_std.
        let (adv0, mask) = sample_batch();

        let mut group_normed = adv0.clone();
        let config = NormConfig {
            level: NormLevel::Group,
            normalization_type: NormType::BatchStd,
            ..NormConfig::default()
        };
        normalize_advantages(&mut group_normed, &mask, &config, rollout_n(10)).unwrap();

        let mut batch_normed = adv0;
        let config = NormConfig::default();
        normalize_advantages(&mut batch_normed, &mask, &config, rollout_n(10)).unwrap();

        assert_eq!(group_normed, batch_normed);
    }

    #[test]
    fn test_report_reflects_final_signs() {
        let (mut adv, mask) = sample_batch();
        let config = NormConfig::default();
        let report = normalize_advantages(&mut adv, &mask, &config, rollout_n(8)).unwrap();

        // Recounting over the normalized output reproduces the report.
        assert_eq!(SignStats::collect(&adv, &mask), report.signs);
        assert!((0.0..=1.0).contains(&report.signs.neg_token_ratio));
        let masked_valid = 8; // 9 positions minus one padding
        assert_eq!(
            report.signs.pos_tokens + report.signs.neg_tokens + report.signs.zero_tokens,
            masked_valid
        );
    }

    #[test]
    fn test_all_masked_batch_is_untouched() {
        let mut adv = AdvantageMatrix::from_rows(vec![vec![1.0, -2.0]]);
        let mask = TokenMask::from_rows(vec![vec![false, false]]);
        let before = adv.clone();
        let report =
            normalize_advantages(&mut adv, &mask, &NormConfig::default(), rollout_n(1)).unwrap();
        assert_eq!(adv, before);
        assert_eq!(report.summary.tokens_normed, 0);
        assert_eq!(report.summary.median_mean, 0.0);
        assert_eq!(report.summary.std_mean, 1.0);
    }
}
