//! Per-call statistics report and post-normalization sign diagnostics.

use serde::Serialize;

use crate::{
    config::{NormLevel, NormType},
    matrix::{AdvantageMatrix, TokenMask},
};

/// Counters produced by one normalizer pass (batch- or group-level).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSummary {
    /// Distinct groups present in the batch (always 1 at batch level).
    pub groups: usize,
    /// Groups skipped by the `with_std` zero-variance rule.
    pub zero_groups: usize,
    /// Effective entries actually rescaled or centered.
    pub tokens_normed: usize,
    /// Mean of the medians of all processed groups (0.0 if none).
    pub median_mean: f32,
    /// Mean of the stds of all processed groups (1.0 if none).
    pub std_mean: f32,
}

/// Sign counts over the final normalized batch.
///
/// Computed on masked-valid positions only, after whichever normalizer ran.
/// Purely informational: nothing feeds back into normalization, and
/// recomputing over the same batch yields identical counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignStats {
    /// Masked tokens with a positive advantage.
    pub pos_tokens: usize,
    /// Masked tokens with a negative advantage.
    pub neg_tokens: usize,
    /// Masked tokens with an exactly zero advantage.
    pub zero_tokens: usize,
    /// Sequences whose masked advantage sum is positive.
    pub pos_sequences: usize,
    /// Sequences whose masked advantage sum is negative.
    pub neg_sequences: usize,
    /// Sequences whose masked advantage sum is zero.
    pub zero_sequences: usize,
    /// `neg_tokens / max(1, pos_tokens + neg_tokens)`; zero when no signed
    /// token exists.
    pub neg_token_ratio: f32,
}

impl SignStats {
    /// Tallies sign counts at token and sequence granularity.
    ///
    /// A fully padded row contributes a zero masked sum and is counted as a
    /// zero-sum sequence.
    ///
    /// # Panics
    ///
    /// Panics if `advantages` and `mask` have different shapes.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn collect(advantages: &AdvantageMatrix, mask: &TokenMask) -> Self {
        assert_eq!(
            advantages.shape(),
            mask.shape(),
            "advantages and mask must have identical shapes"
        );

        let (num_sequences, seq_len) = advantages.shape();
        let mut pos_tokens = 0;
        let mut neg_tokens = 0;
        let mut zero_tokens = 0;
        let mut pos_sequences = 0;
        let mut neg_sequences = 0;
        let mut zero_sequences = 0;

        for row in 0..num_sequences {
            let mut row_sum = 0.0_f32;
            for col in 0..seq_len {
                if !mask.is_valid(row, col) {
                    continue;
                }
                let value = advantages.get(row, col);
                if value > 0.0 {
                    pos_tokens += 1;
                } else if value < 0.0 {
                    neg_tokens += 1;
                } else {
                    zero_tokens += 1;
                }
                row_sum += value;
            }
            if row_sum > 0.0 {
                pos_sequences += 1;
            } else if row_sum < 0.0 {
                neg_sequences += 1;
            } else {
                zero_sequences += 1;
            }
        }

        let signed_tokens = (pos_tokens + neg_tokens).max(1);
        let neg_token_ratio = neg_tokens as f32 / signed_tokens as f32;

        Self {
            pos_tokens,
            neg_tokens,
            zero_tokens,
            pos_sequences,
            neg_sequences,
            zero_sequences,
            neg_token_ratio,
        }
    }
}

/// Statistics record returned alongside a normalized batch.
///
/// A fresh report is produced on every call; it is a diagnostic payload for
/// downstream monitoring, not engine state. Serializes flat, with the
/// [`LevelSummary`] and [`SignStats`] fields inlined next to `level` and
/// `normalization_type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormReport {
    /// Which normalizer ran.
    pub level: NormLevel,
    /// Which transform was applied.
    pub normalization_type: NormType,
    /// Counters from the normalizer pass.
    #[serde(flatten)]
    pub summary: LevelSummary,
    /// Sign diagnostics over the final batch.
    #[serde(flatten)]
    pub signs: SignStats,
}
