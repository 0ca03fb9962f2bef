//! Group-level normalization: per-group location, per-group or global scale.
//!
//! Rows are partitioned into contiguous groups of `group_size` (the last
//! group may be short). Groups never share state, so the loop body is safe
//! to parallelize; the only shared read is the global std precomputed for
//! [`NormType::BatchStd`] before any group is processed.

use std::{num::NonZeroUsize, ops::Range};

use advnorm_stats::{descriptive::DescriptiveStats, running::RunningMean};

use crate::{
    MIN_STD,
    batch_level::collect_effective,
    config::NormType,
    matrix::{AdvantageMatrix, TokenMask},
    report::LevelSummary,
};

/// Normalizes each contiguous row group independently.
///
/// Group handling per [`NormType`]:
///
/// - `WithStd`: divide by the group's own std; a group with std at or below
///   [`MIN_STD`] is skipped untouched and counted in `zero_groups`.
/// - `NoStd`: center on the group median; never divides.
/// - `BatchStd`: center on the group median, divide by the batch-global std;
///   a degenerate global std degrades to centering only.
///
/// Groups without effective entries contribute to `groups` but to nothing
/// else. Skipped zero-variance groups likewise contribute neither tokens nor
/// median/std averages.
pub(crate) fn normalize(
    advantages: &mut AdvantageMatrix,
    mask: &TokenMask,
    group_size: NonZeroUsize,
    normalization_type: NormType,
) -> LevelSummary {
    let group_size = group_size.get();
    let num_sequences = advantages.num_sequences();
    let groups = num_sequences.div_ceil(group_size);

    // Global scale for batch_std, fully computed before the group loop.
    let global_std = match normalization_type {
        NormType::BatchStd => {
            DescriptiveStats::new(collect_effective(advantages, mask, 0..num_sequences))
                .map(|stats| stats.std_dev.max(MIN_STD))
        }
        NormType::WithStd | NormType::NoStd => None,
    };

    let mut zero_groups = 0;
    let mut tokens_normed = 0;
    let mut median_mean = RunningMean::new();
    let mut std_mean = RunningMean::new();

    for group in 0..groups {
        let rows = group * group_size..((group + 1) * group_size).min(num_sequences);

        let Some(stats) = DescriptiveStats::new(collect_effective(advantages, mask, rows.clone()))
        else {
            // No effective entries in this group; it still counts toward
            // `groups` but nothing else.
            continue;
        };
        let median = stats.median;
        let std = stats.std_dev;

        match normalization_type {
            NormType::WithStd => {
                if std <= MIN_STD {
                    // A zero-variance group carries no normalizing signal;
                    // dividing would blow up and centering would collapse it
                    // to an all-zero "neutral" gradient. Leave it untouched.
                    zero_groups += 1;
                    continue;
                }
                apply(advantages, mask, rows, |value| (value - median) / std);
            }
            NormType::NoStd => {
                apply(advantages, mask, rows, |value| value - median);
            }
            NormType::BatchStd => match global_std {
                Some(global) if global > MIN_STD => {
                    apply(advantages, mask, rows, |value| (value - median) / global);
                }
                // Degenerate global scale: center only. Deliberately softer
                // than the WithStd skip rule above.
                _ => apply(advantages, mask, rows, |value| value - median),
            },
        }

        median_mean.push(median);
        std_mean.push(std);
        tokens_normed += stats.count;
    }

    LevelSummary {
        groups,
        zero_groups,
        tokens_normed,
        median_mean: median_mean.mean_or(0.0),
        std_mean: std_mean.mean_or(1.0),
    }
}

/// Applies `transform` to every effective entry in the given row range.
fn apply<F>(advantages: &mut AdvantageMatrix, mask: &TokenMask, rows: Range<usize>, transform: F)
where
    F: Fn(f32) -> f32,
{
    let seq_len = advantages.seq_len();
    for row in rows {
        for col in 0..seq_len {
            if !advantages.is_effective(mask, row, col) {
                continue;
            }
            let value = advantages.get(row, col);
            advantages.set(row, col, transform(value));
        }
    }
}
