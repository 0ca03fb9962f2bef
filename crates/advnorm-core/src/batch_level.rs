//! Batch-level normalization: one location/scale pair for the whole batch.

use advnorm_stats::descriptive::DescriptiveStats;

use crate::{
    MIN_STD,
    config::NormType,
    matrix::{AdvantageMatrix, TokenMask},
    report::LevelSummary,
};

/// Rescales every effective entry using the median and population std of
/// all effective entries in the batch.
///
/// An empty effective set leaves the batch untouched and reports the
/// conventional `median = 0.0`, `std = 1.0`. Otherwise the std is floored to
/// [`MIN_STD`] before dividing.
pub(crate) fn normalize(
    advantages: &mut AdvantageMatrix,
    mask: &TokenMask,
    normalization_type: NormType,
) -> LevelSummary {
    let (num_sequences, seq_len) = advantages.shape();

    let effective = collect_effective(advantages, mask, 0..num_sequences);
    let Some(stats) = DescriptiveStats::new(effective) else {
        // Nothing to rescale; the defaults exist only for the report.
        return LevelSummary {
            groups: 1,
            zero_groups: 0,
            tokens_normed: 0,
            median_mean: 0.0,
            std_mean: 1.0,
        };
    };

    let median = stats.median;
    let std = stats.std_dev.max(MIN_STD);

    for row in 0..num_sequences {
        for col in 0..seq_len {
            if !advantages.is_effective(mask, row, col) {
                continue;
            }
            let value = advantages.get(row, col);
            let normed = match normalization_type {
                // batch_std is indistinguishable from with_std at batch
                // level; the distinction only exists in group mode.
                NormType::WithStd | NormType::BatchStd => (value - median) / std,
                NormType::NoStd => value - median,
            };
            advantages.set(row, col, normed);
        }
    }

    LevelSummary {
        groups: 1,
        zero_groups: 0,
        tokens_normed: stats.count,
        median_mean: median,
        std_mean: std,
    }
}

/// Gathers the effective entries of the given row range into a flat list.
pub(crate) fn collect_effective(
    advantages: &AdvantageMatrix,
    mask: &TokenMask,
    rows: std::ops::Range<usize>,
) -> Vec<f32> {
    let (_, seq_len) = advantages.shape();
    let mut values = Vec::new();
    for row in rows {
        for col in 0..seq_len {
            if advantages.is_effective(mask, row, col) {
                values.push(advantages.get(row, col));
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_std_rescales_around_median() {
        // Effective values [1, 2, 3, 4, 100]: median 3, population std
        // sqrt(7610 / 5).
        let mut adv = AdvantageMatrix::from_rows(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 100.0, 0.0],
        ]);
        let mask = TokenMask::all_valid(2, 3);
        let summary = normalize(&mut adv, &mask, NormType::WithStd);

        let std = (7610.0_f32 / 5.0).sqrt();
        assert!((adv.get(0, 0) - (1.0 - 3.0) / std).abs() < 1e-6);
        assert!((adv.get(1, 1) - (100.0 - 3.0) / std).abs() < 1e-6);
        assert_eq!(adv.get(1, 2), 0.0); // zero advantage passes through
        assert_eq!(summary.tokens_normed, 5);
        assert_eq!(summary.groups, 1);
        assert_eq!(summary.zero_groups, 0);
        assert_eq!(summary.median_mean, 3.0);
        assert!((summary.std_mean - std).abs() < 1e-4);
    }

    #[test]
    fn test_no_std_centers_only() {
        let mut adv = AdvantageMatrix::from_rows(vec![vec![1.0, 2.0, 3.0, 4.0, 100.0]]);
        let mask = TokenMask::all_valid(1, 5);
        normalize(&mut adv, &mask, NormType::NoStd);
        assert_eq!(adv.row(0), &[-2.0, -1.0, 0.0, 1.0, 97.0]);
    }

    #[test]
    fn test_batch_std_equals_with_std_at_batch_level() {
        let rows = vec![vec![1.0, -2.0, 3.5], vec![0.25, -4.0, 2.0]];
        let mask = TokenMask::all_valid(2, 3);

        let mut with_std = AdvantageMatrix::from_rows(rows.clone());
        normalize(&mut with_std, &mask, NormType::WithStd);

        let mut batch_std = AdvantageMatrix::from_rows(rows);
        normalize(&mut batch_std, &mask, NormType::BatchStd);

        assert_eq!(with_std, batch_std);
    }

    #[test]
    fn test_masked_positions_pass_through_unchanged() {
        let mut adv = AdvantageMatrix::from_rows(vec![vec![7.0, 1.0, 2.0, 3.0]]);
        let mask = TokenMask::from_rows(vec![vec![false, true, true, true]]);
        normalize(&mut adv, &mask, NormType::WithStd);
        assert_eq!(adv.get(0, 0), 7.0);
    }

    #[test]
    fn test_empty_effective_set_reports_defaults() {
        let mut adv = AdvantageMatrix::from_rows(vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
        let mask = TokenMask::all_valid(2, 2);
        let before = adv.clone();
        let summary = normalize(&mut adv, &mask, NormType::WithStd);
        assert_eq!(adv, before);
        assert_eq!(summary.tokens_normed, 0);
        assert_eq!(summary.median_mean, 0.0);
        assert_eq!(summary.std_mean, 1.0);
    }

    #[test]
    fn test_zero_variance_batch_divides_by_floor() {
        // All effective values equal: std 0 floored to MIN_STD, so entries
        // become (5 - 5) / MIN_STD = 0. Batch level has no skip rule.
        let mut adv = AdvantageMatrix::from_rows(vec![vec![5.0, 5.0, 5.0]]);
        let mask = TokenMask::all_valid(1, 3);
        let summary = normalize(&mut adv, &mask, NormType::WithStd);
        assert_eq!(adv.row(0), &[0.0, 0.0, 0.0]);
        assert_eq!(summary.zero_groups, 0);
        assert_eq!(summary.std_mean, MIN_STD);
    }
}
