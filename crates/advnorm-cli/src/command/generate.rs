use std::{num::NonZeroUsize, path::PathBuf};

use advnorm_stats::descriptive::DescriptiveStats;
use anyhow::ensure;
use rand::{Rng, SeedableRng as _};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg32;

use crate::{schema::BatchFile, util};

/// Spread of per-group difficulty offsets; groups simulate rollouts of the
/// same prompt, so their advantages share a common shift.
const GROUP_OFFSET_SIGMA: f32 = 2.0;
const TOKEN_SIGMA: f32 = 1.0;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateArg {
    /// Number of rollout sequences in the batch
    #[arg(long, default_value_t = 64)]
    num_sequences: usize,
    /// Token positions per sequence
    #[arg(long, default_value_t = 128)]
    seq_len: usize,
    /// Rollouts per prompt (written to the batch file as the default group size)
    #[arg(long, default_value = "8")]
    rollout_n: NonZeroUsize,
    /// Fraction of valid tokens whose advantage is zeroed out
    #[arg(long, default_value_t = 0.2)]
    sparsity: f64,
    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    ensure!(
        (0.0..=1.0).contains(&arg.sparsity),
        "sparsity must be in [0, 1]"
    );
    ensure!(arg.seq_len >= 1, "seq_len must be at least 1");

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);
    eprintln!("Generating with seed {seed}");

    let token_noise = Normal::new(0.0_f32, TOKEN_SIGMA)?;
    let group_offset = Normal::new(0.0_f32, GROUP_OFFSET_SIGMA)?;

    let mut advantages = Vec::with_capacity(arg.num_sequences);
    let mut mask = Vec::with_capacity(arg.num_sequences);
    let mut offset = 0.0;
    for row in 0..arg.num_sequences {
        if row % arg.rollout_n.get() == 0 {
            offset = group_offset.sample(&mut rng);
        }
        // Valid prefix then padding, as produced by right-padded rollouts.
        let valid_len = rng.random_range(1..=arg.seq_len);
        let mut adv_row = Vec::with_capacity(arg.seq_len);
        let mut mask_row = Vec::with_capacity(arg.seq_len);
        for col in 0..arg.seq_len {
            let valid = col < valid_len;
            let value = if valid && !rng.random_bool(arg.sparsity) {
                offset + token_noise.sample(&mut rng)
            } else {
                0.0
            };
            adv_row.push(value);
            mask_row.push(valid);
        }
        advantages.push(adv_row);
        mask.push(mask_row);
    }

    let effective = advantages
        .iter()
        .zip(&mask)
        .flat_map(|(adv_row, mask_row)| {
            adv_row
                .iter()
                .zip(mask_row)
                .filter(|&(value, valid)| *valid && *value != 0.0)
                .map(|(value, _)| *value)
        });
    match DescriptiveStats::new(effective) {
        Some(stats) => eprintln!(
            "Effective tokens: {} (median {:.3}, std {:.3})",
            stats.count, stats.median, stats.std_dev
        ),
        None => eprintln!("Effective tokens: 0"),
    }

    let batch = BatchFile {
        advantages,
        mask,
        rollout_n: arg.rollout_n.get(),
    };
    util::save_json(&batch, arg.output.as_ref())
}
