use std::path::PathBuf;

use advnorm_core::{NormConfig, NormLevel, NormType, normalize_advantages};

use crate::{
    schema::{BatchFile, NormalizeOutput, TrainerConfigFile},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct NormalizeArg {
    /// Batch file (JSON: advantages, mask, rollout_n)
    #[arg(long)]
    batch: PathBuf,
    /// Trainer config file; its `adv_norm` section controls normalization.
    /// Without this flag the default config (batch-level with_std) is used.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the config's normalization level (batch | group)
    #[arg(long)]
    level: Option<NormLevel>,
    /// Override the config's normalization type (with_std | no_std | batch_std)
    #[arg(long)]
    normalization_type: Option<NormType>,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &NormalizeArg) -> anyhow::Result<()> {
    let batch: BatchFile = util::read_json_file("batch", &arg.batch)?;
    let (mut advantages, mask, rollout_n) = batch.into_parts()?;

    let mut config = match &arg.config {
        Some(path) => {
            let file: TrainerConfigFile = util::read_json_file("config", path)?;
            NormConfig::from_section(file.adv_norm)
        }
        None => NormConfig::default(),
    };
    if let Some(level) = arg.level {
        config.level = level;
    }
    if let Some(normalization_type) = arg.normalization_type {
        config.normalization_type = normalization_type;
    }

    let report = normalize_advantages(&mut advantages, &mask, &config, rollout_n);

    match &report {
        Some(report) => eprintln!(
            "Normalized {} tokens in {} group(s) ({} zero-variance) at {} level ({})",
            report.summary.tokens_normed,
            report.summary.groups,
            report.summary.zero_groups,
            report.level,
            report.normalization_type,
        ),
        None => eprintln!("Normalization disabled; batch passed through unchanged"),
    }

    let output = NormalizeOutput {
        advantages: advantages.to_rows(),
        report,
    };
    util::save_json(&output, arg.output.as_ref())
}
