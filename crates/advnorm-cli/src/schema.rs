//! On-disk JSON schemas for advantage batches and trainer configuration.
//!
//! A batch file pairs an advantage grid with its validity mask and the
//! rollout repetition count used as the default group size. Validation
//! happens here so the core types can keep their panic-on-misuse contracts:
//! malformed files surface as CLI errors, not panics.

use std::num::NonZeroUsize;

use advnorm_core::{AdvantageMatrix, NormConfig, NormReport, TokenMask};
use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

/// Serialized advantage batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFile {
    /// Per-token advantages, one inner vec per rollout sequence.
    pub advantages: Vec<Vec<f32>>,
    /// Validity mask, same shape as `advantages`.
    pub mask: Vec<Vec<bool>>,
    /// Rollouts sampled per prompt; the default group size in group mode.
    pub rollout_n: usize,
}

impl BatchFile {
    /// Validates the file and converts it into engine types.
    ///
    /// # Errors
    ///
    /// Fails on ragged rows, a mask shape differing from the advantage
    /// shape, or `rollout_n == 0`.
    pub fn into_parts(self) -> anyhow::Result<(AdvantageMatrix, TokenMask, NonZeroUsize)> {
        let seq_len = self.advantages.first().map_or(0, Vec::len);
        ensure!(
            self.advantages.iter().all(|row| row.len() == seq_len),
            "advantage rows must all have the same length"
        );
        ensure!(
            self.mask.len() == self.advantages.len()
                && self.mask.iter().all(|row| row.len() == seq_len),
            "mask shape must match advantage shape"
        );
        let rollout_n =
            NonZeroUsize::new(self.rollout_n).context("rollout_n must be at least 1")?;

        let advantages = AdvantageMatrix::from_rows(self.advantages);
        let mask = TokenMask::from_rows(self.mask);
        Ok((advantages, mask, rollout_n))
    }
}

/// The slice of a trainer configuration file this tool reads.
///
/// Only the `adv_norm` section is interpreted; an absent section resolves to
/// the disabled config (see [`NormConfig::from_section`]). Unknown sections
/// are ignored so a full trainer config can be passed as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainerConfigFile {
    #[serde(default)]
    pub adv_norm: Option<NormConfig>,
}

/// Output of the `normalize` command.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeOutput {
    /// The normalized advantage grid, same shape as the input.
    pub advantages: Vec<Vec<f32>>,
    /// Statistics record; `None` when normalization was disabled.
    pub report: Option<NormReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchFile {
        BatchFile {
            advantages: vec![vec![1.0, 0.0], vec![-2.0, 3.0]],
            mask: vec![vec![true, false], vec![true, true]],
            rollout_n: 2,
        }
    }

    #[test]
    fn test_roundtrip() {
        let batch = sample();
        let json = serde_json::to_string(&batch).unwrap();
        let back: BatchFile = serde_json::from_str(&json).unwrap();
        assert_eq!(batch, back);
    }

    #[test]
    fn test_into_parts() {
        let (advantages, mask, rollout_n) = sample().into_parts().unwrap();
        assert_eq!(advantages.shape(), (2, 2));
        assert_eq!(advantages.get(1, 0), -2.0);
        assert!(!mask.is_valid(0, 1));
        assert_eq!(rollout_n.get(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let mut batch = sample();
        batch.advantages[1].push(9.0);
        assert!(batch.into_parts().is_err());
    }

    #[test]
    fn test_mask_shape_mismatch_rejected() {
        let mut batch = sample();
        batch.mask.pop();
        assert!(batch.into_parts().is_err());
    }

    #[test]
    fn test_zero_rollout_n_rejected() {
        let mut batch = sample();
        batch.rollout_n = 0;
        assert!(batch.into_parts().is_err());
    }

    #[test]
    fn test_config_file_section_is_optional() {
        let file: TrainerConfigFile = serde_json::from_str("{}").unwrap();
        assert!(file.adv_norm.is_none());
        assert!(!NormConfig::from_section(file.adv_norm).enable);

        let file: TrainerConfigFile =
            serde_json::from_str(r#"{ "adv_norm": { "level": "group" }, "lr": 0.001 }"#).unwrap();
        assert!(NormConfig::from_section(file.adv_norm).enable);
    }
}
