//! Normalization settings and their resolution from external configuration.
//!
//! The four settings mirror the trainer-side config section that controls
//! advantage normalization. Unknown `level` / `normalization_type` strings
//! are rejected at this boundary (via [`FromStr`] or serde); past it, both
//! are closed enums matched exhaustively, so no "unknown variant" error path
//! exists inside the engine.

use std::{num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};

/// Granularity at which location/scale statistics are computed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum NormLevel {
    /// One median/std pair over all effective entries in the batch.
    #[default]
    #[display("batch")]
    Batch,
    /// Per-group median/std over contiguous row groups.
    #[display("group")]
    Group,
}

impl FromStr for NormLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(Self::Batch),
            "group" => Ok(Self::Group),
            _ => Err(ConfigError::UnknownLevel {
                value: s.to_string(),
            }),
        }
    }
}

/// How the gathered location/scale statistics are applied.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum NormType {
    /// Center on the median and divide by the standard deviation.
    ///
    /// In group mode, a group whose std is at or below the floor is left
    /// untouched and counted as a zero-variance group rather than divided by
    /// near-zero.
    #[default]
    #[display("with_std")]
    WithStd,
    /// Center on the median only; never divides, so zero-variance groups
    /// need no special handling.
    #[display("no_std")]
    NoStd,
    /// Center on the per-group median but divide by one batch-global
    /// standard deviation.
    ///
    /// At batch level this is identical to [`NormType::WithStd`]. In group
    /// mode, a degenerate global std degrades to centering only — unlike
    /// `WithStd`'s skip rule, the group is still centered. The asymmetry is
    /// deliberate and pinned by tests.
    #[display("batch_std")]
    BatchStd,
}

impl FromStr for NormType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "with_std" => Ok(Self::WithStd),
            "no_std" => Ok(Self::NoStd),
            "batch_std" => Ok(Self::BatchStd),
            _ => Err(ConfigError::UnknownType {
                value: s.to_string(),
            }),
        }
    }
}

/// Error raised for unrecognized normalization settings.
///
/// This is a fatal configuration error: the caller must fix the
/// configuration before retrying. It can only occur at the parse boundary.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    /// The `level` string is not `"batch"` or `"group"`.
    #[display("unknown normalization level '{value}'")]
    UnknownLevel { value: String },
    /// The `normalization_type` string is not one of `"with_std"`,
    /// `"no_std"`, `"batch_std"`.
    #[display("unknown normalization type '{value}'")]
    UnknownType { value: String },
}

/// Advantage normalization settings.
///
/// Immutable per call; the engine carries no state across calls. Missing
/// fields take their documented defaults when deserialized, and a missing
/// config *section* resolves to the disabled config via
/// [`NormConfig::from_section`].
///
/// # Examples
///
/// ```
/// use advnorm_core::{NormConfig, NormLevel, NormType};
///
/// let config: NormConfig = serde_json::from_str(r#"{ "level": "group" }"#).unwrap();
/// assert!(config.enable);
/// assert_eq!(config.level, NormLevel::Group);
/// assert_eq!(config.group_size, None);
/// assert_eq!(config.normalization_type, NormType::WithStd);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormConfig {
    /// Master switch; when `false` the engine is a no-op.
    pub enable: bool,
    /// Batch-level or group-level statistics.
    pub level: NormLevel,
    /// Rows per group in group mode. When unset, the caller-supplied default
    /// (typically the rollout repetition count) is used. The nonzero type
    /// makes "group size ≥ 1" a parse-time invariant.
    pub group_size: Option<NonZeroUsize>,
    /// How statistics are applied to the advantages.
    pub normalization_type: NormType,
}

impl Default for NormConfig {
    fn default() -> Self {
        Self {
            enable: true,
            level: NormLevel::default(),
            group_size: None,
            normalization_type: NormType::default(),
        }
    }
}

impl NormConfig {
    /// The no-op configuration.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enable: false,
            ..Self::default()
        }
    }

    /// Resolves an optional config section into a concrete config.
    ///
    /// An absent section means normalization is off — never an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use advnorm_core::NormConfig;
    ///
    /// assert!(!NormConfig::from_section(None).enable);
    /// assert!(NormConfig::from_section(Some(NormConfig::default())).enable);
    /// ```
    #[must_use]
    pub fn from_section(section: Option<Self>) -> Self {
        section.unwrap_or_else(Self::disabled)
    }
}
