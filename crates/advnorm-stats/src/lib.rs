//! Statistical primitives for advantage normalization.
//!
//! This crate provides the small, dependency-free numerical building blocks
//! used by the normalization engine:
//!
//! - **Descriptive statistics**: median and population standard deviation of
//!   an `f32` dataset ([`descriptive`])
//! - **Running means**: fold-style `(sum, count)` accumulators for averaging
//!   per-group statistics without materializing intermediate lists
//!   ([`running`])
//!
//! # Conventions
//!
//! Two conventions differ from textbook defaults and are load-bearing for the
//! normalization engine; both are documented on [`descriptive::DescriptiveStats`]:
//!
//! - The **median** of an even-sized dataset is the *lower* of the two middle
//!   elements (no interpolation).
//! - The **variance** is the *population* variance (divide by N, not N−1).
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use advnorm_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.median, 3.0);
//! assert_eq!(stats.variance, 2.0);
//! ```
//!
//! ## Averaging with a running mean
//!
//! ```
//! use advnorm_stats::running::RunningMean;
//!
//! let mut mean = RunningMean::new();
//! mean.push(1.0);
//! mean.push(3.0);
//! assert_eq!(mean.mean(), Some(2.0));
//! ```

pub mod descriptive;
pub mod running;
