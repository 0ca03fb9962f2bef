/// Fold-style arithmetic mean accumulator.
///
/// Accumulates a `(sum, count)` pair instead of materializing a list of
/// values and averaging it at the end. Each accumulator is independent, so
/// callers that process partitions of a dataset in parallel can keep one per
/// partition without coordination.
///
/// # Examples
///
/// ```
/// use advnorm_stats::running::RunningMean;
///
/// let mut mean = RunningMean::new();
/// assert_eq!(mean.mean(), None);
///
/// mean.push(2.0);
/// mean.push(4.0);
/// assert_eq!(mean.mean(), Some(3.0));
/// assert_eq!(mean.count(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    sum: f32,
    count: usize,
}

impl RunningMean {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value to the accumulator.
    pub fn push(&mut self, value: f32) {
        self.sum += value;
        self.count += 1;
    }

    /// Number of values accumulated so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The arithmetic mean of the accumulated values, or `None` if no value
    /// has been pushed.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> Option<f32> {
        (self.count > 0).then(|| self.sum / self.count as f32)
    }

    /// The arithmetic mean, falling back to `default` for an empty
    /// accumulator.
    ///
    /// # Examples
    ///
    /// ```
    /// use advnorm_stats::running::RunningMean;
    ///
    /// let mean = RunningMean::new();
    /// assert_eq!(mean.mean_or(1.0), 1.0);
    /// ```
    #[must_use]
    pub fn mean_or(&self, default: f32) -> f32 {
        self.mean().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator() {
        let mean = RunningMean::new();
        assert_eq!(mean.count(), 0);
        assert_eq!(mean.mean(), None);
        assert_eq!(mean.mean_or(42.0), 42.0);
    }

    #[test]
    fn test_mean_of_pushed_values() {
        let mut mean = RunningMean::new();
        for v in [1.0, 2.0, 3.0, 4.0] {
            mean.push(v);
        }
        assert_eq!(mean.count(), 4);
        assert_eq!(mean.mean(), Some(2.5));
        assert_eq!(mean.mean_or(0.0), 2.5);
    }

    #[test]
    fn test_negative_values() {
        let mut mean = RunningMean::new();
        mean.push(-3.0);
        mean.push(1.0);
        assert_eq!(mean.mean(), Some(-1.0));
    }
}
