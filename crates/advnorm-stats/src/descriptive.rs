/// Descriptive statistics summarizing a dataset.
///
/// Contains the location and scale measures needed to standardize a set of
/// `f32` values, along with the dataset size.
///
/// # Conventions
///
/// - `median` is the **lower middle** element of the sorted dataset
///   (`sorted[(n - 1) / 2]`, no interpolation for even-sized datasets).
/// - `variance` is the **population** variance (sum of squared deviations
///   divided by N, not N−1); `std_dev` is its square root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The arithmetic mean of the dataset.
    pub mean: f32,
    /// The lower median of the dataset.
    pub median: f32,
    /// The population variance of the dataset.
    pub variance: f32,
    /// The population standard deviation of the dataset.
    pub std_dev: f32,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// The values are collected and sorted internally before computing
    /// statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use advnorm_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, 2.0);
    /// ```
    ///
    /// For even-sized datasets the lower middle element is returned:
    ///
    /// ```
    /// # use advnorm_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(stats.median, 2.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// This is an optimized version that skips the sorting step. Use this
    /// when you already have sorted data to avoid unnecessary work.
    ///
    /// # Arguments
    ///
    /// * `sorted_values` - Values sorted in ascending order
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let count = sorted_values.len();
        if count == 0 {
            return None;
        }
        let n = count as f32;
        let mean = sorted_values.iter().copied().sum::<f32>() / n;
        // Lower median: no interpolation between the two middle elements.
        let median = sorted_values[(count - 1) / 2];
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;
        let std_dev = variance.sqrt();

        Some(Self {
            count,
            mean,
            median,
            variance,
            std_dev,
        })
    }
}
