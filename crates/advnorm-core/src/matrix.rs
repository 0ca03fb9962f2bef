//! Batch-shaped containers for per-token advantages and validity masks.
//!
//! A batch is a rectangle of `num_sequences` rows by `seq_len` columns. Row
//! `i` holds one rollout sequence; column `j` holds the token at position
//! `j`. Both containers are row-major and fixed-shape: the normalization
//! engine rewrites values in place but never grows or shrinks a batch.

/// Per-token advantage values for one batch of rollout sequences.
///
/// Row-major storage, shape `(num_sequences, seq_len)`. The normalizer
/// mutates entries in place; the shape is fixed at construction.
///
/// # Examples
///
/// ```
/// use advnorm_core::AdvantageMatrix;
///
/// let m = AdvantageMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
/// assert_eq!(m.shape(), (2, 2));
/// assert_eq!(m.get(1, 0), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AdvantageMatrix {
    values: Vec<f32>,
    num_sequences: usize,
    seq_len: usize,
}

impl AdvantageMatrix {
    /// Creates a matrix from a flat row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != num_sequences * seq_len`.
    #[must_use]
    pub fn from_vec(values: Vec<f32>, num_sequences: usize, seq_len: usize) -> Self {
        assert_eq!(
            values.len(),
            num_sequences * seq_len,
            "buffer length must equal num_sequences * seq_len"
        );
        Self {
            values,
            num_sequences,
            seq_len,
        }
    }

    /// Creates a matrix from a list of equally sized rows.
    ///
    /// An empty row list yields a `(0, 0)` matrix.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Self {
        let num_sequences = rows.len();
        let seq_len = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == seq_len),
            "all rows must have the same length"
        );
        let values = rows.into_iter().flatten().collect();
        Self {
            values,
            num_sequences,
            seq_len,
        }
    }

    /// `(num_sequences, seq_len)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_sequences, self.seq_len)
    }

    /// Number of sequence rows in the batch.
    #[must_use]
    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    /// Number of token positions per sequence.
    #[must_use]
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[self.index(row, col)]
    }

    /// Overwrites the value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let idx = self.index(row, col);
        self.values[idx] = value;
    }

    /// One sequence row as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = self.index(row, 0);
        &self.values[start..start + self.seq_len]
    }

    /// The whole batch as a flat row-major slice.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Copies the batch out as a list of rows (for serialization).
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        (0..self.num_sequences)
            .map(|row| self.row(row).to_vec())
            .collect()
    }

    /// Whether `(row, col)` carries learning signal: the position is valid
    /// under `mask` and its advantage is not exactly zero.
    ///
    /// Zero advantages are treated as "not applicable" even when the mask
    /// marks them valid; they are excluded from location statistics and left
    /// untouched by the normalizer.
    ///
    /// # Examples
    ///
    /// ```
    /// use advnorm_core::{AdvantageMatrix, TokenMask};
    ///
    /// let adv = AdvantageMatrix::from_rows(vec![vec![1.5, 0.0]]);
    /// let mask = TokenMask::from_rows(vec![vec![true, true]]);
    /// assert!(adv.is_effective(&mask, 0, 0));
    /// assert!(!adv.is_effective(&mask, 0, 1)); // zero advantage
    /// ```
    #[expect(clippy::float_cmp)]
    #[inline]
    #[must_use]
    pub fn is_effective(&self, mask: &TokenMask, row: usize, col: usize) -> bool {
        mask.is_valid(row, col) && self.get(row, col) != 0.0
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.num_sequences && col < self.seq_len,
            "position ({row}, {col}) out of bounds for shape ({}, {})",
            self.num_sequences,
            self.seq_len
        );
        row * self.seq_len + col
    }
}

/// Validity mask distinguishing real token positions from padding.
///
/// Same shape as the [`AdvantageMatrix`] it accompanies; `true` marks a real
/// token. The engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMask {
    valid: Vec<bool>,
    num_sequences: usize,
    seq_len: usize,
}

impl TokenMask {
    /// Creates a mask from a flat row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if `valid.len() != num_sequences * seq_len`.
    #[must_use]
    pub fn from_vec(valid: Vec<bool>, num_sequences: usize, seq_len: usize) -> Self {
        assert_eq!(
            valid.len(),
            num_sequences * seq_len,
            "buffer length must equal num_sequences * seq_len"
        );
        Self {
            valid,
            num_sequences,
            seq_len,
        }
    }

    /// Creates a mask from a list of equally sized rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        let num_sequences = rows.len();
        let seq_len = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == seq_len),
            "all rows must have the same length"
        );
        let valid = rows.into_iter().flatten().collect();
        Self {
            valid,
            num_sequences,
            seq_len,
        }
    }

    /// A mask marking every position of a `(num_sequences, seq_len)` batch
    /// valid.
    #[must_use]
    pub fn all_valid(num_sequences: usize, seq_len: usize) -> Self {
        Self {
            valid: vec![true; num_sequences * seq_len],
            num_sequences,
            seq_len,
        }
    }

    /// `(num_sequences, seq_len)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_sequences, self.seq_len)
    }

    /// Whether `(row, col)` is a real token position.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        assert!(
            row < self.num_sequences && col < self.seq_len,
            "position ({row}, {col}) out of bounds for shape ({}, {})",
            self.num_sequences,
            self.seq_len
        );
        self.valid[row * self.seq_len + col]
    }
}
