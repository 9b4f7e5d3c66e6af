//! Dense binary label matrix shared by the loader, classifiers and metrics.

use crate::error::{Result, TriageError};

/// Row-major `rows x cols` matrix of `{0, 1}` labels.
///
/// Rows are messages, columns are categories. Column order is the category order of the
/// source table and is never permuted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatrix {
    rows: usize,
    cols: usize,
    values: Vec<u8>,
}

impl LabelMatrix {
    /// Wrap row-major values, checking the shape and that every value is binary.
    pub fn new(rows: usize, cols: usize, values: Vec<u8>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(values.len()) {
            return Err(TriageError::validation(format!(
                "label matrix of {rows}x{cols} cannot hold {} values",
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|&v| v > 1) {
            return Err(TriageError::validation(format!(
                "non-binary label {} at row {} column {}",
                values[pos],
                pos / cols.max(1),
                pos % cols.max(1)
            )));
        }
        Ok(Self { rows, cols, values })
    }

    /// Wrap classifier output, which is binary and correctly sized by construction.
    pub(crate) fn from_predictions(rows: usize, cols: usize, values: Vec<u8>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        debug_assert!(values.iter().all(|&v| v <= 1));
        Self { rows, cols, values }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0; rows * cols],
        }
    }

    /// Assemble a matrix from per-category columns of equal length.
    pub fn from_columns(rows: usize, columns: &[Vec<u8>]) -> Result<Self> {
        let cols = columns.len();
        let mut matrix = Self::zeros(rows, cols);
        for (c, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(TriageError::validation(format!(
                    "column {c} has {} rows, expected {rows}",
                    column.len()
                )));
            }
            for (r, &value) in column.iter().enumerate() {
                if value > 1 {
                    return Err(TriageError::validation(format!(
                        "non-binary label {value} at row {r} column {c}"
                    )));
                }
                matrix.values[r * cols + c] = value;
            }
        }
        Ok(matrix)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.values[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.cols;
        &self.values[start..start + self.cols]
    }

    /// Copy out one category column.
    pub fn column(&self, col: usize) -> Vec<u8> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    /// All values with rows laid end to end.
    pub fn flattened(&self) -> &[u8] {
        &self.values
    }

    /// New matrix holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.cols);
        for &idx in indices {
            values.extend_from_slice(self.row(idx));
        }
        Self {
            rows: indices.len(),
            cols: self.cols,
            values,
        }
    }

    /// True when the column holds a single value across all rows.
    pub fn column_is_constant(&self, col: usize) -> bool {
        let mut values = (0..self.rows).map(|r| self.get(r, col));
        match values.next() {
            Some(first) => values.all(|v| v == first),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_shape_mismatch_and_non_binary_values() {
        assert!(matches!(
            LabelMatrix::new(2, 2, vec![0, 1, 1]),
            Err(TriageError::Validation(_))
        ));
        assert!(matches!(
            LabelMatrix::new(1, 2, vec![0, 2]),
            Err(TriageError::Validation(_))
        ));
    }

    #[test]
    fn rows_columns_and_selection_keep_order() {
        let m = LabelMatrix::new(3, 2, vec![1, 0, 0, 1, 1, 1]).unwrap();
        assert_eq!(m.row(1), &[0, 1]);
        assert_eq!(m.column(0), vec![1, 0, 1]);
        let picked = m.select_rows(&[2, 0]);
        assert_eq!(picked.rows(), 2);
        assert_eq!(picked.flattened(), &[1, 1, 1, 0]);
    }

    #[test]
    fn from_columns_transposes_into_row_major() {
        let m = LabelMatrix::from_columns(2, &[vec![1, 0], vec![0, 0], vec![1, 1]]).unwrap();
        assert_eq!(m.cols(), 3);
        assert_eq!(m.flattened(), &[1, 0, 1, 0, 0, 1]);
        assert!(m.column_is_constant(1));
        assert!(!m.column_is_constant(0));
        assert!(LabelMatrix::from_columns(2, &[vec![1]]).is_err());
    }
}
