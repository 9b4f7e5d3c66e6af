//! Labeled message corpus: loading, label storage and train/test partitioning.

pub mod labels;
pub mod loader;
pub mod split;

pub use labels::LabelMatrix;
pub use loader::{DEFAULT_TABLE, load_dataset};
pub use split::{SplitIndices, train_test_split};

use crate::error::{Result, TriageError};

/// One labeled message as read from the source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    /// One `{0, 1}` entry per category, in category order.
    pub labels: Vec<u8>,
}

/// Corpus decomposed into parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Raw text of each message.
    pub messages: Vec<String>,
    /// One row per message, one column per category.
    pub targets: LabelMatrix,
    /// Category names in target column order.
    pub category_names: Vec<String>,
}

impl Dataset {
    /// Decompose loaded messages into texts and a target matrix.
    pub fn from_messages(messages: Vec<Message>, category_names: Vec<String>) -> Result<Self> {
        let cols = category_names.len();
        let rows = messages.len();
        let mut texts = Vec::with_capacity(rows);
        let mut values = Vec::with_capacity(rows * cols);
        for (idx, message) in messages.into_iter().enumerate() {
            if message.labels.len() != cols {
                return Err(TriageError::validation(format!(
                    "message {idx} has {} labels but there are {cols} categories",
                    message.labels.len()
                )));
            }
            texts.push(message.text);
            values.extend(message.labels);
        }
        let dataset = Self {
            messages: texts,
            targets: LabelMatrix::new(rows, cols, values)?,
            category_names,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check that messages, targets and category names agree in shape.
    pub fn validate(&self) -> Result<()> {
        if self.messages.len() != self.targets.rows() {
            return Err(TriageError::validation(format!(
                "{} messages but {} target rows",
                self.messages.len(),
                self.targets.rows()
            )));
        }
        if self.category_names.len() != self.targets.cols() {
            return Err(TriageError::validation(format!(
                "{} category names but {} target columns",
                self.category_names.len(),
                self.targets.cols()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Rows at `indices`, in that order, with the same categories.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            messages: indices.iter().map(|&i| self.messages[i].clone()).collect(),
            targets: self.targets.select_rows(indices),
            category_names: self.category_names.clone(),
        }
    }

    /// Split into `(train, test)` datasets.
    pub fn partition(&self, split: &SplitIndices) -> (Self, Self) {
        (self.subset(&split.train), self.subset(&split.test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str, labels: &[u8]) -> Message {
        Message {
            text: text.to_string(),
            labels: labels.to_vec(),
        }
    }

    #[test]
    fn from_messages_builds_parallel_arrays() {
        let dataset = Dataset::from_messages(
            vec![message("need water", &[1, 0]), message("road blocked", &[0, 1])],
            vec!["water".into(), "infrastructure".into()],
        )
        .unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.targets.rows(), dataset.messages.len());
        assert_eq!(dataset.targets.cols(), dataset.category_names.len());
        assert_eq!(dataset.targets.row(1), &[0, 1]);
    }

    #[test]
    fn from_messages_rejects_ragged_labels() {
        let err = Dataset::from_messages(
            vec![message("a", &[1, 0]), message("b", &[1])],
            vec!["x".into(), "y".into()],
        )
        .unwrap_err();
        assert!(matches!(err, TriageError::Validation(_)));
    }

    #[test]
    fn partition_keeps_rows_aligned() {
        let dataset = Dataset::from_messages(
            vec![message("a", &[1]), message("b", &[0]), message("c", &[1])],
            vec!["x".into()],
        )
        .unwrap();
        let split = SplitIndices {
            train: vec![2, 0],
            test: vec![1],
        };
        let (train, test) = dataset.partition(&split);
        assert_eq!(train.messages, vec!["c", "a"]);
        assert_eq!(train.targets.column(0), vec![1, 1]);
        assert_eq!(test.messages, vec!["b"]);
        assert_eq!(test.targets.column(0), vec![0]);
    }
}
