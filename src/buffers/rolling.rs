use crate::config::DisplayRange;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("row has {actual} samples, buffer rows are {expected} wide")]
    SampleCountMismatch { expected: usize, actual: usize },
}

/// Bounded FIFO of power rows for one channel
///
/// Rows are stored oldest first. Capacity and row width are fixed at
/// construction; once full, each push evicts the oldest row. Rows are
/// immutable once pushed and shared by reference count, so copying the
/// history out costs one pointer per row.
#[derive(Debug, Clone)]
pub struct RollingBuffer {
    rows: VecDeque<Arc<[f32]>>,
    capacity: usize,
    row_width: usize,
    range: DisplayRange,
    span: u64,
    center: u64,
}

impl RollingBuffer {
    /// A zero capacity is raised to one row
    pub fn new(capacity: usize, row_width: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: VecDeque::with_capacity(capacity),
            capacity,
            row_width,
            range: DisplayRange::default(),
            span: 0,
            center: 0,
        }
    }

    /// Append a row, evicting the oldest one when full
    ///
    /// A row of the wrong width is rejected and leaves the buffer untouched.
    pub fn push(&mut self, row: impl Into<Arc<[f32]>>) -> Result<(), BufferError> {
        let row = row.into();
        if row.len() != self.row_width {
            return Err(BufferError::SampleCountMismatch {
                expected: self.row_width,
                actual: row.len(),
            });
        }

        if self.rows.len() == self.capacity {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
        Ok(())
    }

    /// Rows oldest first
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + DoubleEndedIterator + '_ {
        self.rows.iter().map(|row| &row[..])
    }

    pub fn latest(&self) -> Option<&[f32]> {
        self.rows.back().map(|row| &row[..])
    }

    /// Shared handles to every row, oldest first
    pub fn shared_rows(&self) -> Vec<Arc<[f32]>> {
        self.rows.iter().cloned().collect()
    }

    /// Deep copy, oldest first
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.rows.iter().map(|row| row.to_vec()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }

    pub fn set_range(&mut self, min_db: f32, max_db: f32) {
        self.range = DisplayRange::new(min_db, max_db);
    }

    pub fn set_span(&mut self, bandwidth: u64) {
        self.span = bandwidth;
    }

    pub fn set_center(&mut self, frequency: u64) {
        self.center = frequency;
    }

    pub fn range(&self) -> DisplayRange {
        self.range
    }

    pub fn span(&self) -> u64 {
        self.span
    }

    pub fn center(&self) -> u64 {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_holds_one_row() {
        let mut buffer = RollingBuffer::new(0, 1);
        buffer.push(vec![1.0]).unwrap();
        buffer.push(vec![2.0]).unwrap();

        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.latest(), Some(&[2.0][..]));
    }

    #[test]
    fn test_shared_rows_alias_stored_rows() {
        let mut buffer = RollingBuffer::new(2, 2);
        let row: Arc<[f32]> = Arc::from(vec![1.0, 2.0]);
        buffer.push(Arc::clone(&row)).unwrap();

        let shared = buffer.shared_rows();
        assert!(Arc::ptr_eq(&shared[0], &row));
    }

    #[test]
    fn test_setters_store_values() {
        let mut buffer = RollingBuffer::new(4, 2);
        buffer.set_range(-80.0, 0.0);
        buffer.set_span(2_000_000);
        buffer.set_center(433_000_000);

        assert_eq!(buffer.range(), DisplayRange::new(-80.0, 0.0));
        assert_eq!(buffer.span(), 2_000_000);
        assert_eq!(buffer.center(), 433_000_000);
    }
}
