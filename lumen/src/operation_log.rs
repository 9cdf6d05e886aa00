//! Record of operations applied through the engine.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use strum_macros::{Display, EnumIter};

#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Grayscale,
    #[strum(to_string = "Gaussian Blur")]
    GaussianBlur,
    Sobel,
    Laplacian,
    Median,
    Binarize,
    Dilate,
    Erode,
    #[strum(to_string = "Template Match")]
    TemplateMatch,
    #[strum(to_string = "Forward FFT")]
    ForwardTransform,
    #[strum(to_string = "Inverse FFT")]
    InverseTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRecord {
    pub operation: Operation,
    pub elapsed: Duration,
}

impl fmt::Display for OperationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ms", self.operation, self.elapsed.as_millis())
    }
}

/// Bounded log; once full, each new record evicts the oldest.
#[derive(Debug, Clone)]
pub struct OperationLog {
    records: VecDeque<OperationRecord>,
    capacity: usize,
}

impl OperationLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, record: OperationRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records, oldest first.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &OperationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Per-operation counts, most frequent first (ties keep first-seen
    /// order), and the summed processing time.
    pub fn summary(&self) -> OperationSummary {
        let mut counts: Vec<(Operation, usize)> = Vec::new();
        for record in &self.records {
            match counts.iter_mut().find(|(op, _)| *op == record.operation) {
                Some((_, count)) => *count += 1,
                None => counts.push((record.operation, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        OperationSummary {
            counts,
            total: self.records.iter().map(|r| r.elapsed).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSummary {
    pub counts: Vec<(Operation, usize)>,
    pub total: Duration,
}

impl fmt::Display for OperationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return writeln!(f, "No operations applied");
        }
        for (operation, count) in &self.counts {
            writeln!(f, "- {operation}: {count}")?;
        }
        writeln!(f, "Total processing time: {} ms", self.total.as_millis())
    }
}
