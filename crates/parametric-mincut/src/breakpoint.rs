//! Breakpoint accumulation and output packaging
//!
//! Breakpoints are emitted by the driver in ascending lambda order; each
//! carries the lambda upper bound of its interval and a deep copy of the
//! source-set indicator over all original nodes. Recursive interval
//! endpoints can be reported twice, so adjacent entries with equal lambda
//! are collapsed (keeping the first) before the list is handed out.

use serde::{Deserialize, Serialize};

/// One lambda interval with its optimal source set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Upper bound of the lambda interval this cut is optimal for
    pub lambda: f64,
    /// Source-side indicator over all original nodes (0/1)
    pub source_set: Vec<u8>,
}

/// Ordered collection of breakpoints for one solve
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreakpointList {
    num_nodes: usize,
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointList {
    /// Create an empty list for indicators of length `num_nodes`
    pub fn new(num_nodes: usize) -> Self {
        Self { num_nodes, breakpoints: Vec::new() }
    }

    /// Append a breakpoint, copying the caller's indicator buffer
    pub fn push(&mut self, lambda: f64, indicator: &[u8]) {
        debug_assert_eq!(indicator.len(), self.num_nodes);
        self.breakpoints.push(Breakpoint { lambda, source_set: indicator.to_vec() });
    }

    /// Drop every breakpoint whose lambda matches its predecessor's within
    /// `tolerance`, keeping the earlier entry
    pub fn dedup_adjacent(&mut self, tolerance: f64) {
        self.breakpoints.dedup_by(|next, kept| (next.lambda - kept.lambda).abs() <= tolerance);
    }

    /// Number of breakpoints
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// True when no breakpoint has been emitted
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Indicator length (number of original nodes)
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Breakpoint at position `index`, in emission order
    pub fn get(&self, index: usize) -> Option<&Breakpoint> {
        self.breakpoints.get(index)
    }

    /// Iterate breakpoints in emission order
    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    /// The lambda values, in emission order
    pub fn lambdas(&self) -> Vec<f64> {
        self.breakpoints.iter().map(|b| b.lambda).collect()
    }

    /// Flatten into a dense column-major `num_nodes x len()` indicator
    /// matrix: column `j` is breakpoint `j`, entry `j * num_nodes + i` is
    /// node `i`'s indicator.
    pub fn indicator_matrix(&self) -> Vec<u8> {
        let mut matrix = Vec::with_capacity(self.num_nodes * self.breakpoints.len());
        for breakpoint in &self.breakpoints {
            matrix.extend_from_slice(&breakpoint.source_set);
        }
        matrix
    }
}

impl IntoIterator for BreakpointList {
    type Item = Breakpoint;
    type IntoIter = std::vec::IntoIter<Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.breakpoints.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_copies_indicator() {
        let mut list = BreakpointList::new(3);
        let mut buffer = vec![1u8, 0, 0];
        list.push(1.0, &buffer);
        buffer[1] = 1; // caller reuses the buffer
        list.push(2.0, &buffer);

        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().source_set, vec![1, 0, 0]);
        assert_eq!(list.get(1).unwrap().source_set, vec![1, 1, 0]);
    }

    #[test]
    fn test_dedup_adjacent_keeps_first() {
        let mut list = BreakpointList::new(2);
        list.push(1.0, &[1, 0]);
        list.push(1.0, &[1, 1]);
        list.push(2.0, &[1, 1]);
        list.push(2.0 + 1e-12, &[0, 0]);

        list.dedup_adjacent(1e-8);

        assert_eq!(list.len(), 2);
        assert_eq!(list.lambdas(), vec![1.0, 2.0]);
        assert_eq!(list.get(0).unwrap().source_set, vec![1, 0]);
        assert_eq!(list.get(1).unwrap().source_set, vec![1, 1]);
    }

    #[test]
    fn test_dedup_single_entry() {
        let mut list = BreakpointList::new(1);
        list.push(0.7, &[1]);
        list.dedup_adjacent(1e-8);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_indicator_matrix_layout() {
        let mut list = BreakpointList::new(3);
        list.push(1.0, &[1, 0, 0]);
        list.push(2.0, &[1, 1, 0]);

        let matrix = list.indicator_matrix();
        assert_eq!(matrix.len(), 6);
        // column 0 then column 1
        assert_eq!(&matrix[0..3], &[1, 0, 0]);
        assert_eq!(&matrix[3..6], &[1, 1, 0]);
    }

    #[test]
    fn test_empty_list() {
        let list = BreakpointList::new(4);
        assert!(list.is_empty());
        assert!(list.lambdas().is_empty());
        assert!(list.indicator_matrix().is_empty());
    }
}
