//! Per-iteration history of the best distance found so far.

use serde::{Deserialize, Serialize};

/// Append-only record of the best tour length after each iteration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConvergenceTrace {
    values: Vec<f64>,
}

impl ConvergenceTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ConvergenceTrace {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// First iteration (1-based) at which the final value was reached
    pub fn iteration_of_best(&self) -> Option<usize> {
        let best = self.last()?;
        self.values.iter().position(|&v| v == best).map(|i| i + 1)
    }

    /// True if no entry is larger than its predecessor
    pub fn is_non_increasing(&self) -> bool {
        self.values.windows(2).all(|w| w[1] <= w[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut trace = ConvergenceTrace::new();
        trace.append(10.0);
        trace.append(8.5);
        trace.append(8.5);

        assert_eq!(trace.as_slice(), &[10.0, 8.5, 8.5]);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.last(), Some(8.5));
        assert_eq!(trace.iteration_of_best(), Some(2));
        assert!(trace.is_non_increasing());
    }

    #[test]
    fn test_detects_increase() {
        let mut trace = ConvergenceTrace::new();
        trace.append(4.0);
        trace.append(5.0);
        assert!(!trace.is_non_increasing());
    }

    #[test]
    fn test_serializes_as_plain_sequence() {
        let mut trace = ConvergenceTrace::new();
        trace.append(1.5);
        trace.append(1.25);
        assert_eq!(serde_json::to_string(&trace).unwrap(), "[1.5,1.25]");
    }
}
