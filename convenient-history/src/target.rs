//! Recorded result of one build step.

use crate::source::SourceHistory;
use crate::timestamp::Timestamp;

/// The configuration, output and inputs of one successfully built file.
///
/// Source order is kept as recorded but does not take part in equality.
#[derive(Debug, Clone)]
pub struct TargetHistory {
    configuration: String,
    output: String,
    output_last_modified: Timestamp,
    sources: Vec<SourceHistory>,
}

impl TargetHistory {
    /// Create a target record.
    pub fn new(
        configuration: impl Into<String>,
        output: impl Into<String>,
        output_last_modified: Timestamp,
        sources: Vec<SourceHistory>,
    ) -> Self {
        Self {
            configuration: configuration.into(),
            output: output.into(),
            output_last_modified,
            sources,
        }
    }

    /// Signature of the toolchain invocation that produced the output.
    #[must_use]
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Output file name relative to the output directory.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Output modification time right after it was built.
    #[must_use]
    pub fn output_last_modified(&self) -> Timestamp {
        self.output_last_modified
    }

    /// Inputs in recording order.
    #[must_use]
    pub fn sources(&self) -> &[SourceHistory] {
        &self.sources
    }
}

impl PartialEq for TargetHistory {
    fn eq(&self, other: &Self) -> bool {
        if self.configuration != other.configuration
            || self.output != other.output
            || self.output_last_modified != other.output_last_modified
            || self.sources.len() != other.sources.len()
        {
            return false;
        }
        let mut mine: Vec<&SourceHistory> = self.sources.iter().collect();
        let mut theirs: Vec<&SourceHistory> = other.sources.iter().collect();
        mine.sort();
        theirs.sort();
        mine == theirs
    }
}

impl Eq for TargetHistory {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sources: Vec<SourceHistory>) -> TargetHistory {
        TargetHistory::new("gcc -O2", "foo.o", Timestamp::from_millis(100), sources)
    }

    #[test]
    fn test_source_order_does_not_matter() {
        let a = SourceHistory::new("../foo.c", Timestamp::from_millis(1));
        let b = SourceHistory::new("../foo.h", Timestamp::from_millis(2));

        assert_eq!(
            record(vec![a.clone(), b.clone()]),
            record(vec![b.clone(), a.clone()])
        );
        assert_ne!(record(vec![a.clone(), b]), record(vec![a.clone(), a]));
    }

    #[test]
    fn test_configuration_is_part_of_identity() {
        let lhs = TargetHistory::new("gcc -O2", "foo.o", Timestamp::from_millis(1), vec![]);
        let rhs = TargetHistory::new("gcc -O0", "foo.o", Timestamp::from_millis(1), vec![]);
        assert_ne!(lhs, rhs);
        assert_eq!(lhs.configuration(), "gcc -O2");
        assert_eq!(lhs.output(), "foo.o");
        assert!(lhs.sources().is_empty());
    }
}
