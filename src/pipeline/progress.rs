//! Progress events emitted while a pipeline runs.

use std::time::Duration;

/// A progress update event.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineProgress {
    /// Application has started.
    Started {
        /// Number of filters in the pipeline
        total_filters: usize,
    },
    /// A filter is about to run.
    FilterStarted {
        /// Position in the pipeline
        index: usize,
        /// Filter name
        name: &'static str,
        /// Number of filters in the pipeline
        total: usize,
    },
    /// A filter has produced its output.
    FilterCompleted {
        /// Position in the pipeline
        index: usize,
        /// Filter name
        name: &'static str,
        /// Time spent in this filter
        duration: Duration,
    },
    /// Every filter has run.
    Completed {
        /// Number of filters that ran
        filters_applied: usize,
        /// Wall time for the whole pipeline
        total_duration: Duration,
    },
}

impl PipelineProgress {
    /// Fraction of the pipeline finished once this event has been observed.
    pub fn fraction(&self, total_filters: usize) -> f32 {
        if total_filters == 0 {
            return 1.0;
        }
        match self {
            PipelineProgress::Started { .. } => 0.0,
            PipelineProgress::FilterStarted { index, .. } => *index as f32 / total_filters as f32,
            PipelineProgress::FilterCompleted { index, .. } => {
                (*index + 1) as f32 / total_filters as f32
            }
            PipelineProgress::Completed { .. } => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let done = PipelineProgress::FilterCompleted {
            index: 1,
            name: "EdgeDetection",
            duration: Duration::ZERO,
        };
        assert_eq!(done.fraction(4), 0.5);
        assert_eq!(PipelineProgress::Started { total_filters: 0 }.fraction(0), 1.0);
        assert_eq!(PipelineProgress::Started { total_filters: 3 }.fraction(3), 0.0);
    }
}
