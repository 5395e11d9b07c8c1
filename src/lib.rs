//! GRIT algebra: deterministic genomic interval algebra.
//!
//! This library provides merge, intersect, subtract, strand-aware expansion
//! and sweep-line coverage over collections of genomic intervals.
//!
//! # Features
//!
//! - **Lazy operations**: every operation returns a single-use iterator, so
//!   operations compose (`subtract(merge(a), b)`)
//! - **Immutable records**: transforms build new records, inputs are never
//!   modified
//! - **Case-insensitive chromosomes**: one comparator ([`chrom::compare`])
//!   drives every sort, group and overlap test
//! - **Per-chromosome parallelism**: optional Rayon fan-out that keeps the
//!   sequential output order
//!
//! # Example
//!
//! ```rust
//! use grit_algebra::prelude::*;
//!
//! let a = vec![
//!     Interval::new("chr1", 100, 200),
//!     Interval::new("chr1", 150, 300),
//! ];
//! let b = vec![Interval::new("chr1", 180, 220)];
//!
//! let merged = MergeCommand::new().merge(a);
//! let remaining: Vec<_> = SubtractCommand::new().subtract(merged, b).collect();
//!
//! assert_eq!(
//!     remaining,
//!     vec![Interval::new("chr1", 100, 180), Interval::new("chr1", 220, 300)]
//! );
//! ```

pub mod bed;
pub mod chrom;
pub mod commands;
pub mod config;
pub mod error;
pub mod genome;
pub mod interval;
pub mod parallel;

// Re-export commonly used types
pub use bed::{parse_records, read_records, BedReader, BedWriter};
pub use error::AlgebraError;
pub use interval::{BedRecord, GenomicRange, Interval, Strand};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{
        CoverageCommand, CoverageSample, ExpandCommand, IntersectCommand, IntersectMode,
        MergeCommand, SortCommand, SortOrder, SubtractCommand,
    };
    pub use crate::error::AlgebraError;
    pub use crate::interval::{BedRecord, GenomicRange, Interval, Strand};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_basic_workflow() {
        use crate::bed::parse_intervals;

        let content = "chr1\t100\t200\nchr1\t150\t250\nchr1\t300\t400\n";
        let intervals = parse_intervals(content).unwrap();

        let merged: Vec<_> = MergeCommand::new().merge(intervals).collect();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start, 100);
        assert_eq!(merged[0].end, 250);
    }

    #[test]
    fn test_record_pipeline() {
        use crate::bed::parse_records;

        let a = parse_records("chr1\t100\t200\tgeneA\t5\t-\nchr1\t150\t300\tgeneB\t9\t-\n").unwrap();
        let b = parse_records("chr1\t120\t130\n").unwrap();

        let expand = ExpandCommand::new(0, 50).unwrap();
        let merged = MergeCommand::new().merge(a);
        let expanded = expand.expand_all(merged);
        let out: Vec<_> = SubtractCommand::new().subtract(expanded, b).collect();

        // Minus strand: downstream extends the low side
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].start(), out[0].end()), (50, 120));
        assert_eq!((out[1].start(), out[1].end()), (130, 300));
        assert_eq!(out[0].name(), Some("geneA"));
    }
}
