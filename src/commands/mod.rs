//! Interval algebra operations.
//!
//! Each command is a small configuration struct whose operation returns a
//! lazy, single-use iterator over new records. Inputs are never modified.

pub mod coverage;
pub mod expand;
pub mod intersect;
pub mod merge;
pub mod sort;
pub mod subtract;

pub use coverage::{depth_runs, histogram, CoverageCommand, CoverageSample, DepthRun};
pub use expand::ExpandCommand;
pub use intersect::{IntersectCommand, IntersectMode};
pub use merge::MergeCommand;
pub use sort::{SortCommand, SortOrder};
pub use subtract::SubtractCommand;
