//! Merge command implementation.
//!
//! Uses O(n log n) sort + O(n) single-pass sweep-line merge.
//!
//! Records are sorted by `(chrom, start)` only, then coalesced while
//! `next.start <= current.end + distance`. With the default distance of 0,
//! touching intervals (`next.start == current.end`) are merged.

use crate::chrom;
use crate::interval::GenomicRange;
use tracing::debug;

/// Merge command configuration.
#[derive(Debug, Clone, Default)]
pub struct MergeCommand {
    /// Maximum gap between intervals to merge (default: 0). Negative values
    /// require at least that many bases of overlap.
    pub distance: i64,
}

impl MergeCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum merge distance.
    pub fn with_distance(mut self, d: i64) -> Self {
        self.distance = d;
        self
    }

    /// Merge overlapping and touching records.
    ///
    /// The result is sorted, and no two records on the same chromosome overlap
    /// or touch. Each merged record keeps the non-coordinate fields of the
    /// first record of its run. Evaluation is deferred to the first `next`;
    /// the iterator is single-use.
    pub fn merge<I>(&self, records: I) -> Merged<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: GenomicRange,
    {
        Merged {
            source: Some(records.into_iter()),
            distance: self.distance,
            sorted: Vec::new().into_iter(),
            current: None,
        }
    }

    /// Check if `next` extends the run ending at `current_end`.
    #[inline]
    fn should_merge<T: GenomicRange>(
        distance: i64,
        current: &T,
        current_end: i64,
        next: &T,
    ) -> bool {
        chrom::same(current.chrom(), next.chrom())
            && next.start() <= current_end.saturating_add(distance)
    }
}

/// Iterator returned by [`MergeCommand::merge`].
pub struct Merged<I: Iterator> {
    source: Option<I>,
    distance: i64,
    sorted: std::vec::IntoIter<I::Item>,
    current: Option<I::Item>,
}

impl<I> Iterator for Merged<I>
where
    I: Iterator,
    I::Item: GenomicRange,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(source) = self.source.take() {
            let mut records: Vec<I::Item> = source.collect();
            debug!(records = records.len(), distance = self.distance, "merging");
            records.sort_by(|a, b| {
                chrom::compare(a.chrom(), b.chrom()).then(a.start().cmp(&b.start()))
            });
            self.sorted = records.into_iter();
            self.current = self.sorted.next();
        }

        let current = self.current.take()?;
        let mut current_end = current.end();

        for next in self.sorted.by_ref() {
            if MergeCommand::should_merge(self.distance, &current, current_end, &next) {
                current_end = current_end.max(next.end());
            } else {
                self.current = Some(next);
                break;
            }
        }

        if current_end == current.end() {
            Some(current)
        } else {
            Some(current.with_span(current.start(), current_end))
        }
    }
}
