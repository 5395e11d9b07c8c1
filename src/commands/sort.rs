//! Sort command implementation.
//!
//! Default order is `(chrom, start, end)` with chromosomes compared
//! case-insensitively through [`crate::chrom::compare`]. The sort is stable,
//! so records equal on all keys keep their input order.

use crate::interval::{coordinate_order, GenomicRange};
use std::cmp::Ordering;

/// Sort key specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Sort by chromosome, start, end (default)
    #[default]
    Coordinate,
    /// Sort by size (ascending), ties by coordinate
    SizeAsc,
    /// Sort by size (descending), ties by coordinate
    SizeDesc,
}

/// Sort command configuration.
#[derive(Debug, Clone, Default)]
pub struct SortCommand {
    pub order: SortOrder,
    /// Reverse the final order
    pub reverse: bool,
}

impl SortCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Comparator for the configured order.
    pub fn compare<T: GenomicRange>(&self, a: &T, b: &T) -> Ordering {
        let ord = match self.order {
            SortOrder::Coordinate => coordinate_order(a, b),
            SortOrder::SizeAsc => a.span().cmp(&b.span()).then_with(|| coordinate_order(a, b)),
            SortOrder::SizeDesc => b.span().cmp(&a.span()).then_with(|| coordinate_order(a, b)),
        };
        if self.reverse {
            ord.reverse()
        } else {
            ord
        }
    }

    /// Sort records in place.
    pub fn sort_vec<T: GenomicRange>(&self, records: &mut [T]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    /// Lazily sort a collection of records.
    ///
    /// Nothing is read from `records` until the first call to `next`. The
    /// returned iterator is single-use.
    pub fn sort<I>(&self, records: I) -> Sorted<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: GenomicRange,
    {
        Sorted {
            source: Some(records.into_iter()),
            command: self.clone(),
            sorted: Vec::new().into_iter(),
        }
    }
}

/// Iterator returned by [`SortCommand::sort`].
pub struct Sorted<I: Iterator> {
    source: Option<I>,
    command: SortCommand,
    sorted: std::vec::IntoIter<I::Item>,
}

impl<I> Iterator for Sorted<I>
where
    I: Iterator,
    I::Item: GenomicRange,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(source) = self.source.take() {
            let mut records: Vec<I::Item> = source.collect();
            self.command.sort_vec(&mut records);
            self.sorted = records.into_iter();
        }
        self.sorted.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{BedRecord, Interval};

    fn coords(records: &[Interval]) -> Vec<(&str, i64, i64)> {
        records
            .iter()
            .map(|r| (r.chrom.as_str(), r.start, r.end))
            .collect()
    }

    #[test]
    fn test_sort_coordinate() {
        let intervals = vec![
            Interval::new("chr2", 100, 200),
            Interval::new("chr1", 300, 400),
            Interval::new("chr1", 100, 300),
            Interval::new("chr1", 100, 200),
        ];

        let sorted: Vec<_> = SortCommand::new().sort(intervals).collect();
        assert_eq!(
            coords(&sorted),
            vec![
                ("chr1", 100, 200),
                ("chr1", 100, 300),
                ("chr1", 300, 400),
                ("chr2", 100, 200)
            ]
        );
    }

    #[test]
    fn test_sort_mixed_case_chromosomes() {
        let intervals = vec![
            Interval::new("chr2", 1, 2),
            Interval::new("CHR1", 50, 60),
            Interval::new("chr1", 10, 20),
        ];

        let sorted: Vec<_> = SortCommand::new().sort(intervals).collect();
        assert_eq!(
            coords(&sorted),
            vec![("chr1", 10, 20), ("CHR1", 50, 60), ("chr2", 1, 2)]
        );
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let records = vec![
            BedRecord::new("chr1", 1, 5).with_name(Some("first".to_string())),
            BedRecord::new("chr1", 1, 5).with_name(Some("second".to_string())),
        ];

        let sorted: Vec<_> = SortCommand::new().sort(records).collect();
        assert_eq!(sorted[0].name(), Some("first"));
        assert_eq!(sorted[1].name(), Some("second"));
    }

    #[test]
    fn test_sort_by_size() {
        let intervals = vec![
            Interval::new("chr1", 0, 50),
            Interval::new("chr1", 0, 10),
            Interval::new("chr1", 0, 30),
        ];

        let asc: Vec<_> = SortCommand::new()
            .with_order(SortOrder::SizeAsc)
            .sort(intervals.clone())
            .map(|i| i.end)
            .collect();
        assert_eq!(asc, vec![10, 30, 50]);

        let desc: Vec<_> = SortCommand::new()
            .with_order(SortOrder::SizeDesc)
            .sort(intervals)
            .map(|i| i.end)
            .collect();
        assert_eq!(desc, vec![50, 30, 10]);
    }

    #[test]
    fn test_sort_reverse() {
        let intervals = vec![Interval::new("chr1", 1, 2), Interval::new("chr2", 1, 2)];
        let sorted: Vec<_> = SortCommand::new().with_reverse(true).sort(intervals).collect();
        assert_eq!(sorted[0].chrom, "chr2");
    }

    #[test]
    fn test_sort_empty() {
        let sorted: Vec<Interval> = SortCommand::new().sort(Vec::new()).collect();
        assert!(sorted.is_empty());
    }
}
