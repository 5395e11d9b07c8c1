//! Subtract command implementation.
//!
//! Uses the same chromosome grouping and per-record scan as intersect. Each A
//! record starts as a single fragment; every overlapping B splits the
//! fragments it touches and drops the covered middle. Surviving fragments are
//! emitted in coordinate order, each carrying A's other fields.

use crate::interval::GenomicRange;
use crate::parallel::ChromGroups;
use std::collections::VecDeque;

/// Subtract command configuration.
#[derive(Debug, Clone, Default)]
pub struct SubtractCommand {
    /// Remove entire A feature if any overlap (like bedtools -A)
    pub remove_entire: bool,
}

impl SubtractCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remove_entire(mut self, remove_entire: bool) -> Self {
        self.remove_entire = remove_entire;
        self
    }

    /// Subtract B from every record of A.
    ///
    /// B is grouped immediately; A is consumed lazily and the output follows
    /// A's order. The iterator is single-use.
    pub fn subtract<A, B, T>(&self, a: A, b: B) -> Subtracted<A::IntoIter, T>
    where
        A: IntoIterator<Item = T>,
        B: IntoIterator<Item = T>,
        T: GenomicRange,
    {
        Subtracted {
            a: a.into_iter(),
            b: ChromGroups::from_records(b),
            remove_entire: self.remove_entire,
            pending: VecDeque::new(),
        }
    }

    /// Push the fragments of a single A record onto `out`.
    pub(crate) fn subtract_record<T: GenomicRange>(
        remove_entire: bool,
        a: T,
        group: Option<&[T]>,
        out: &mut VecDeque<T>,
    ) {
        let Some(group) = group else {
            out.push_back(a);
            return;
        };

        let (a_start, a_end) = (a.start(), a.end());
        let mut fragments: Vec<(i64, i64)> = vec![(a_start, a_end)];
        let mut next: Vec<(i64, i64)> = Vec::new();
        let mut overlapped = false;

        for b in group {
            let (b_start, b_end) = (b.start(), b.end());
            if b_start >= a_end {
                break;
            }
            if b_end <= a_start {
                continue;
            }
            if remove_entire {
                return;
            }
            overlapped = true;

            next.clear();
            for &(s, e) in &fragments {
                if b_end <= s || b_start >= e {
                    next.push((s, e));
                    continue;
                }
                if b_start > s {
                    next.push((s, b_start));
                }
                if b_end < e {
                    next.push((b_end, e));
                }
            }
            std::mem::swap(&mut fragments, &mut next);
        }

        if !overlapped {
            out.push_back(a);
            return;
        }
        out.extend(fragments.into_iter().map(|(s, e)| a.with_span(s, e)));
    }
}

/// Iterator returned by [`SubtractCommand::subtract`].
pub struct Subtracted<I, T> {
    a: I,
    b: ChromGroups<T>,
    remove_entire: bool,
    pending: VecDeque<T>,
}

impl<I, T> Iterator for Subtracted<I, T>
where
    I: Iterator<Item = T>,
    T: GenomicRange,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Some(fragment);
            }
            let a = self.a.next()?;
            let group = self.b.get(a.chrom());
            SubtractCommand::subtract_record(self.remove_entire, a, group, &mut self.pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{BedRecord, Interval, Strand};

    fn subtract(a: Vec<Interval>, b: Vec<Interval>) -> Vec<Interval> {
        SubtractCommand::new().subtract(a, b).collect()
    }

    #[test]
    fn test_subtract_middle() {
        let pieces = subtract(
            vec![Interval::new("chr1", 100, 300)],
            vec![Interval::new("chr1", 150, 200)],
        );
        assert_eq!(
            pieces,
            vec![Interval::new("chr1", 100, 150), Interval::new("chr1", 200, 300)]
        );
    }

    #[test]
    fn test_subtract_no_overlap() {
        let pieces = subtract(
            vec![Interval::new("chr1", 100, 200)],
            vec![Interval::new("chr1", 300, 400), Interval::new("chr1", 200, 250)],
        );
        assert_eq!(pieces, vec![Interval::new("chr1", 100, 200)]);
    }

    #[test]
    fn test_subtract_complete_removal() {
        let pieces = subtract(
            vec![Interval::new("chr1", 100, 200)],
            vec![Interval::new("chr1", 50, 250)],
        );
        assert!(pieces.is_empty());
    }

    #[test]
    fn test_subtract_multiple_b() {
        let pieces = subtract(
            vec![Interval::new("chr1", 0, 100)],
            vec![
                Interval::new("chr1", 60, 70),
                Interval::new("chr1", 10, 20),
                Interval::new("chr1", 15, 30),
                Interval::new("chr1", 90, 120),
            ],
        );
        assert_eq!(
            pieces,
            vec![
                Interval::new("chr1", 0, 10),
                Interval::new("chr1", 30, 60),
                Interval::new("chr1", 70, 90),
            ]
        );
    }

    #[test]
    fn test_subtract_missing_chrom_passes_through() {
        let pieces = subtract(
            vec![Interval::new("chrX", 5, 10)],
            vec![Interval::new("chr1", 0, 100)],
        );
        assert_eq!(pieces, vec![Interval::new("chrX", 5, 10)]);
    }

    #[test]
    fn test_subtract_case_insensitive() {
        let pieces = subtract(
            vec![Interval::new("chr1", 100, 300)],
            vec![Interval::new("CHR1", 100, 200)],
        );
        assert_eq!(pieces, vec![Interval::new("chr1", 200, 300)]);
    }

    #[test]
    fn test_subtract_copies_fields() {
        let a = vec![BedRecord::new("chr1", 100, 300)
            .with_name(Some("gene".to_string()))
            .with_strand(Some(Strand::Minus))];
        let b = vec![BedRecord::new("chr1", 150, 200).with_name(Some("hole".to_string()))];

        let pieces: Vec<_> = SubtractCommand::new().subtract(a, b).collect();
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            assert_eq!(piece.name(), Some("gene"));
            assert_eq!(piece.strand(), Some(Strand::Minus));
        }
    }

    #[test]
    fn test_subtract_remove_entire() {
        let pieces: Vec<_> = SubtractCommand::new()
            .with_remove_entire(true)
            .subtract(
                vec![Interval::new("chr1", 100, 300), Interval::new("chr1", 400, 500)],
                vec![Interval::new("chr1", 150, 160)],
            )
            .collect();
        assert_eq!(pieces, vec![Interval::new("chr1", 400, 500)]);
    }

    #[test]
    fn test_subtract_preserves_a_order() {
        let pieces = subtract(
            vec![Interval::new("chr2", 0, 10), Interval::new("chr1", 0, 10)],
            vec![Interval::new("chr1", 5, 6)],
        );
        assert_eq!(
            pieces,
            vec![
                Interval::new("chr2", 0, 10),
                Interval::new("chr1", 0, 5),
                Interval::new("chr1", 6, 10),
            ]
        );
    }
}
