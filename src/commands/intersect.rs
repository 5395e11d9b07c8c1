//! Intersect command implementation.
//!
//! B is grouped by chromosome and each group sorted by start. Every A record
//! is then scanned against its group from the beginning: the scan stops at the
//! first B starting at or after A's end and skips B records ending at or
//! before A's start. There is no cursor shared between A records, so A may be
//! in any order and the output follows A's order. The cost is
//! O(|A| x |B_chrom|) in the worst case.

use crate::interval::GenomicRange;
use crate::parallel::ChromGroups;
use std::collections::VecDeque;

/// What to report for each A record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntersectMode {
    /// Report the overlapping portion for every overlapping B (default)
    #[default]
    Overlap,
    /// Report each A once, unchanged, if it overlaps any B (-u)
    Unique,
    /// Report each A, unchanged, only if it overlaps no B (-v)
    NoOverlap,
}

/// Intersect command configuration.
#[derive(Debug, Clone, Default)]
pub struct IntersectCommand {
    pub mode: IntersectMode,
}

impl IntersectCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: IntersectMode) -> Self {
        self.mode = mode;
        self
    }

    /// Intersect A against B.
    ///
    /// B is grouped immediately; A is consumed one record at a time as the
    /// returned iterator is advanced. The iterator is single-use.
    pub fn intersect<A, B, T>(&self, a: A, b: B) -> Intersected<A::IntoIter, T>
    where
        A: IntoIterator<Item = T>,
        B: IntoIterator<Item = T>,
        T: GenomicRange,
    {
        Intersected {
            a: a.into_iter(),
            b: ChromGroups::from_records(b),
            mode: self.mode,
            pending: VecDeque::new(),
        }
    }

    /// Push the output for a single A record onto `out`.
    ///
    /// `group` is the start-sorted B group for A's chromosome, if any.
    pub(crate) fn intersect_record<T: GenomicRange>(
        mode: IntersectMode,
        a: T,
        group: Option<&[T]>,
        out: &mut VecDeque<T>,
    ) {
        let Some(group) = group else {
            if mode == IntersectMode::NoOverlap {
                out.push_back(a);
            }
            return;
        };

        let (a_start, a_end) = (a.start(), a.end());
        for b in group {
            if b.start() >= a_end {
                break;
            }
            if b.end() <= a_start {
                continue;
            }
            match mode {
                IntersectMode::Overlap => {
                    let start = a_start.max(b.start());
                    let end = a_end.min(b.end());
                    out.push_back(a.overlap_with(b, start, end));
                }
                IntersectMode::Unique => {
                    out.push_back(a);
                    return;
                }
                IntersectMode::NoOverlap => return,
            }
        }

        if mode == IntersectMode::NoOverlap {
            out.push_back(a);
        }
    }
}

/// Iterator returned by [`IntersectCommand::intersect`].
pub struct Intersected<I, T> {
    a: I,
    b: ChromGroups<T>,
    mode: IntersectMode,
    pending: VecDeque<T>,
}

impl<I, T> Iterator for Intersected<I, T>
where
    I: Iterator<Item = T>,
    T: GenomicRange,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(hit) = self.pending.pop_front() {
                return Some(hit);
            }
            let a = self.a.next()?;
            let group = self.b.get(a.chrom());
            IntersectCommand::intersect_record(self.mode, a, group, &mut self.pending);
        }
    }
}
