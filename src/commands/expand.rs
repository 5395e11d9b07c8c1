//! Expand command implementation.
//!
//! Extends intervals by a fixed number of bases upstream and downstream.
//! Upstream is the low-coordinate side, except on the minus strand where it
//! is the high-coordinate side. Start is clamped at 0; end is not bounded
//! here (use [`crate::genome::Genome::clip`] to keep records on-chromosome).

use crate::error::{AlgebraError, Result, Side};
use crate::interval::{GenomicRange, Strand};

/// Expand command configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandCommand {
    upstream: i64,
    downstream: i64,
}

impl ExpandCommand {
    /// Build an expander. Both amounts must be non-negative.
    pub fn new(upstream: i64, downstream: i64) -> Result<Self> {
        if upstream < 0 {
            return Err(AlgebraError::NegativeExtension {
                side: Side::Upstream,
                amount: upstream,
            });
        }
        if downstream < 0 {
            return Err(AlgebraError::NegativeExtension {
                side: Side::Downstream,
                amount: downstream,
            });
        }
        Ok(Self {
            upstream,
            downstream,
        })
    }

    /// Same amount on both sides.
    pub fn both(amount: i64) -> Result<Self> {
        Self::new(amount, amount)
    }

    pub fn upstream(&self) -> i64 {
        self.upstream
    }

    pub fn downstream(&self) -> i64 {
        self.downstream
    }

    /// Expand a single record, returning a new one.
    #[inline]
    pub fn expand<T: GenomicRange>(&self, record: &T) -> T {
        // (low side, high side)
        let (left, right) = match record.strand() {
            Some(Strand::Minus) => (self.downstream, self.upstream),
            _ => (self.upstream, self.downstream),
        };

        let new_start = record.start().saturating_sub(left).max(0);
        let new_end = record.end().saturating_add(right);
        record.with_span(new_start, new_end)
    }

    /// Lazily expand every record.
    pub fn expand_all<I>(&self, records: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
        I::Item: GenomicRange,
    {
        let command = *self;
        records.into_iter().map(move |r| command.expand(&r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{BedRecord, Interval};

    fn stranded(start: i64, end: i64, strand: Option<Strand>) -> BedRecord {
        BedRecord::new("chr1", start, end).with_strand(strand)
    }

    #[test]
    fn test_expand_plus_strand() {
        let cmd = ExpandCommand::new(10, 20).unwrap();
        let rec = cmd.expand(&stranded(100, 200, Some(Strand::Plus)));

        assert_eq!(rec.start(), 90);
        assert_eq!(rec.end(), 220);
    }

    #[test]
    fn test_expand_minus_strand() {
        let cmd = ExpandCommand::new(10, 20).unwrap();
        let rec = cmd.expand(&stranded(100, 200, Some(Strand::Minus)));

        // Upstream is the high-coordinate side on the minus strand
        assert_eq!(rec.start(), 80);
        assert_eq!(rec.end(), 210);
        assert_eq!(rec.strand(), Some(Strand::Minus));
    }

    #[test]
    fn test_expand_unknown_and_unset_strand() {
        let cmd = ExpandCommand::new(10, 20).unwrap();

        let dot = cmd.expand(&stranded(100, 200, Some(Strand::Unknown)));
        assert_eq!((dot.start(), dot.end()), (90, 220));

        let unset = cmd.expand(&stranded(100, 200, None));
        assert_eq!((unset.start(), unset.end()), (90, 220));

        let plain = cmd.expand(&Interval::new("chr1", 100, 200));
        assert_eq!((plain.start, plain.end), (90, 220));
    }

    #[test]
    fn test_expand_clamps_start_only() {
        let cmd = ExpandCommand::both(100).unwrap();
        let rec = cmd.expand(&stranded(50, 150, None));

        assert_eq!(rec.start(), 0);
        assert_eq!(rec.end(), 250);
    }

    #[test]
    fn test_expand_does_not_mutate_input() {
        let cmd = ExpandCommand::both(5).unwrap();
        let original = stranded(100, 200, None);
        let _ = cmd.expand(&original);
        assert_eq!((original.start(), original.end()), (100, 200));
    }

    #[test]
    fn test_expand_rejects_negative() {
        assert_eq!(
            ExpandCommand::new(-1, 0),
            Err(AlgebraError::NegativeExtension {
                side: Side::Upstream,
                amount: -1
            })
        );
        assert!(matches!(
            ExpandCommand::new(0, -5),
            Err(AlgebraError::NegativeExtension {
                side: Side::Downstream,
                ..
            })
        ));
    }

    #[test]
    fn test_expand_all() {
        let cmd = ExpandCommand::new(1, 2).unwrap();
        let out: Vec<_> = cmd
            .expand_all(vec![
                stranded(10, 20, Some(Strand::Plus)),
                stranded(10, 20, Some(Strand::Minus)),
            ])
            .map(|r| (r.start(), r.end()))
            .collect();
        assert_eq!(out, vec![(9, 22), (8, 21)]);
    }
}
