//! Coverage command implementation.
//!
//! Computes a run-length-encoded depth profile over a query window with an
//! event-based sweep-line: O(n log n) for sorting events, O(n) for the sweep.
//!
//! Each interval overlapping the window contributes `(+1, clipped_start)` and
//! `(-1, clipped_end)`. Events are sorted by position, then by delta, so at a
//! shared position ends are applied before starts and abutting intervals never
//! count twice at the boundary.

use crate::chrom;
use crate::error::{AlgebraError, Result};
use crate::interval::GenomicRange;
use std::collections::BTreeMap;
use tracing::debug;

/// Depth holds from `position` up to the next sample's position (or the end
/// of the query window for the last sample).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageSample {
    pub position: i64,
    pub depth: i64,
}

impl CoverageSample {
    pub fn new(position: i64, depth: i64) -> Self {
        Self { position, depth }
    }
}

/// A half-open run `[start, end)` at constant depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRun {
    pub start: i64,
    pub end: i64,
    pub depth: i64,
}

impl DepthRun {
    #[inline]
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Coverage command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageCommand {
    query_start: i64,
    query_end: i64,
    chrom: Option<String>,
}

impl CoverageCommand {
    /// Build a scanner for `[query_start, query_end)`.
    ///
    /// A window ending before it starts is rejected. An empty window is
    /// allowed and yields no samples.
    pub fn new(query_start: i64, query_end: i64) -> Result<Self> {
        if query_end < query_start {
            return Err(AlgebraError::InvalidWindow {
                start: query_start,
                end: query_end,
            });
        }
        Ok(Self {
            query_start,
            query_end,
            chrom: None,
        })
    }

    /// Only count records on `chrom` (case-insensitive). Without this every
    /// record is assumed to be on the queried chromosome.
    pub fn with_chrom(mut self, chrom: impl Into<String>) -> Self {
        self.chrom = Some(chrom.into());
        self
    }

    pub fn query_start(&self) -> i64 {
        self.query_start
    }

    pub fn query_end(&self) -> i64 {
        self.query_end
    }

    /// Scan `records` and lazily produce the depth profile of the window.
    ///
    /// Records are read on the first call to `next`. The iterator is
    /// single-use.
    pub fn scan<I>(&self, records: I) -> CoverageScan<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: GenomicRange,
    {
        CoverageScan {
            source: Some(records.into_iter()),
            chrom: self.chrom.clone(),
            query_start: self.query_start,
            query_end: self.query_end,
            events: Vec::new().into_iter(),
            depth: 0,
            last_pos: self.query_start,
            finished: false,
        }
    }
}

/// Iterator returned by [`CoverageCommand::scan`].
pub struct CoverageScan<I> {
    source: Option<I>,
    chrom: Option<String>,
    query_start: i64,
    query_end: i64,
    /// (position, delta)
    events: std::vec::IntoIter<(i64, i64)>,
    depth: i64,
    last_pos: i64,
    finished: bool,
}

impl<I> CoverageScan<I>
where
    I: Iterator,
    I::Item: GenomicRange,
{
    fn build_events(&self, source: I) -> Vec<(i64, i64)> {
        let (qs, qe) = (self.query_start, self.query_end);
        let mut events = Vec::new();

        for rec in source {
            if let Some(ref chrom) = self.chrom {
                if !chrom::same(chrom, rec.chrom()) {
                    continue;
                }
            }
            if rec.start() < qe && rec.end() > qs {
                events.push((rec.start().max(qs), 1));
                events.push((rec.end().min(qe), -1));
            }
        }

        // Tuple order is (position asc, delta asc): -1 before +1.
        events.sort_unstable();
        events
    }
}

impl<I> Iterator for CoverageScan<I>
where
    I: Iterator,
    I::Item: GenomicRange,
{
    type Item = CoverageSample;

    fn next(&mut self) -> Option<CoverageSample> {
        if let Some(source) = self.source.take() {
            let events = self.build_events(source);
            debug!(
                events = events.len(),
                start = self.query_start,
                end = self.query_end,
                "coverage sweep"
            );
            self.events = events.into_iter();
        }

        for (pos, delta) in self.events.by_ref() {
            let sample = if pos > self.last_pos {
                let sample = CoverageSample::new(self.last_pos, self.depth);
                self.last_pos = pos;
                Some(sample)
            } else {
                None
            };
            self.depth += delta;
            if sample.is_some() {
                return sample;
            }
        }

        if self.finished {
            return None;
        }
        self.finished = true;
        (self.last_pos < self.query_end).then(|| CoverageSample::new(self.last_pos, self.depth))
    }
}

/// Turn samples into explicit runs ending at the next sample (or at
/// `query_end`), merging neighbours of equal depth.
pub fn depth_runs<I>(samples: I, query_end: i64) -> Vec<DepthRun>
where
    I: IntoIterator<Item = CoverageSample>,
{
    let mut runs: Vec<DepthRun> = Vec::new();
    let mut samples = samples.into_iter().peekable();

    while let Some(sample) = samples.next() {
        let end = samples.peek().map_or(query_end, |next| next.position);
        match runs.last_mut() {
            Some(last) if last.depth == sample.depth && last.end == sample.position => {
                last.end = end;
            }
            _ => runs.push(DepthRun {
                start: sample.position,
                end,
                depth: sample.depth,
            }),
        }
    }

    runs
}

/// Bases covered at each depth.
pub fn histogram(runs: &[DepthRun]) -> BTreeMap<i64, i64> {
    let mut hist = BTreeMap::new();
    for run in runs {
        *hist.entry(run.depth).or_insert(0) += run.len();
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    fn scan(intervals: Vec<Interval>, start: i64, end: i64) -> Vec<(i64, i64)> {
        CoverageCommand::new(start, end)
            .unwrap()
            .scan(intervals)
            .map(|s| (s.position, s.depth))
            .collect()
    }

    #[test]
    fn test_coverage_overlapping() {
        let samples = scan(
            vec![Interval::new("chr1", 100, 200), Interval::new("chr1", 150, 250)],
            100,
            250,
        );
        assert_eq!(samples, vec![(100, 1), (150, 2), (200, 1)]);
    }

    #[test]
    fn test_coverage_abutting_no_double_count() {
        let samples = scan(
            vec![Interval::new("chr1", 100, 200), Interval::new("chr1", 200, 300)],
            100,
            300,
        );
        // The end at 200 is applied before the start at 200
        assert_eq!(samples, vec![(100, 1), (200, 1)]);
        assert!(samples.iter().all(|&(_, depth)| depth <= 1));
    }

    #[test]
    fn test_coverage_gaps_and_edges() {
        let samples = scan(vec![Interval::new("chr1", 120, 130)], 100, 200);
        assert_eq!(samples, vec![(100, 0), (120, 1), (130, 0)]);
    }

    #[test]
    fn test_coverage_clips_to_window() {
        let samples = scan(
            vec![Interval::new("chr1", 0, 1000), Interval::new("chr1", 2000, 3000)],
            500,
            600,
        );
        assert_eq!(samples, vec![(500, 1)]);
    }

    #[test]
    fn test_coverage_no_intervals() {
        assert_eq!(scan(Vec::new(), 10, 20), vec![(10, 0)]);
    }

    #[test]
    fn test_coverage_empty_window() {
        assert!(scan(vec![Interval::new("chr1", 0, 100)], 50, 50).is_empty());
    }

    #[test]
    fn test_coverage_invalid_window() {
        assert_eq!(
            CoverageCommand::new(200, 100),
            Err(AlgebraError::InvalidWindow {
                start: 200,
                end: 100
            })
        );
    }

    #[test]
    fn test_coverage_chrom_filter() {
        let samples: Vec<_> = CoverageCommand::new(0, 100)
            .unwrap()
            .with_chrom("chr1")
            .scan(vec![
                Interval::new("CHR1", 10, 20),
                Interval::new("chr2", 0, 100),
            ])
            .map(|s| (s.position, s.depth))
            .collect();
        assert_eq!(samples, vec![(0, 0), (10, 1), (20, 0)]);
    }

    #[test]
    fn test_depth_runs_coalesce() {
        let samples = vec![
            CoverageSample::new(0, 1),
            CoverageSample::new(10, 1),
            CoverageSample::new(20, 2),
        ];
        let runs = depth_runs(samples, 30);
        assert_eq!(
            runs,
            vec![
                DepthRun {
                    start: 0,
                    end: 20,
                    depth: 1
                },
                DepthRun {
                    start: 20,
                    end: 30,
                    depth: 2
                },
            ]
        );
    }

    #[test]
    fn test_histogram() {
        let cmd = CoverageCommand::new(100, 250).unwrap();
        let samples = cmd.scan(vec![
            Interval::new("chr1", 100, 200),
            Interval::new("chr1", 150, 250),
        ]);
        let hist = histogram(&depth_runs(samples, cmd.query_end()));

        assert_eq!(hist.get(&1), Some(&100));
        assert_eq!(hist.get(&2), Some(&50));
    }
}
