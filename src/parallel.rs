//! Chromosome grouping and parallel processing utilities using Rayon.
//!
//! Intersect and subtract only ever compare records on the same chromosome,
//! so work on one chromosome is independent of every other. The parallel
//! entry points here fan A out per chromosome and then put results back in
//! A's original order, so they return exactly what the sequential iterators
//! produce.

use crate::chrom::ChromKey;
use crate::commands::{IntersectCommand, SubtractCommand};
use crate::interval::{coordinate_order, GenomicRange};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::debug;

/// Minimum number of records before enabling parallelization.
/// Below this threshold, sequential processing is faster due to
/// thread spawn overhead.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Records grouped by chromosome, each group sorted by start.
#[derive(Debug, Clone)]
pub struct ChromGroups<T> {
    groups: FxHashMap<ChromKey, Vec<T>>,
}

impl<T: GenomicRange> ChromGroups<T> {
    /// Group records by case-insensitive chromosome and stable-sort each
    /// group by start.
    pub fn from_records<I: IntoIterator<Item = T>>(records: I) -> Self {
        let groups = group_by_chromosome(records);
        let groups = groups
            .into_iter()
            .map(|(chrom, mut list)| {
                list.sort_by_key(|r| r.start());
                (chrom, list)
            })
            .collect::<FxHashMap<_, _>>();
        debug!(chromosomes = groups.len(), "grouped records");
        Self { groups }
    }

    /// The sorted group for `chrom`, if any record was on it.
    #[inline]
    pub fn get(&self, chrom: &str) -> Option<&[T]> {
        self.groups.get(&ChromKey::from(chrom)).map(Vec::as_slice)
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of records across all groups.
    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Group records by chromosome, keeping input order within each group.
pub fn group_by_chromosome<T, I>(records: I) -> FxHashMap<ChromKey, Vec<T>>
where
    T: GenomicRange,
    I: IntoIterator<Item = T>,
{
    let mut groups: FxHashMap<ChromKey, Vec<T>> = FxHashMap::default();

    for record in records {
        groups
            .entry(ChromKey::from(record.chrom()))
            .or_default()
            .push(record);
    }

    groups
}

/// Parallel stable sort by `(chrom, start, end)`.
pub fn parallel_sort<T: GenomicRange + Send>(mut records: Vec<T>) -> Vec<T> {
    records.par_sort_by(coordinate_order);
    records
}

/// Run `per_record` over A with one rayon task per chromosome, then restore
/// A's order.
fn fan_out<T, F>(a: Vec<T>, b: Vec<T>, per_record: F) -> Vec<T>
where
    T: GenomicRange + Send + Sync,
    F: Fn(T, Option<&[T]>, &mut VecDeque<T>) + Sync,
{
    let b_groups = ChromGroups::from_records(b);

    let mut a_groups: FxHashMap<ChromKey, Vec<(usize, T)>> = FxHashMap::default();
    for (idx, rec) in a.into_iter().enumerate() {
        a_groups
            .entry(ChromKey::from(rec.chrom()))
            .or_default()
            .push((idx, rec));
    }
    debug!(
        chromosomes = a_groups.len(),
        b_records = b_groups.record_count(),
        "parallel fan-out"
    );

    let mut results: Vec<(usize, VecDeque<T>)> = a_groups
        .into_par_iter()
        .flat_map_iter(|(chrom, list)| {
            let group = b_groups.get(chrom.as_str());
            list.into_iter()
                .map(|(idx, rec)| {
                    let mut out = VecDeque::new();
                    per_record(rec, group, &mut out);
                    (idx, out)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    results.par_sort_unstable_by_key(|(idx, _)| *idx);
    results.into_iter().flat_map(|(_, out)| out).collect()
}

/// Intersect in parallel by chromosome. Output order matches
/// [`IntersectCommand::intersect`].
pub fn intersect_parallel<T>(cmd: &IntersectCommand, a: Vec<T>, b: Vec<T>) -> Vec<T>
where
    T: GenomicRange + Send + Sync,
{
    if a.len() + b.len() < PARALLEL_THRESHOLD {
        return cmd.intersect(a, b).collect();
    }
    let mode = cmd.mode;
    fan_out(a, b, |rec, group, out| {
        IntersectCommand::intersect_record(mode, rec, group, out)
    })
}

/// Subtract in parallel by chromosome. Output order matches
/// [`SubtractCommand::subtract`].
pub fn subtract_parallel<T>(cmd: &SubtractCommand, a: Vec<T>, b: Vec<T>) -> Vec<T>
where
    T: GenomicRange + Send + Sync,
{
    if a.len() + b.len() < PARALLEL_THRESHOLD {
        return cmd.subtract(a, b).collect();
    }
    let remove_entire = cmd.remove_entire;
    fan_out(a, b, |rec, group, out| {
        SubtractCommand::subtract_record(remove_entire, rec, group, out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    /// Enough records to cross the parallel threshold.
    fn many(chroms: &[&str], per_chrom: i64, step: i64, len: i64) -> Vec<Interval> {
        let mut out = Vec::new();
        for i in 0..per_chrom {
            for chrom in chroms {
                out.push(Interval::new(*chrom, i * step, i * step + len));
            }
        }
        out
    }

    #[test]
    fn test_group_by_chromosome() {
        let intervals = vec![
            Interval::new("chr1", 100, 200),
            Interval::new("chr2", 100, 200),
            Interval::new("CHR1", 300, 400),
        ];

        let groups = group_by_chromosome(intervals);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get(&ChromKey::from("chr1")).unwrap().len(), 2);
        assert_eq!(groups.get(&ChromKey::from("chr2")).unwrap().len(), 1);
    }

    #[test]
    fn test_chrom_groups_sorted_by_start() {
        let groups = ChromGroups::from_records(vec![
            Interval::new("chr1", 300, 400),
            Interval::new("chr1", 100, 200),
            Interval::new("Chr1", 200, 250),
        ]);

        let starts: Vec<_> = groups.get("CHR1").unwrap().iter().map(|i| i.start).collect();
        assert_eq!(starts, vec![100, 200, 300]);
        assert!(groups.get("chr2").is_none());
        assert_eq!(groups.record_count(), 3);
    }

    #[test]
    fn test_parallel_sort() {
        let intervals = vec![
            Interval::new("chr2", 100, 200),
            Interval::new("chr1", 300, 400),
            Interval::new("chr1", 100, 200),
        ];

        let sorted = parallel_sort(intervals);

        assert_eq!(sorted[0].chrom, "chr1");
        assert_eq!(sorted[0].start, 100);
        assert_eq!(sorted[1].start, 300);
        assert_eq!(sorted[2].chrom, "chr2");
    }

    #[test]
    fn test_intersect_parallel_matches_sequential() {
        let mut a = many(&["chr3", "chr1", "chr2"], 3000, 100, 60);
        a.reverse();
        let b = many(&["chr1", "chr2"], 3000, 100, 30);

        let cmd = IntersectCommand::new();
        let sequential: Vec<_> = cmd.intersect(a.clone(), b.clone()).collect();
        let parallel = intersect_parallel(&cmd, a, b);

        assert!(!sequential.is_empty());
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_subtract_parallel_matches_sequential() {
        let mut a = many(&["chr1", "chr2", "chrX"], 3000, 100, 60);
        a.reverse();
        let b = many(&["chr1", "chrX"], 3000, 100, 30);

        let cmd = SubtractCommand::new();
        let sequential: Vec<_> = cmd.subtract(a.clone(), b.clone()).collect();
        let parallel = subtract_parallel(&cmd, a, b);

        assert_eq!(parallel, sequential);
    }
}
