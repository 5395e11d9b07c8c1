//! Core interval types for genomic region representation.
//!
//! Records are immutable values: every transform builds a new record through
//! the `with_*` methods, which copy all fields except the ones overridden.

use crate::chrom;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Lowest score a BED record may carry.
pub const MIN_SCORE: i64 = 0;
/// Highest score a BED record may carry.
pub const MAX_SCORE: i64 = 1000;

/// Anything the algebra can operate on: a chromosome plus a half-open range.
///
/// Coordinates are signed. `start > end` is not rejected anywhere; such a
/// range simply has a negative length and flows through the arithmetic.
pub trait GenomicRange: Clone {
    fn chrom(&self) -> &str;
    fn start(&self) -> i64;
    fn end(&self) -> i64;

    /// Strand, if the type carries one.
    #[inline]
    fn strand(&self) -> Option<Strand> {
        None
    }

    /// Copy of `self` with new coordinates and every other field unchanged.
    fn with_span(&self, start: i64, end: i64) -> Self;

    /// Build the record reported for the overlap `[start, end)` of `self`
    /// (left side) and `other` (right side).
    ///
    /// The default keeps the left side's fields.
    #[inline]
    fn overlap_with(&self, _other: &Self, start: i64, end: i64) -> Self {
        self.with_span(start, end)
    }

    /// Signed length, negative when `start > end`.
    #[inline]
    fn span(&self) -> i64 {
        self.end() - self.start()
    }
}

/// Canonical `(chrom, start, end)` ordering shared by sort and merge output.
#[inline]
pub fn coordinate_order<T: GenomicRange>(a: &T, b: &T) -> Ordering {
    chrom::compare(a.chrom(), b.chrom())
        .then(a.start().cmp(&b.start()))
        .then(a.end().cmp(&b.end()))
}

/// A genomic interval with chromosome, start, and end positions.
/// Uses 0-based, half-open coordinates (BED format).
///
/// Equality and hashing treat `chrom` case-insensitively, matching `Ord`.
#[derive(Debug, Clone)]
pub struct Interval {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Create a new interval.
    #[inline]
    pub fn new(chrom: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    /// Returns the length of the interval, or 0 if it is inverted.
    #[inline]
    pub fn len(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    /// Returns true if the interval covers no base.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this interval overlaps with another.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        chrom::same(&self.chrom, &other.chrom) && self.start < other.end && other.start < self.end
    }

    /// Compute the overlap length with another interval.
    #[inline]
    pub fn overlap_length(&self, other: &Interval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        self.end.min(other.end) - self.start.max(other.start)
    }
}

impl GenomicRange for Interval {
    #[inline]
    fn chrom(&self) -> &str {
        &self.chrom
    }

    #[inline]
    fn start(&self) -> i64 {
        self.start
    }

    #[inline]
    fn end(&self) -> i64 {
        self.end
    }

    #[inline]
    fn with_span(&self, start: i64, end: i64) -> Self {
        Self {
            chrom: self.chrom.clone(),
            start,
            end,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        coordinate_order(self, other)
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && chrom::same(&self.chrom, &other.chrom)
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        chrom::hash_label(&self.chrom, state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

/// Strand orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A BED record with all optional fields.
///
/// Fields are read through accessors and replaced through the consuming
/// `with_*` builders, so a record handed to an operation is never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    interval: Interval,
    name: Option<String>,
    score: Option<i64>,
    strand: Option<Strand>,
    thick_start: Option<i64>,
    thick_end: Option<i64>,
    item_rgb: Option<String>,
    block_count: Option<i64>,
    block_sizes: Option<Vec<i64>>,
    block_starts: Option<Vec<i64>>,
    /// Additional fields beyond BED12
    extra_fields: Vec<String>,
}

impl BedRecord {
    /// Create a minimal BED3 record.
    pub fn new(chrom: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            interval: Interval::new(chrom, start, end),
            name: None,
            score: None,
            strand: None,
            thick_start: None,
            thick_end: None,
            item_rgb: None,
            block_count: None,
            block_sizes: None,
            block_starts: None,
            extra_fields: Vec::new(),
        }
    }

    #[inline]
    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn score(&self) -> Option<i64> {
        self.score
    }

    #[inline]
    pub fn thick_start(&self) -> Option<i64> {
        self.thick_start
    }

    #[inline]
    pub fn thick_end(&self) -> Option<i64> {
        self.thick_end
    }

    #[inline]
    pub fn item_rgb(&self) -> Option<&str> {
        self.item_rgb.as_deref()
    }

    #[inline]
    pub fn block_count(&self) -> Option<i64> {
        self.block_count
    }

    #[inline]
    pub fn block_sizes(&self) -> Option<&[i64]> {
        self.block_sizes.as_deref()
    }

    #[inline]
    pub fn block_starts(&self) -> Option<&[i64]> {
        self.block_starts.as_deref()
    }

    #[inline]
    pub fn extra_fields(&self) -> &[String] {
        &self.extra_fields
    }

    /// Get the interval length (0 for inverted intervals).
    #[inline]
    pub fn len(&self) -> i64 {
        self.interval.len()
    }

    /// Check if the interval covers no base.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interval.is_empty()
    }

    pub fn with_chrom(mut self, chrom: impl Into<String>) -> Self {
        self.interval.chrom = chrom.into();
        self
    }

    pub fn with_coords(mut self, start: i64, end: i64) -> Self {
        self.interval.start = start;
        self.interval.end = end;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Set the score, clamped to `[MIN_SCORE, MAX_SCORE]`.
    pub fn with_score(mut self, score: Option<i64>) -> Self {
        self.score = score.map(|s| s.clamp(MIN_SCORE, MAX_SCORE));
        self
    }

    pub fn with_strand(mut self, strand: Option<Strand>) -> Self {
        self.strand = strand;
        self
    }

    pub fn with_thick(mut self, thick_start: Option<i64>, thick_end: Option<i64>) -> Self {
        self.thick_start = thick_start;
        self.thick_end = thick_end;
        self
    }

    pub fn with_item_rgb(mut self, item_rgb: Option<String>) -> Self {
        self.item_rgb = item_rgb;
        self
    }

    /// Set the block structure. Consistency is not checked here; see
    /// [`BedRecord::has_blocks`].
    pub fn with_blocks(
        mut self,
        block_count: Option<i64>,
        block_sizes: Option<Vec<i64>>,
        block_starts: Option<Vec<i64>>,
    ) -> Self {
        self.block_count = block_count;
        self.block_sizes = block_sizes;
        self.block_starts = block_starts;
        self
    }

    pub fn with_extra_fields(mut self, extra_fields: Vec<String>) -> Self {
        self.extra_fields = extra_fields;
        self
    }

    /// True only when count, sizes and starts are all present and agree.
    pub fn has_blocks(&self) -> bool {
        match (self.block_count, &self.block_sizes, &self.block_starts) {
            (Some(count), Some(sizes), Some(starts)) => {
                usize::try_from(count).is_ok_and(|n| n == sizes.len() && n == starts.len())
            }
            _ => false,
        }
    }

    /// Absolute block intervals (exons), or `None` if the record has no
    /// consistent block structure.
    pub fn blocks(&self) -> Option<Vec<Interval>> {
        if !self.has_blocks() {
            return None;
        }
        let sizes = self.block_sizes.as_deref()?;
        let starts = self.block_starts.as_deref()?;
        Some(
            starts
                .iter()
                .zip(sizes)
                .map(|(&offset, &size)| {
                    let block_start = self.interval.start + offset;
                    Interval::new(self.interval.chrom.clone(), block_start, block_start + size)
                })
                .collect(),
        )
    }
}

impl GenomicRange for BedRecord {
    #[inline]
    fn chrom(&self) -> &str {
        &self.interval.chrom
    }

    #[inline]
    fn start(&self) -> i64 {
        self.interval.start
    }

    #[inline]
    fn end(&self) -> i64 {
        self.interval.end
    }

    #[inline]
    fn strand(&self) -> Option<Strand> {
        self.strand
    }

    #[inline]
    fn with_span(&self, start: i64, end: i64) -> Self {
        self.clone().with_coords(start, end)
    }

    /// Name, score and strand come from `self` when present, otherwise from
    /// `other`. Everything else is copied from `self`.
    fn overlap_with(&self, other: &Self, start: i64, end: i64) -> Self {
        let name = self.name.clone().or_else(|| other.name.clone());
        let score = self.score.or(other.score);
        let strand = self.strand.or(other.strand);
        self.with_span(start, end)
            .with_name(name)
            .with_score(score)
            .with_strand(strand)
    }
}

impl From<Interval> for BedRecord {
    fn from(interval: Interval) -> Self {
        BedRecord::new(interval.chrom, interval.start, interval.end)
    }
}

impl fmt::Display for BedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.interval)?;
        if let Some(ref name) = self.name {
            write!(f, "\t{}", name)?;
            if let Some(score) = self.score {
                write!(f, "\t{}", score)?;
                if let Some(strand) = self.strand {
                    write!(f, "\t{}", strand)?;
                }
            }
        }
        Ok(())
    }
}
