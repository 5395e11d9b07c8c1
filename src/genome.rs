//! Genome file parser for chromosome sizes.
//!
//! Parses .genome files (tab-delimited: chrom\tsize). Lookups use the shared
//! case-insensitive chromosome key, so `chr1` in a BED file finds `Chr1` here.

use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::bed::BedError;
use crate::chrom::ChromKey;
use crate::interval::GenomicRange;

/// Genome information containing chromosome sizes.
/// Preserves chromosome order from input file.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    sizes: FxHashMap<ChromKey, i64>,
    order: Vec<String>,
}

impl Genome {
    /// Create an empty genome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load genome from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BedError> {
        Self::from_reader(File::open(path)?)
    }

    /// Load genome from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BedError> {
        let mut genome = Self::new();

        for (line_num, line_result) in BufReader::new(reader).lines().enumerate() {
            let line = line_result?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                return Err(BedError::Parse {
                    line: line_num + 1,
                    message: "Genome file requires two columns: chrom and size".to_string(),
                });
            }

            let size: i64 = fields[1]
                .parse()
                .ok()
                .filter(|s| *s >= 0)
                .ok_or_else(|| BedError::Parse {
                    line: line_num + 1,
                    message: format!("Invalid chromosome size: {}", fields[1]),
                })?;

            genome.insert(fields[0].to_string(), size);
        }

        Ok(genome)
    }

    /// Get the size of a chromosome.
    #[inline]
    pub fn chrom_size(&self, chrom: &str) -> Option<i64> {
        self.sizes.get(&ChromKey::from(chrom)).copied()
    }

    /// Check if a chromosome exists.
    #[inline]
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.sizes.contains_key(&ChromKey::from(chrom))
    }

    /// Get all chromosome names in file order.
    pub fn chromosomes(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Insert a chromosome size (appends to order if new).
    pub fn insert(&mut self, chrom: String, size: i64) {
        let key = ChromKey::new(chrom.clone());
        if !self.sizes.contains_key(&key) {
            self.order.push(chrom);
        }
        self.sizes.insert(key, size);
    }

    /// Clip a range to its chromosome: start is raised to 0 and end lowered
    /// to the chromosome size.
    ///
    /// Returns `None` for chromosomes missing from the genome and for ranges
    /// that cover no base after clipping.
    pub fn clip<T: GenomicRange>(&self, range: &T) -> Option<T> {
        let size = self.chrom_size(range.chrom())?;
        let start = range.start().max(0);
        let end = range.end().min(size);
        (start < end).then(|| range.with_span(start, end))
    }
}
