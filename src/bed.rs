//! Streaming BED reader and writer.
//!
//! This is the text collaborator around the algebra: it turns BED lines into
//! [`BedRecord`] values and back. The algebra modules never touch it.

use crate::config::accepts_coordinates;
use crate::error::AlgebraError;
use crate::interval::{BedRecord, GenomicRange, Interval, Strand};
use memchr::memchr_iter;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading, writing or processing BED data.
#[derive(Error, Debug)]
pub enum BedError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid BED format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}

pub type Result<T> = std::result::Result<T, BedError>;

/// Split a line on tabs using memchr.
#[inline]
fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(12);
    let mut last = 0;
    for tab in memchr_iter(b'\t', bytes) {
        fields.push(&line[last..tab]);
        last = tab + 1;
    }
    fields.push(&line[last..]);
    fields
}

/// `.` marks a missing text column.
#[inline]
fn optional_text(field: &str) -> Option<String> {
    if field.is_empty() || field == "." {
        None
    } else {
        Some(field.to_string())
    }
}

/// Scores are integers in BED, but real files carry floats too.
#[inline]
fn parse_score(field: &str) -> Option<i64> {
    field
        .parse::<i64>()
        .ok()
        .or_else(|| field.parse::<f64>().ok().map(|f| f.round() as i64))
}

fn parse_list(field: &str) -> Vec<i64> {
    field
        .split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// A streaming BED file reader.
pub struct BedReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl BedReader<File> {
    /// Open a BED file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> BedReader<R> {
    /// Create a new BED reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(1024),
        }
    }

    /// Read the next BED record.
    pub fn read_record(&mut self) -> Result<Option<BedRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            // Skip empty lines and headers
            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    /// Parse a single BED line.
    fn parse_line(&self, line: &str) -> Result<BedRecord> {
        let fields = split_fields(line);

        if fields.len() < 3 {
            return Err(BedError::Parse {
                line: self.line_number,
                message: format!("Expected at least 3 fields, got {}", fields.len()),
            });
        }

        let start = self.parse_position(fields[1], "start")?;
        let end = self.parse_position(fields[2], "end")?;

        if !accepts_coordinates(start, end) {
            return Err(BedError::Parse {
                line: self.line_number,
                message: format!("Start ({}) > end ({})", start, end),
            });
        }

        let mut record = BedRecord::new(fields[0], start, end);
        let field = |i: usize| fields.get(i).copied();

        if let Some(name) = field(3) {
            record = record.with_name(optional_text(name));
        }
        if let Some(score) = field(4) {
            record = record.with_score(parse_score(score));
        }
        if let Some(strand) = field(5) {
            record = record.with_strand(strand.chars().next().map(Strand::from_char));
        }
        if fields.len() > 6 {
            let thick_start = field(6).and_then(|s| s.parse().ok());
            let thick_end = field(7).and_then(|s| s.parse().ok());
            record = record.with_thick(thick_start, thick_end);
        }
        if let Some(rgb) = field(8) {
            record = record.with_item_rgb(optional_text(rgb));
        }
        if fields.len() > 9 {
            record = record.with_blocks(
                field(9).and_then(|s| s.parse().ok()),
                field(10).map(parse_list),
                field(11).map(parse_list),
            );
        }
        if fields.len() > 12 {
            record = record.with_extra_fields(fields[12..].iter().map(|s| s.to_string()).collect());
        }

        Ok(record)
    }

    fn parse_position(&self, s: &str, field_name: &str) -> Result<i64> {
        s.trim().parse().map_err(|_| BedError::Parse {
            line: self.line_number,
            message: format!("Invalid {} position: '{}'", field_name, s),
        })
    }

    /// Get an iterator over all records.
    pub fn records(self) -> BedRecordIter<R> {
        BedRecordIter { reader: self }
    }
}

/// Iterator over BED records.
pub struct BedRecordIter<R: Read> {
    reader: BedReader<R>,
}

impl<R: Read> Iterator for BedRecordIter<R> {
    type Item = Result<BedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all BED records from a file.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<BedRecord>> {
    let reader = BedReader::from_path(path)?;
    reader.records().collect()
}

/// Read all BED records from any reader.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<BedRecord>> {
    BedReader::new(reader).records().collect()
}

/// Parse BED records from a string (useful for testing).
pub fn parse_records(content: &str) -> Result<Vec<BedRecord>> {
    read_records_from(content.as_bytes())
}

/// Parse intervals from a string, dropping every annotation column.
pub fn parse_intervals(content: &str) -> Result<Vec<Interval>> {
    BedReader::new(content.as_bytes())
        .records()
        .map(|r| r.map(|rec| rec.interval().clone()))
        .collect()
}

/// Buffer size for BedWriter.
const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// Buffered BED writer formatting integers with itoa.
///
/// Columns are written up to the last field the record actually carries.
/// Missing columns before that point get BED placeholders: `.` for text and
/// strand, `0` for score and block count, the record's own start/end for the
/// thick range.
pub struct BedWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
}

impl<W: Write> BedWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, output),
            itoa_buf: itoa::Buffer::new(),
        }
    }

    #[inline]
    fn write_int(&mut self, n: i64) -> Result<()> {
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())?;
        Ok(())
    }

    #[inline]
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(b"\t")?;
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    #[inline]
    fn write_tab_int(&mut self, n: i64) -> Result<()> {
        self.writer.write_all(b"\t")?;
        self.write_int(n)
    }

    fn write_list(&mut self, values: Option<&[i64]>) -> Result<()> {
        self.writer.write_all(b"\t")?;
        for v in values.unwrap_or(&[]) {
            self.write_int(*v)?;
            self.writer.write_all(b",")?;
        }
        Ok(())
    }

    /// Write chrom, start and end without a newline.
    pub fn write_bed3(&mut self, chrom: &str, start: i64, end: i64) -> Result<()> {
        self.writer.write_all(chrom.as_bytes())?;
        self.write_tab_int(start)?;
        self.write_tab_int(end)
    }

    /// Write any range as a BED3 line.
    pub fn write_range<T: GenomicRange>(&mut self, range: &T) -> Result<()> {
        self.write_bed3(range.chrom(), range.start(), range.end())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write a full BED record line.
    pub fn write_record(&mut self, rec: &BedRecord) -> Result<()> {
        let columns = column_count(rec);
        self.write_bed3(rec.chrom(), rec.start(), rec.end())?;

        if columns > 3 {
            self.write_text(rec.name().unwrap_or("."))?;
        }
        if columns > 4 {
            self.write_tab_int(rec.score().unwrap_or(0))?;
        }
        if columns > 5 {
            let strand = rec.strand().unwrap_or(Strand::Unknown);
            self.writer.write_all(&[b'\t', strand.as_char() as u8])?;
        }
        if columns > 6 {
            self.write_tab_int(rec.thick_start().unwrap_or(rec.start()))?;
            self.write_tab_int(rec.thick_end().unwrap_or(rec.end()))?;
        }
        if columns > 8 {
            self.write_text(rec.item_rgb().unwrap_or("."))?;
        }
        if columns > 9 {
            self.write_tab_int(rec.block_count().unwrap_or(0))?;
            self.write_list(rec.block_sizes())?;
            self.write_list(rec.block_starts())?;
        }
        for extra in rec.extra_fields() {
            self.write_text(extra)?;
        }

        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write a raw line followed by a newline.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Number of BED columns needed to carry every field present on `rec`.
fn column_count(rec: &BedRecord) -> usize {
    if !rec.extra_fields().is_empty()
        || rec.block_count().is_some()
        || rec.block_sizes().is_some()
        || rec.block_starts().is_some()
    {
        12
    } else if rec.item_rgb().is_some() {
        9
    } else if rec.thick_start().is_some() || rec.thick_end().is_some() {
        8
    } else if rec.strand().is_some() {
        6
    } else if rec.score().is_some() {
        5
    } else if rec.name().is_some() {
        4
    } else {
        3
    }
}

/// Write BED records to a writer.
pub fn write_records<'a, W, I>(writer: W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a BedRecord>,
{
    let mut out = BedWriter::new(writer);
    for record in records {
        out.write_record(record)?;
    }
    out.flush()
}
