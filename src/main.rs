//! GRIT algebra: genomic interval algebra on BED files
//!
//! Usage: grit-algebra <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grit_algebra::bed::{read_records_from, BedError, BedWriter};
use grit_algebra::commands::{
    depth_runs, histogram, CoverageCommand, ExpandCommand, IntersectCommand, IntersectMode,
    MergeCommand, SortCommand, SortOrder, SubtractCommand,
};
use grit_algebra::genome::Genome;
use grit_algebra::interval::{BedRecord, Interval};
use grit_algebra::parallel::{intersect_parallel, subtract_parallel};

#[derive(Parser)]
#[command(name = "grit-algebra")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "GRIT algebra: merge, intersect, subtract, expand and coverage over BED intervals", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Reject BED lines whose start is greater than their end. By default
    /// such lines are accepted as negative-length intervals.
    #[arg(long, global = true)]
    strict: bool,

    /// Log filter used when RUST_LOG is not set (e.g. "debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort a BED file by chromosome and position
    Sort {
        /// Input BED file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Sort by interval size (ascending)
        #[arg(long = "sizeA")]
        size_asc: bool,

        /// Sort by interval size (descending)
        #[arg(long = "sizeD", conflicts_with = "size_asc")]
        size_desc: bool,

        /// Reverse the sort order
        #[arg(short, long)]
        reverse: bool,
    },

    /// Merge overlapping and touching intervals
    Merge {
        /// Input BED file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Maximum distance between intervals to merge (negative requires overlap)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        distance: i64,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Report the overlapping portions of A and B
    Intersect {
        /// Input BED file A
        #[arg(short = 'a', long)]
        file_a: PathBuf,

        /// Input BED file B
        #[arg(short = 'b', long)]
        file_b: PathBuf,

        /// Only report unique A intervals
        #[arg(short = 'u', long)]
        unique: bool,

        /// Only report A intervals with NO overlap
        #[arg(short = 'v', long, conflicts_with = "unique")]
        no_overlap: bool,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Remove the portions of A covered by B
    Subtract {
        /// Input BED file A
        #[arg(short = 'a', long)]
        file_a: PathBuf,

        /// Input BED file B
        #[arg(short = 'b', long)]
        file_b: PathBuf,

        /// Remove entire A feature if any overlap
        #[arg(short = 'A', long)]
        remove_entire: bool,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Extend intervals upstream/downstream relative to their strand
    Expand {
        /// Input BED file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Bases to add on both sides
        #[arg(short, long, allow_negative_numbers = true)]
        both: Option<i64>,

        /// Bases to add upstream (overrides --both)
        #[arg(short, long, allow_negative_numbers = true)]
        upstream: Option<i64>,

        /// Bases to add downstream (overrides --both)
        #[arg(short, long, allow_negative_numbers = true)]
        downstream: Option<i64>,

        /// Genome file; results are clipped to chromosome sizes
        #[arg(short = 'g', long)]
        genome: Option<PathBuf>,
    },

    /// Depth profile of one chromosome window
    Coverage {
        /// Input BED file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Chromosome to profile
        #[arg(short, long)]
        chrom: String,

        /// Window start (0-based, inclusive)
        #[arg(short, long, allow_negative_numbers = true)]
        start: i64,

        /// Window end (exclusive)
        #[arg(short, long, allow_negative_numbers = true)]
        end: i64,

        /// Report runs as BedGraph (chrom, start, end, depth)
        #[arg(long)]
        bedgraph: bool,

        /// Report a depth histogram (chrom, depth, bases, window size, fraction)
        #[arg(long, conflicts_with = "bedgraph")]
        hist: bool,

        /// Count BED12 blocks instead of whole intervals
        #[arg(long)]
        split: bool,
    },
}

/// Record counts reported by `--stats`.
#[derive(Debug, Default)]
struct RunStats {
    input_a: usize,
    input_b: Option<usize>,
    output: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input_a={}", self.input_a)?;
        if let Some(b) = self.input_b {
            write!(f, " input_b={}", b)?;
        }
        write!(f, " output={}", self.output)
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // This must be set before any parsing occurs
    if cli.strict {
        grit_algebra::config::set_strict_coordinates(true);
    }

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            tracing::warn!("Failed to initialize thread pool: {}", e);
        }
    }

    let result = match cli.command {
        Commands::Sort {
            input,
            size_asc,
            size_desc,
            reverse,
        } => run_sort(input, size_asc, size_desc, reverse),

        Commands::Merge {
            input,
            distance,
            stats,
        } => run_merge(input, distance, stats),

        Commands::Intersect {
            file_a,
            file_b,
            unique,
            no_overlap,
            stats,
        } => run_intersect(file_a, file_b, unique, no_overlap, stats),

        Commands::Subtract {
            file_a,
            file_b,
            remove_entire,
            stats,
        } => run_subtract(file_a, file_b, remove_entire, stats),

        Commands::Expand {
            input,
            both,
            upstream,
            downstream,
            genome,
        } => run_expand(input, both, upstream, downstream, genome),

        Commands::Coverage {
            input,
            chrom,
            start,
            end,
            bedgraph,
            hist,
            split,
        } => run_coverage(input, chrom, start, end, bedgraph, hist, split),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Read all records from a path, or stdin for `-` / no path.
fn load_records(input: Option<&PathBuf>) -> Result<Vec<BedRecord>, BedError> {
    match input {
        Some(path) if path.to_string_lossy() != "-" => {
            tracing::debug!(path = %path.display(), "reading BED file");
            read_records_from(File::open(path)?)
        }
        _ => {
            let stdin = io::stdin();
            read_records_from(stdin.lock())
        }
    }
}

/// Write every record, returning how many were written.
fn write_all<I>(records: I) -> Result<usize, BedError>
where
    I: IntoIterator<Item = BedRecord>,
{
    let stdout = io::stdout();
    let mut writer = BedWriter::new(stdout.lock());
    let mut count = 0;
    for record in records {
        writer.write_record(&record)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

fn run_sort(
    input: Option<PathBuf>,
    size_asc: bool,
    size_desc: bool,
    reverse: bool,
) -> Result<(), BedError> {
    let order = if size_asc {
        SortOrder::SizeAsc
    } else if size_desc {
        SortOrder::SizeDesc
    } else {
        SortOrder::Coordinate
    };

    let records = load_records(input.as_ref())?;
    let cmd = SortCommand::new().with_order(order).with_reverse(reverse);
    write_all(cmd.sort(records))?;
    Ok(())
}

fn run_merge(input: Option<PathBuf>, distance: i64, stats: bool) -> Result<(), BedError> {
    let records = load_records(input.as_ref())?;
    let mut run_stats = RunStats {
        input_a: records.len(),
        ..Default::default()
    };

    let cmd = MergeCommand::new().with_distance(distance);
    run_stats.output = write_all(cmd.merge(records))?;

    if stats {
        eprintln!("Merge stats: {}", run_stats);
    }
    Ok(())
}

fn run_intersect(
    file_a: PathBuf,
    file_b: PathBuf,
    unique: bool,
    no_overlap: bool,
    stats: bool,
) -> Result<(), BedError> {
    let mode = if unique {
        IntersectMode::Unique
    } else if no_overlap {
        IntersectMode::NoOverlap
    } else {
        IntersectMode::Overlap
    };

    let a = load_records(Some(&file_a))?;
    let b = load_records(Some(&file_b))?;
    let mut run_stats = RunStats {
        input_a: a.len(),
        input_b: Some(b.len()),
        ..Default::default()
    };

    let cmd = IntersectCommand::new().with_mode(mode);
    run_stats.output = write_all(intersect_parallel(&cmd, a, b))?;

    if stats {
        eprintln!("Intersect stats: {}", run_stats);
    }
    Ok(())
}

fn run_subtract(
    file_a: PathBuf,
    file_b: PathBuf,
    remove_entire: bool,
    stats: bool,
) -> Result<(), BedError> {
    let a = load_records(Some(&file_a))?;
    let b = load_records(Some(&file_b))?;
    let mut run_stats = RunStats {
        input_a: a.len(),
        input_b: Some(b.len()),
        ..Default::default()
    };

    let cmd = SubtractCommand::new().with_remove_entire(remove_entire);
    run_stats.output = write_all(subtract_parallel(&cmd, a, b))?;

    if stats {
        eprintln!("Subtract stats: {}", run_stats);
    }
    Ok(())
}

fn run_expand(
    input: Option<PathBuf>,
    both: Option<i64>,
    upstream: Option<i64>,
    downstream: Option<i64>,
    genome_file: Option<PathBuf>,
) -> Result<(), BedError> {
    let both = both.unwrap_or(0);
    // Validate before reading any input
    let cmd = ExpandCommand::new(upstream.unwrap_or(both), downstream.unwrap_or(both))?;
    let genome = genome_file.map(Genome::from_file).transpose()?;

    let records = load_records(input.as_ref())?;
    let expanded = cmd.expand_all(records);

    match genome {
        Some(genome) => write_all(expanded.filter_map(|r| genome.clip(&r)))?,
        None => write_all(expanded)?,
    };
    Ok(())
}

fn run_coverage(
    input: Option<PathBuf>,
    chrom: String,
    start: i64,
    end: i64,
    bedgraph: bool,
    hist: bool,
    split: bool,
) -> Result<(), BedError> {
    // Validate before reading any input
    let cmd = CoverageCommand::new(start, end)?.with_chrom(chrom.clone());

    let records = load_records(input.as_ref())?;
    let intervals: Vec<Interval> = if split {
        records
            .iter()
            .flat_map(|r| r.blocks().unwrap_or_else(|| vec![r.interval().clone()]))
            .collect()
    } else {
        records.iter().map(|r| r.interval().clone()).collect()
    };

    let stdout = io::stdout();
    let mut writer = BedWriter::new(stdout.lock());
    let samples = cmd.scan(intervals);

    if bedgraph {
        for run in depth_runs(samples, cmd.query_end()) {
            writer.write_bed3(&chrom, run.start, run.end)?;
            writer.write_line(&format!("\t{}", run.depth))?;
        }
    } else if hist {
        let window = cmd.query_end() - cmd.query_start();
        for (depth, bases) in histogram(&depth_runs(samples, cmd.query_end())) {
            let fraction = if window > 0 {
                bases as f64 / window as f64
            } else {
                0.0
            };
            writer.write_line(&format!(
                "{}\t{}\t{}\t{}\t{:.6}",
                chrom, depth, bases, window, fraction
            ))?;
        }
    } else {
        for sample in samples {
            writer.write_line(&format!("{}\t{}\t{}", chrom, sample.position, sample.depth))?;
        }
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["grit-algebra", "merge", "-i", "a.bed", "-d", "-5"]).unwrap();
        match cli.command {
            Commands::Merge { distance, .. } => assert_eq!(distance, -5),
            _ => panic!("expected merge"),
        }
    }

    #[test]
    fn test_cli_conflicting_modes() {
        let result = Cli::try_parse_from([
            "grit-algebra",
            "intersect",
            "-a",
            "a.bed",
            "-b",
            "b.bed",
            "-u",
            "-v",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_display() {
        let stats = RunStats {
            input_a: 3,
            input_b: Some(2),
            output: 1,
        };
        assert_eq!(stats.to_string(), "input_a=3 input_b=2 output=1");
    }
}
