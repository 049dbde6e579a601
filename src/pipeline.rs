use crate::alignment;
use crate::annotation;
use crate::bam_input::{self, BamInput};
use crate::error::{NmdError, Result};
use crate::introns::{self, IntronKey, IntronRegistry};
use crate::report;
use rust_htslib::bam::Read as HtsRead;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads below this mapping quality are treated as non-unique.
pub const DEFAULT_MIN_MAPQ: u8 = 20;

/// Everything a run needs, built once from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub gtf: PathBuf,
    pub bams: Vec<PathBuf>,
    pub outfile: PathBuf,
    /// Drop introns with no supporting read in any sample.
    pub skip_unmeasured: bool,
    pub min_mapq: u8,
}

impl Config {
    pub fn new(gtf: impl Into<PathBuf>, bams: Vec<PathBuf>, outfile: impl Into<PathBuf>) -> Self {
        Self {
            gtf: gtf.into(),
            bams,
            outfile: outfile.into(),
            skip_unmeasured: false,
            min_mapq: DEFAULT_MIN_MAPQ,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuantStats {
    pub total_reads: u64,
    pub unmapped_reads: u64,
    pub low_mapq_reads: u64,
    /// Mapped reads with no splice operation or none matching a block gap.
    pub no_junction_reads: u64,
    pub spliced_reads: u64,
    pub junctions_observed: u64,
    pub junctions_counted: u64,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub introns: usize,
    pub rows_written: usize,
    pub samples: Vec<QuantStats>,
}

/// Annotate, quantify every BAM in order, then write the report.
pub fn run(config: &Config) -> Result<Summary> {
    let transcripts = annotation::load_transcripts(&config.gtf)?;
    let mut registry = introns::build_registry(&transcripts)?;
    drop(transcripts);

    let mut samples = Vec::with_capacity(config.bams.len());
    for path in &config.bams {
        samples.push(quantify_bam(&mut registry, path, config)?);
    }

    let rows_written = report::write_report(&registry, &config.outfile, config.skip_unmeasured)?;
    info!(
        rows = rows_written,
        outfile = %config.outfile.display(),
        "report written"
    );

    Ok(Summary {
        introns: registry.len(),
        rows_written,
        samples,
    })
}

/// Add a count slot for `path` and fill it from the file's spliced reads.
pub fn quantify_bam(registry: &mut IntronRegistry, path: &Path, config: &Config) -> Result<QuantStats> {
    let BamInput {
        path,
        ref_names,
        mut reader,
    } = bam_input::open_bam(path)?;
    let slot = registry.add_sample(path.display().to_string());
    info!(bam = %path.display(), slot, "quantifying");

    let mut stats = QuantStats::default();
    for result in reader.records() {
        let record = result.map_err(|source| NmdError::AlignmentRead {
            path: path.clone(),
            source,
        })?;
        stats.total_reads += 1;

        let ref_name = usize::try_from(record.tid())
            .ok()
            .and_then(|tid| ref_names.get(tid));
        let Some(ref_name) = ref_name.filter(|_| !record.is_unmapped()) else {
            stats.unmapped_reads += 1;
            continue;
        };

        if record.mapq() < config.min_mapq {
            stats.low_mapq_reads += 1;
            continue;
        }

        let junctions = alignment::read_junctions(&record);
        if junctions.is_empty() {
            stats.no_junction_reads += 1;
            continue;
        }
        stats.spliced_reads += 1;

        for junction in junctions {
            stats.junctions_observed += 1;
            let key = IntronKey::new(ref_name.as_str(), junction.start, junction.end);
            if registry.increment(&key, slot) {
                stats.junctions_counted += 1;
            } else {
                debug!(intron = %key, "junction not in annotation");
            }
        }
    }

    info!(
        bam = %path.display(),
        total_reads = stats.total_reads,
        unmapped_reads = stats.unmapped_reads,
        low_mapq_reads = stats.low_mapq_reads,
        no_junction_reads = stats.no_junction_reads,
        spliced_reads = stats.spliced_reads,
        junctions_observed = stats.junctions_observed,
        junctions_counted = stats.junctions_counted,
        "quantification complete"
    );
    Ok(stats)
}
