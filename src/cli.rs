use crate::pipeline::{Config, DEFAULT_MIN_MAPQ};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nmdquant",
    about = "Quantify nonsense mediated decay in RNA-Seq data",
    version
)]
pub struct Args {
    /// GTF file of annotations (may be gzipped)
    pub gtf: PathBuf,

    /// BAM files to quantitate
    #[arg(required = true, num_args = 1..)]
    pub bam: Vec<PathBuf>,

    /// Output file for the intron table
    #[arg(short = 'o', long, value_name = "TSV")]
    pub outfile: PathBuf,

    /// Don't report introns with no reads in any sample
    #[arg(long)]
    pub nounmeasured: bool,

    /// Minimum mapping quality for a read to be counted
    #[arg(long, default_value_t = DEFAULT_MIN_MAPQ)]
    pub min_mapq: u8,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            gtf: args.gtf,
            bams: args.bam,
            outfile: args.outfile,
            skip_unmeasured: args.nounmeasured,
            min_mapq: args.min_mapq,
        }
    }
}
