//! nmdquant: count reads over annotated introns and flag the ones associated
//! with nonsense-mediated decay.
//!
//! # Library usage
//!
//! ```no_run
//! use nmdquant::{Config, run};
//! use std::path::PathBuf;
//!
//! let mut config = Config::new(
//!     "genes.gtf.gz",
//!     vec![PathBuf::from("sample1.bam"), PathBuf::from("sample2.bam")],
//!     "introns.tsv",
//! );
//! config.skip_unmeasured = true;
//! let summary = run(&config)?;
//! println!("{} introns, {} rows", summary.introns, summary.rows_written);
//! # Ok::<(), nmdquant::NmdError>(())
//! ```

// Internal modules — not part of the public API.
pub(crate) mod bam_input;

// Public modules — stable API surface.
pub mod alignment;
pub mod annotation;
pub mod cli;
pub mod error;
pub mod introns;
pub mod pipeline;
pub mod report;
pub mod types;

// Flat re-exports for the most commonly used public types.
pub use error::NmdError;
pub use introns::{Intron, IntronKey, IntronRegistry, build_registry};
pub use pipeline::{Config, QuantStats, Summary, quantify_bam, run};
pub use types::Strand;
