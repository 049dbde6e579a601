//! Error type shared by every stage of the pipeline.
//!
//! Nothing in the library recovers locally: each variant aborts the run and is
//! surfaced to the binary, which adds context through `anyhow`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NmdError {
    /// A GTF feature that is neither exon/CDS nor a known skippable type.
    #[error("unknown feature type '{feature}' at {seqname}:{start}")]
    UnknownFeatureType {
        feature: String,
        seqname: String,
        start: usize,
    },

    /// An exon/CDS line lacking a required attribute.
    #[error("missing mandatory attribute '{attribute}' at {seqname}:{start}")]
    MissingMandatoryAttribute {
        attribute: &'static str,
        seqname: String,
        start: usize,
    },

    #[error("coding transcript '{transcript_id}' has no +/- strand")]
    UnstrandedFeature { transcript_id: String },

    /// Malformed GTF record reported by the reader.
    #[error("malformed annotation record: {source}")]
    Annotation {
        #[source]
        source: io::Error,
    },

    /// Any failure opening or decoding an alignment file.
    #[error("failed to read alignments from {}: {source}", path.display())]
    AlignmentRead {
        path: PathBuf,
        #[source]
        source: rust_htslib::errors::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, NmdError>;
