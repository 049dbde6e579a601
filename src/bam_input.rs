use crate::error::{NmdError, Result};
use rust_htslib::bam;
use rust_htslib::bam::Read as HtsRead;
use std::path::{Path, PathBuf};

pub struct BamInput {
    pub path: PathBuf,
    /// Reference names indexed by target id.
    pub ref_names: Vec<String>,
    pub reader: bam::Reader,
}

pub fn open_bam(path: &Path) -> Result<BamInput> {
    let reader = bam::Reader::from_path(path).map_err(|source| NmdError::AlignmentRead {
        path: path.to_path_buf(),
        source,
    })?;
    let ref_names = reader
        .header()
        .target_names()
        .iter()
        .map(|n| String::from_utf8_lossy(n).to_string())
        .collect();
    Ok(BamInput {
        path: path.to_path_buf(),
        ref_names,
        reader,
    })
}
