use crate::error::{NmdError, Result};
use crate::types::{IndexMap, Interval, Strand};
use flate2::read::MultiGzDecoder;
use noodles::gff::feature::record_buf::Attributes;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Feature types carrying no exon/CDS structure. They are ignored without error.
const SKIPPED_FEATURES: &[&[u8]] = &[
    b"gene",
    b"transcript",
    b"start_codon",
    b"stop_codon",
    b"UTR",
    b"five_prime_utr",
    b"three_prime_utr",
    b"Selenocysteine",
];

/// Transcripts keyed by `transcript_id`, in order of first appearance.
pub type TranscriptMap = IndexMap<String, Transcript>;

#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: String,
    pub seqname: String,
    /// None for `.`/`?`; only coding transcripts need a strand.
    pub strand: Option<Strand>,
    pub gene: String,
    pub exons: Vec<Interval>,
    pub cds: Vec<Interval>,
}

impl Transcript {
    pub fn is_coding(&self) -> bool {
        !self.cds.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureKind {
    Exon,
    Cds,
    Skipped,
}

fn feature_kind(ty: &[u8]) -> Option<FeatureKind> {
    match ty {
        b"exon" => Some(FeatureKind::Exon),
        b"CDS" => Some(FeatureKind::Cds),
        _ if SKIPPED_FEATURES.contains(&ty) => Some(FeatureKind::Skipped),
        _ => None,
    }
}

/// Attributes of one exon/CDS line, validated once when the line is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureAttributes {
    pub transcript_id: String,
    /// `gene_name`, else `gene_id`, else empty.
    pub gene: String,
}

impl FeatureAttributes {
    fn from_record(attrs: &Attributes, seqname: &str, start: usize) -> Result<Self> {
        let transcript_id = get_attribute(attrs, b"transcript_id").ok_or_else(|| {
            NmdError::MissingMandatoryAttribute {
                attribute: "transcript_id",
                seqname: seqname.to_string(),
                start,
            }
        })?;
        let gene = get_attribute(attrs, b"gene_name")
            .or_else(|| get_attribute(attrs, b"gene_id"))
            .unwrap_or_default();
        Ok(Self { transcript_id, gene })
    }
}

fn get_attribute(attrs: &Attributes, key: &[u8]) -> Option<String> {
    let value = attrs.get(key)?;
    value
        .iter()
        .next()
        .map(|v| v.to_string().trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Load exon and CDS features from a GTF file, gzip-compressed when the name ends in `.gz`.
pub fn load_transcripts(path: &Path) -> Result<TranscriptMap> {
    let file = File::open(path).map_err(|source| NmdError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    read_transcripts(reader)
}

/// Group GTF exon/CDS records by transcript.
///
/// Coordinates are kept 1-based inclusive as written in the file.
pub fn read_transcripts<R: BufRead>(reader: R) -> Result<TranscriptMap> {
    let mut reader = noodles::gtf::io::Reader::new(reader);
    let mut transcripts = TranscriptMap::default();
    let mut current_seqname = String::new();

    for result in reader.record_bufs() {
        let record = result.map_err(|source| NmdError::Annotation { source })?;

        let feature_type: &[u8] = record.ty().as_ref();
        let seqname = record.reference_sequence_name().to_string();
        let start_1 = record.start().get();
        let end_1 = record.end().get();

        if seqname != current_seqname {
            info!(chromosome = %seqname, "reading annotations");
            current_seqname.clone_from(&seqname);
        }

        let kind = feature_kind(feature_type).ok_or_else(|| NmdError::UnknownFeatureType {
            feature: String::from_utf8_lossy(feature_type).into_owned(),
            seqname: seqname.clone(),
            start: start_1,
        })?;
        if kind == FeatureKind::Skipped {
            continue;
        }

        let attributes = FeatureAttributes::from_record(record.attributes(), &seqname, start_1)?;
        let strand = to_strand(record.strand());
        let interval = Interval::new(
            to_coordinate(start_1, &seqname)?,
            to_coordinate(end_1, &seqname)?,
        );

        let FeatureAttributes { transcript_id, gene } = attributes;
        let entry = transcripts
            .entry(transcript_id)
            .or_insert_with_key(|id| Transcript {
                id: id.clone(),
                seqname,
                strand,
                gene,
                exons: Vec::new(),
                cds: Vec::new(),
            });

        match kind {
            FeatureKind::Exon => entry.exons.push(interval),
            FeatureKind::Cds => entry.cds.push(interval),
            FeatureKind::Skipped => {}
        }
    }

    let coding = transcripts.values().filter(|tx| tx.is_coding()).count();
    debug!(coding, "coding transcripts");
    info!(transcripts = transcripts.len(), "annotation loaded");
    Ok(transcripts)
}

fn to_strand(strand: noodles::gff::feature::record::Strand) -> Option<Strand> {
    use noodles::gff::feature::record::Strand as GffStrand;
    match strand {
        GffStrand::Forward => Some(Strand::Plus),
        GffStrand::Reverse => Some(Strand::Minus),
        GffStrand::None | GffStrand::Unknown => None,
    }
}

fn to_coordinate(value: usize, seqname: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| NmdError::Annotation {
        source: io::Error::new(
            io::ErrorKind::InvalidData,
            format!("coordinate {value} on {seqname} out of range"),
        ),
    })
}
