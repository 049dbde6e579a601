use rust_htslib::bam::ext::BamRecordExtensions;
use rust_htslib::bam::record::{Cigar, Record};

/// A splice junction observed in a read, as the 1-based inclusive intron span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Junction {
    pub start: u32,
    pub end: u32,
}

/// Lengths of the CIGAR `N` (reference skip) operations, in read order.
pub fn splice_lengths<'a, I>(ops: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a Cigar>,
{
    ops.into_iter()
        .filter_map(|op| match op {
            Cigar::RefSkip(n) => Some(*n),
            _ => None,
        })
        .collect()
}

/// Pair up gaps between aligned blocks with the read's splice lengths.
///
/// `blocks` are 0-based half-open reference intervals as reported by htslib.
/// A gap counts as a junction only when its length equals the next unconsumed
/// splice length; other gaps (deletions, insertions splitting a block) are
/// passed over without consuming anything. The scan halts once either the
/// block pairs or the splice lengths run out.
pub fn match_junctions(splices: &[u32], blocks: &[[i64; 2]]) -> Vec<Junction> {
    let mut junctions = Vec::with_capacity(splices.len());
    let mut splice_idx = 0usize;
    let mut block_idx = 1usize;

    while splice_idx < splices.len() && block_idx < blocks.len() {
        let prev = blocks[block_idx - 1];
        let next = blocks[block_idx];
        let gap = next[0] - prev[1];

        if gap == i64::from(splices[splice_idx]) {
            junctions.push(Junction {
                start: (prev[1] + 1) as u32,
                end: next[0] as u32,
            });
            splice_idx += 1;
        }
        block_idx += 1;
    }

    junctions
}

/// Splice junctions supported by a mapped record.
///
/// Reads without `N` operations return nothing without touching the blocks.
pub fn read_junctions(record: &Record) -> Vec<Junction> {
    let splices = splice_lengths(record.cigar().iter());
    if splices.is_empty() {
        return Vec::new();
    }
    let blocks: Vec<[i64; 2]> = record.aligned_blocks().collect();
    match_junctions(&splices, &blocks)
}
