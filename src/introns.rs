//! Intron derivation, NMD classification and the per-sample count registry.
//!
//! An intron is identified by chromosome and its 1-based inclusive span (the
//! first and last intronic base). Strand never takes part in the key, so the
//! same locus reached from different transcripts collapses to one entry.

use crate::annotation::{Transcript, TranscriptMap};
use crate::error::{NmdError, Result};
use crate::types::{IndexMap, Interval, Strand};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntronKey {
    pub seqname: String,
    pub start: u32,
    pub end: u32,
}

impl IntronKey {
    pub fn new(seqname: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            seqname: seqname.into(),
            start,
            end,
        }
    }
}

impl fmt::Display for IntronKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.seqname, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intron {
    /// True only while every transcript sharing the intron calls it NMD.
    pub nmd: bool,
    pub strand: Strand,
    pub gene: String,
    /// One slot per sample, in the order samples were added.
    pub counts: Vec<u32>,
}

impl Intron {
    pub fn is_unmeasured(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

/// Known introns plus the ordered sample labels their count slots belong to.
#[derive(Debug, Default)]
pub struct IntronRegistry {
    introns: IndexMap<IntronKey, Intron>,
    samples: Vec<String>,
}

impl IntronRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.introns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.introns.is_empty()
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn get(&self, key: &IntronKey) -> Option<&Intron> {
        self.introns.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IntronKey, &Intron)> {
        self.introns.iter()
    }

    /// Record one transcript's view of an intron.
    ///
    /// Strand and gene follow the last transcript seen. The NMD flag can only
    /// be cleared, never set back once a transcript calls the locus non-NMD.
    pub fn merge(&mut self, key: IntronKey, nmd: bool, strand: Strand, gene: &str) {
        let slots = self.samples.len();
        match self.introns.get_mut(&key) {
            Some(existing) => {
                existing.nmd &= nmd;
                existing.strand = strand;
                existing.gene.clear();
                existing.gene.push_str(gene);
            }
            None => {
                self.introns.insert(
                    key,
                    Intron {
                        nmd,
                        strand,
                        gene: gene.to_string(),
                        counts: vec![0; slots],
                    },
                );
            }
        }
    }

    /// Append a zeroed count slot to every intron and return its index.
    pub fn add_sample(&mut self, label: impl Into<String>) -> usize {
        let slot = self.samples.len();
        self.samples.push(label.into());
        for intron in self.introns.values_mut() {
            intron.counts.push(0);
        }
        slot
    }

    /// Count one read supporting `key` in `slot`. Returns false for unknown introns.
    pub fn increment(&mut self, key: &IntronKey, slot: usize) -> bool {
        match self.introns.get_mut(key) {
            Some(intron) => {
                intron.counts[slot] += 1;
                true
            }
            None => false,
        }
    }
}

/// Exons ordered 5' to 3' in transcription direction.
fn ordered_exons(tx: &Transcript, strand: Strand) -> Vec<Interval> {
    let mut exons = tx.exons.clone();
    match strand {
        Strand::Plus => exons.sort_by_key(|e| e.start),
        Strand::Minus => exons.sort_by_key(|e| std::cmp::Reverse(e.start)),
    }
    exons
}

/// Downstream edge of the coding region in transcription direction.
fn cds_end(tx: &Transcript, strand: Strand) -> Option<u32> {
    match strand {
        Strand::Plus => tx.cds.iter().map(|c| c.end).max(),
        Strand::Minus => tx.cds.iter().map(|c| c.start).min(),
    }
}

/// Introns of a coding transcript with their NMD call.
///
/// An intron is NMD-associated when it starts past the end of the coding
/// sequence in transcription direction. Non-coding transcripts yield nothing,
/// whatever their strand; a coding transcript without one is an error.
pub fn transcript_introns(tx: &Transcript) -> Result<Vec<(IntronKey, bool)>> {
    if !tx.is_coding() {
        return Ok(Vec::new());
    }
    let strand = tx.strand.ok_or_else(|| NmdError::UnstrandedFeature {
        transcript_id: tx.id.clone(),
    })?;
    let Some(cds_end) = cds_end(tx, strand) else {
        return Ok(Vec::new());
    };
    let exons = ordered_exons(tx, strand);

    let introns = exons
        .windows(2)
        .map(|pair| {
            let (upstream, downstream) = (pair[0], pair[1]);
            match strand {
                Strand::Plus => {
                    let start = upstream.end + 1;
                    let end = downstream.start.saturating_sub(1);
                    (IntronKey::new(&tx.seqname, start, end), start > cds_end)
                }
                Strand::Minus => {
                    let start = downstream.end + 1;
                    let end = upstream.start.saturating_sub(1);
                    (IntronKey::new(&tx.seqname, start, end), end < cds_end)
                }
            }
        })
        .collect();
    Ok(introns)
}

/// Derive and classify the introns of every coding transcript.
pub fn build_registry(transcripts: &TranscriptMap) -> Result<IntronRegistry> {
    let mut registry = IntronRegistry::new();
    for tx in transcripts.values() {
        let introns = transcript_introns(tx)?;
        // transcript_introns only returns introns for stranded transcripts
        let Some(strand) = tx.strand else { continue };
        for (key, nmd) in introns {
            registry.merge(key, nmd, strand, &tx.gene);
        }
    }

    let nmd = registry.iter().filter(|(_, intron)| intron.nmd).count();
    info!(introns = registry.len(), nmd, "intron registry built");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(id: &str, strand: Strand, exons: &[(u32, u32)], cds: &[(u32, u32)]) -> Transcript {
        Transcript {
            id: id.to_string(),
            seqname: "chr".to_string(),
            strand: Some(strand),
            gene: format!("gene_{id}"),
            exons: exons.iter().map(|&(s, e)| Interval::new(s, e)).collect(),
            cds: cds.iter().map(|&(s, e)| Interval::new(s, e)).collect(),
        }
    }

    fn registry_of(txs: Vec<Transcript>) -> IntronRegistry {
        let mut map = TranscriptMap::default();
        for tx in txs {
            map.insert(tx.id.clone(), tx);
        }
        build_registry(&map).unwrap()
    }

    #[test]
    fn plus_strand_introns_past_cds_are_nmd() {
        let tx = transcript(
            "T1",
            Strand::Plus,
            &[(500, 600), (100, 200), (300, 400)],
            &[(100, 200), (300, 350)],
        );
        let introns = transcript_introns(&tx).unwrap();
        assert_eq!(
            introns,
            vec![
                (IntronKey::new("chr", 201, 299), false),
                (IntronKey::new("chr", 401, 499), true),
            ]
        );
        assert_eq!(introns[0].0.to_string(), "chr:201-299");
    }

    #[test]
    fn minus_strand_mirrors_plus_strand() {
        // Transcribed from 600 down to 100; the CDS stops at 350.
        let tx = transcript(
            "T1",
            Strand::Minus,
            &[(100, 200), (500, 600), (300, 400)],
            &[(500, 550), (350, 400)],
        );
        let introns = transcript_introns(&tx).unwrap();
        assert_eq!(
            introns,
            vec![
                (IntronKey::new("chr", 401, 499), false),
                (IntronKey::new("chr", 201, 299), true),
            ]
        );
    }

    #[test]
    fn strand_does_not_change_keys() {
        let exons = [(100, 200), (300, 400), (500, 600)];
        let plus = transcript("P", Strand::Plus, &exons, &[(100, 600)]);
        let minus = transcript("M", Strand::Minus, &exons, &[(100, 600)]);

        let mut plus_keys: Vec<IntronKey> = transcript_introns(&plus).unwrap().into_iter().map(|(k, _)| k).collect();
        let mut minus_keys: Vec<IntronKey> = transcript_introns(&minus).unwrap().into_iter().map(|(k, _)| k).collect();
        plus_keys.sort();
        minus_keys.sort();
        assert_eq!(plus_keys, minus_keys);
    }

    #[test]
    fn intron_count_is_exon_count_minus_one() {
        for n in 2..8u32 {
            let exons: Vec<(u32, u32)> = (0..n).map(|i| (i * 1000 + 1, i * 1000 + 100)).collect();
            let tx = transcript("T", Strand::Plus, &exons, &[(1, 50)]);
            assert_eq!(transcript_introns(&tx).unwrap().len(), (n - 1) as usize);
        }
    }

    #[test]
    fn single_exon_and_noncoding_transcripts_yield_nothing() {
        let single = transcript("S", Strand::Plus, &[(100, 200)], &[(120, 180)]);
        assert!(transcript_introns(&single).unwrap().is_empty());

        let noncoding = transcript("N", Strand::Plus, &[(100, 200), (300, 400)], &[]);
        assert!(transcript_introns(&noncoding).unwrap().is_empty());
        assert!(registry_of(vec![noncoding]).is_empty());
    }

    #[test]
    fn strand_is_required_only_for_coding_transcripts() {
        let mut novel = transcript("STRG.1.1", Strand::Plus, &[(100, 200), (300, 400)], &[]);
        novel.strand = None;
        assert!(transcript_introns(&novel).unwrap().is_empty());

        let coding = transcript("T1", Strand::Plus, &[(100, 200), (300, 400)], &[(100, 350)]);
        let registry = registry_of(vec![novel.clone(), coding]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&IntronKey::new("chr", 201, 299)).unwrap().strand, Strand::Plus);

        let mut unstranded = transcript("T2", Strand::Plus, &[(100, 200), (300, 400)], &[(100, 350)]);
        unstranded.strand = None;
        match transcript_introns(&unstranded) {
            Err(NmdError::UnstrandedFeature { transcript_id }) => assert_eq!(transcript_id, "T2"),
            other => panic!("expected UnstrandedFeature, got {other:?}"),
        }

        let mut map = TranscriptMap::default();
        map.insert(novel.id.clone(), novel);
        map.insert(unstranded.id.clone(), unstranded);
        assert!(matches!(build_registry(&map), Err(NmdError::UnstrandedFeature { .. })));
    }

    #[test]
    fn shared_intron_is_nmd_only_when_unanimous() {
        let nmd = transcript("A", Strand::Plus, &[(100, 200), (300, 400), (500, 600)], &[(100, 350)]);
        let coding = transcript("B", Strand::Plus, &[(300, 400), (500, 600)], &[(300, 550)]);

        let registry = registry_of(vec![nmd, coding]);
        let shared = registry.get(&IntronKey::new("chr", 401, 499)).unwrap();
        assert!(!shared.nmd);
        assert_eq!(shared.gene, "gene_B", "last transcript wins gene");
    }

    #[test]
    fn nmd_flag_is_never_restored() {
        let mut registry = IntronRegistry::new();
        let key = IntronKey::new("chr", 10, 20);
        registry.merge(key.clone(), true, Strand::Plus, "g1");
        registry.merge(key.clone(), false, Strand::Minus, "g2");
        registry.merge(key.clone(), true, Strand::Plus, "g3");

        let intron = registry.get(&key).unwrap();
        assert!(!intron.nmd);
        assert_eq!(intron.strand, Strand::Plus);
        assert_eq!(intron.gene, "g3");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn samples_add_one_zeroed_slot_per_intron() {
        let mut registry = IntronRegistry::new();
        let a = IntronKey::new("chr", 10, 20);
        let b = IntronKey::new("chr", 30, 40);
        registry.merge(a.clone(), true, Strand::Plus, "g");
        registry.merge(b.clone(), false, Strand::Plus, "g");

        let first = registry.add_sample("s1.bam");
        assert!(registry.increment(&a, first));
        let second = registry.add_sample("s2.bam");
        assert!(registry.increment(&b, second));
        assert!(!registry.increment(&IntronKey::new("chr", 1, 2), second));

        assert_eq!((first, second), (0, 1));
        assert_eq!(registry.samples(), ["s1.bam", "s2.bam"]);
        assert_eq!(registry.get(&a).unwrap().counts, vec![1, 0]);
        assert_eq!(registry.get(&b).unwrap().counts, vec![0, 1]);
        assert!(registry.iter().all(|(_, i)| i.counts.len() == 2));
    }
}
