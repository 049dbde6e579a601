use std::fmt;

// Insertion-ordered map hashed with AHash instead of the default SipHash.
// Keeps transcripts and introns in annotation order so output is reproducible.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

/// Transcription direction of a transcript on the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A closed genomic interval, 1-based inclusive as written in GTF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}
