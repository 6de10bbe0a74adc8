use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

impl Sequence {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// GC percentage over the full sequence length.
    ///
    /// `S` (G or C) counts towards GC; every other symbol, including `N`
    /// and gaps, counts only towards the denominator.
    pub fn gc_content(&self) -> f64 {
        gc_content(&self.sequence)
    }
}

pub fn gc_content(sequence: &[u8]) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }

    let gc = sequence
        .iter()
        .filter(|&&c| matches!(c.to_ascii_uppercase(), b'G' | b'C' | b'S'))
        .count();

    gc as f64 * 100.0 / sequence.len() as f64
}
