/// GTDB lineage strings and their rank tokens
use serde::{Deserialize, Serialize};

/// Separator between rank tokens in a GTDB classification string
pub const LINEAGE_DELIMITER: char = ';';

/// A classification split into its rank tokens, domain first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    ranks: Vec<String>,
}

impl Lineage {
    pub fn parse(classification: &str) -> Self {
        Self {
            ranks: classification
                .split(LINEAGE_DELIMITER)
                .map(|token| token.trim().to_string())
                .collect(),
        }
    }

    pub fn ranks(&self) -> &[String] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.iter().all(|r| r.is_empty())
    }

    /// Token at `index`, counted from the domain
    pub fn rank_at(&self, index: usize) -> Option<&str> {
        self.ranks.get(index).map(String::as_str)
    }

    /// The most specific token longer than `placeholder_max_len`.
    ///
    /// GTDB leaves unresolved ranks as bare prefixes (`s__`, `g__`), which
    /// are exactly three characters long.
    pub fn lowest_informative(&self, placeholder_max_len: usize) -> Option<&str> {
        self.ranks
            .iter()
            .rev()
            .find(|token| token.chars().count() > placeholder_max_len)
            .map(String::as_str)
    }
}
