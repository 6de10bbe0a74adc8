//! Decoding of assembler-encoded contig identifiers.
//!
//! SPAdes and MEGAHIT style assemblers write contig statistics into the
//! identifier itself, e.g. `NODE_12_length_5032_cov_8.413`. Splitting on `_`
//! puts the length at token 3 and the k-mer coverage at token 5. The layout
//! is positional only: field names are not checked, so a header with the
//! right shape but different labels still decodes.

use crate::core::config::HeaderConfig;
use crate::BinscopeError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContigHeader {
    pub length: u64,
    pub coverage: f64,
}

impl ContigHeader {
    /// Decode length and coverage from `id` using the configured layout
    pub fn decode(id: &str, layout: &HeaderConfig) -> Result<Self, BinscopeError> {
        let length = decode_length(id, layout)?;
        let coverage = token(id, layout, layout.coverage_field)?;
        let coverage = coverage.parse::<f64>().map_err(|_| {
            BinscopeError::Parse(format!(
                "Contig id '{}': coverage field '{}' is not a number",
                id, coverage
            ))
        })?;

        Ok(Self { length, coverage })
    }
}

/// Decode only the length field of an encoded contig id
pub fn decode_length(id: &str, layout: &HeaderConfig) -> Result<u64, BinscopeError> {
    let length = token(id, layout, layout.length_field)?;
    length.parse::<u64>().map_err(|_| {
        BinscopeError::Parse(format!(
            "Contig id '{}': length field '{}' is not an integer",
            id, length
        ))
    })
}

fn token<'a>(id: &'a str, layout: &HeaderConfig, index: usize) -> Result<&'a str, BinscopeError> {
    id.split(layout.delimiter.as_str()).nth(index).ok_or_else(|| {
        BinscopeError::Parse(format!(
            "Contig id '{}' has no field {} when split on '{}'",
            id, index, layout.delimiter
        ))
    })
}
