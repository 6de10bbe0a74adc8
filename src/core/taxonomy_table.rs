//! GTDB-tk summary tables keyed by bin name.

use crate::bio::taxonomy::Lineage;
use crate::core::config::TaxonomyConfig;
use crate::BinscopeError;
use flate2::read::GzDecoder;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Column holding the semicolon-delimited lineage
pub const CLASSIFICATION_COLUMN: &str = "classification";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyRow {
    pub bin: String,
    pub classification: String,
    pub class: Option<String>,
    pub lowest_id: Option<String>,
}

impl TaxonomyRow {
    pub fn new(bin: &str, classification: &str, config: &TaxonomyConfig) -> Self {
        let lineage = Lineage::parse(classification);

        let class = lineage.rank_at(config.class_rank_index).map(str::to_string);
        if class.is_none() {
            warn!(
                "Bin {}: lineage '{}' has only {} ranks, class left empty",
                bin,
                classification,
                lineage.len()
            );
        }

        Self {
            bin: bin.to_string(),
            classification: classification.to_string(),
            class,
            lowest_id: lineage
                .lowest_informative(config.placeholder_max_len)
                .map(str::to_string),
        }
    }
}

/// Bacterial and archaeal classifications merged into one lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyTable {
    rows: IndexMap<String, TaxonomyRow>,
}

impl TaxonomyTable {
    /// Load the bacterial table and, when given, append the archaeal one
    pub fn load(
        bacteria: &Path,
        archaea: Option<&Path>,
        config: &TaxonomyConfig,
    ) -> Result<Self, BinscopeError> {
        let mut table = Self::default();
        table.extend(read_table(bacteria, config)?);

        match archaea {
            Some(path) => table.extend(read_table(path, config)?),
            None => info!("No archaeal taxonomy file provided, using bacterial taxonomy only"),
        }

        Ok(table)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        source: &str,
        config: &TaxonomyConfig,
    ) -> Result<Self, BinscopeError> {
        let mut table = Self::default();
        table.extend(parse_rows(reader, source, config)?);
        Ok(table)
    }

    /// Add rows, keeping the first classification seen for a bin
    pub fn extend(&mut self, rows: Vec<TaxonomyRow>) {
        for row in rows {
            if let Some(existing) = self.rows.get(&row.bin) {
                warn!(
                    "Bin {} is classified more than once ('{}' and '{}'), keeping the first",
                    row.bin, existing.classification, row.classification
                );
                continue;
            }
            self.rows.insert(row.bin.clone(), row);
        }
    }

    pub fn get(&self, bin: &str) -> Option<&TaxonomyRow> {
        self.rows.get(bin)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &TaxonomyRow> {
        self.rows.values()
    }
}

fn read_table(path: &Path, config: &TaxonomyConfig) -> Result<Vec<TaxonomyRow>, BinscopeError> {
    let file = File::open(path).map_err(|e| {
        BinscopeError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    let reader: Box<dyn Read> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let rows = parse_rows(reader, &path.display().to_string(), config)?;
    debug!("{}: {} classified bins", path.display(), rows.len());
    Ok(rows)
}

/// Parse a tab-delimited table whose first column is the bin name
fn parse_rows<R: Read>(
    reader: R,
    source: &str,
    config: &TaxonomyConfig,
) -> Result<Vec<TaxonomyRow>, BinscopeError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let classification_idx = headers
        .iter()
        .position(|h| h.trim() == CLASSIFICATION_COLUMN)
        .ok_or_else(|| {
            BinscopeError::MissingField(format!(
                "{} has no '{}' column",
                source, CLASSIFICATION_COLUMN
            ))
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let bin = record.get(0).unwrap_or_default().trim();
        if bin.is_empty() {
            continue;
        }
        let classification = record.get(classification_idx).unwrap_or_default().trim();
        rows.push(TaxonomyRow::new(bin, classification, config));
    }

    Ok(rows)
}
