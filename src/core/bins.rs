//! Bin (MAG) inventories built from a directory of FASTA files.

use crate::bio::fasta;
use crate::bio::header::ContigHeader;
use crate::core::config::Config;
use crate::BinscopeError;
use indexmap::IndexSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Row keyed by the bin it belongs to
pub trait BinKeyed {
    fn bin(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BinContig {
    pub bin: String,
    pub contig: String,
}

impl BinKeyed for BinContig {
    fn bin(&self) -> &str {
        &self.bin
    }
}

/// A binned contig with the statistics a blobplot needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobContig {
    pub bin: String,
    pub contig: String,
    pub length: Option<u64>,
    pub coverage: Option<f64>,
    pub gc_content: f64,
}

impl BinKeyed for BlobContig {
    fn bin(&self) -> &str {
        &self.bin
    }
}

/// Bin FASTA files in `dir` with their bin names, sorted by file name
pub fn bin_files(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>, BinscopeError> {
    if !dir.is_dir() {
        return Err(BinscopeError::InvalidInput(format!(
            "Bin directory {} does not exist or is not a directory",
            dir.display()
        )));
    }

    let extension = extension.trim_start_matches('.');
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(extension)
    );
    let paths = glob::glob(&pattern)
        .map_err(|e| BinscopeError::InvalidInput(format!("Bad bin pattern {}: {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| BinscopeError::Io(e.into()))?;
        if !path.is_file() {
            continue;
        }
        let bin = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(extension))
            .and_then(|n| n.strip_suffix('.'))
            .map(str::to_string);
        match bin {
            Some(bin) => files.push((bin, path)),
            None => warn!("Skipping bin file with a non UTF-8 name: {}", path.display()),
        }
    }

    files.sort();
    Ok(files)
}

/// Which contigs each bin holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinInventory {
    pub bin_count: usize,
    pub rows: Vec<BinContig>,
}

impl BinInventory {
    pub fn scan(dir: &Path, config: &Config) -> Result<Self, BinscopeError> {
        let files = bin_files(dir, &config.bins.extension)?;
        let mut inventory = Self {
            bin_count: files.len(),
            rows: Vec::new(),
        };

        for (bin, path) in files {
            let sequences = fasta::parse_fasta(&path)?;
            debug!("{}: {} contigs", bin, sequences.len());
            inventory
                .rows
                .extend(sequences.into_iter().map(|seq| BinContig {
                    bin: bin.clone(),
                    contig: seq.id,
                }));
        }

        Ok(inventory)
    }

    pub fn from_rows(rows: Vec<BinContig>) -> Self {
        let bin_count = rows.iter().map(|r| r.bin.as_str()).collect::<IndexSet<_>>().len();
        Self { bin_count, rows }
    }

    pub fn unique_contig_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.contig.as_str())
            .collect::<IndexSet<_>>()
            .len()
    }

    /// Contigs listed in more than one bin row, in order of first appearance
    pub fn duplicate_contigs(&self) -> IndexSet<String> {
        crate::core::merge::find_duplicate_contigs(&self.rows)
    }
}

/// Binned contigs with GC content, length and coverage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlobInventory {
    pub bin_count: usize,
    pub rows: Vec<BlobContig>,
}

impl BlobInventory {
    pub fn scan(dir: &Path, config: &Config) -> Result<Self, BinscopeError> {
        let files = bin_files(dir, &config.bins.extension)?;
        let mut inventory = Self {
            bin_count: files.len(),
            rows: Vec::new(),
        };

        for (bin, path) in files {
            let sequences = fasta::parse_fasta(&path)?;
            debug!("{}: {} contigs", bin, sequences.len());

            for seq in sequences {
                let (length, coverage) = match ContigHeader::decode(&seq.id, &config.headers) {
                    Ok(header) => (Some(header.length), Some(header.coverage)),
                    Err(e) if !config.headers.strict => {
                        warn!("{} in bin {}: {}", seq.id, bin, e);
                        (None, None)
                    }
                    Err(e) => return Err(e),
                };

                inventory.rows.push(BlobContig {
                    gc_content: seq.gc_content(),
                    bin: bin.clone(),
                    contig: seq.id,
                    length,
                    coverage,
                });
            }
        }

        Ok(inventory)
    }

    pub fn bin_names(&self) -> IndexSet<&str> {
        self.rows.iter().map(|r| r.bin.as_str()).collect()
    }
}
