//! Left joins between bin inventories, clusters and taxonomy.
//!
//! Every join keeps all rows of its left side. Rows without a partner carry
//! `None` in the joined fields, which the TSV writers render as empty cells.

use crate::core::annotation::ClusterRow;
use crate::core::bins::{BinContig, BinKeyed};
use crate::core::taxonomy_table::{TaxonomyRow, TaxonomyTable};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A binned contig and, when it carries one, a candidate cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinClusterRow {
    pub bin: String,
    pub contig: String,
    pub cluster: Option<ClusterRow>,
}

impl BinKeyed for BinClusterRow {
    fn bin(&self) -> &str {
        &self.bin
    }
}

/// Any bin-keyed row with the taxonomy of its bin attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithTaxonomy<T> {
    pub row: T,
    pub taxonomy: Option<TaxonomyRow>,
}

impl<T> WithTaxonomy<T> {
    pub fn class(&self) -> Option<&str> {
        self.taxonomy.as_ref().and_then(|t| t.class.as_deref())
    }

    pub fn lowest_id(&self) -> Option<&str> {
        self.taxonomy.as_ref().and_then(|t| t.lowest_id.as_deref())
    }

    pub fn classification(&self) -> Option<&str> {
        self.taxonomy.as_ref().map(|t| t.classification.as_str())
    }
}

/// Join clusters onto binned contigs by contig id.
///
/// A contig with k clusters yields k rows; a contig with none yields one row
/// with an empty cluster.
pub fn left_join_clusters(bins: &[BinContig], clusters: &[ClusterRow]) -> Vec<BinClusterRow> {
    let mut by_contig: HashMap<&str, Vec<&ClusterRow>> = HashMap::new();
    for cluster in clusters {
        by_contig
            .entry(cluster.contig.as_str())
            .or_default()
            .push(cluster);
    }

    let mut rows = Vec::with_capacity(bins.len());
    for bin in bins {
        match by_contig.get(bin.contig.as_str()) {
            Some(matches) => rows.extend(matches.iter().map(|cluster| BinClusterRow {
                bin: bin.bin.clone(),
                contig: bin.contig.clone(),
                cluster: Some((*cluster).clone()),
            })),
            None => rows.push(BinClusterRow {
                bin: bin.bin.clone(),
                contig: bin.contig.clone(),
                cluster: None,
            }),
        }
    }
    rows
}

/// Join taxonomy onto rows by bin name, one output row per input row
pub fn attach_taxonomy<T: BinKeyed>(rows: Vec<T>, taxonomy: &TaxonomyTable) -> Vec<WithTaxonomy<T>> {
    rows.into_iter()
        .map(|row| {
            let taxonomy = taxonomy.get(row.bin()).cloned();
            WithTaxonomy { row, taxonomy }
        })
        .collect()
}

/// Contigs listed in more than one bin row, in order of first appearance
pub fn find_duplicate_contigs(rows: &[BinContig]) -> IndexSet<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for row in rows {
        *counts.entry(row.contig.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(contig, _)| contig.to_string())
        .collect()
}

/// Merged rows whose contig is assigned to more than one bin
pub fn duplicate_report(
    rows: &[BinClusterRow],
    duplicated: &IndexSet<String>,
) -> Vec<BinClusterRow> {
    rows.iter()
        .filter(|row| duplicated.contains(&row.contig))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassProductCount {
    pub class: String,
    pub product: String,
    pub count: usize,
}

/// Clusters per (taxonomic class, product), sorted by class then product.
///
/// Rows without a class or without a cluster are not counted.
pub fn class_product_counts(rows: &[WithTaxonomy<BinClusterRow>]) -> Vec<ClassProductCount> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for row in rows {
        if let (Some(class), Some(cluster)) = (row.class(), row.row.cluster.as_ref()) {
            *counts.entry((class, cluster.product.as_str())).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((class, product), count)| ClassProductCount {
            class: class.to_string(),
            product: product.to_string(),
            count,
        })
        .collect()
}

/// Distinct values of `key` over `rows`, in order of first appearance
pub fn distinct<'a, T, F>(rows: &'a [T], key: F) -> IndexSet<&'a str>
where
    F: Fn(&'a T) -> &'a str,
{
    rows.iter().map(key).collect()
}
