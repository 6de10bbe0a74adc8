//! The two end-to-end analyses: BGC-to-bin linking and blobplot data.

use crate::core::annotation::AnnotationSummary;
use crate::core::bins::{BinInventory, BlobContig, BlobInventory};
use crate::core::config::Config;
use crate::core::merge::{
    attach_taxonomy, class_product_counts, distinct, duplicate_report, left_join_clusters,
    BinClusterRow, ClassProductCount, WithTaxonomy,
};
use crate::core::taxonomy_table::TaxonomyTable;
use crate::BinscopeError;
use indexmap::IndexSet;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TaxonomyInputs {
    pub bacteria: PathBuf,
    pub archaea: Option<PathBuf>,
}

impl TaxonomyInputs {
    pub fn load(&self, config: &Config) -> Result<TaxonomyTable, BinscopeError> {
        let table = TaxonomyTable::load(&self.bacteria, self.archaea.as_deref(), &config.taxonomy)?;
        info!("Taxonomy for {} bins was read from GTDB-tk", table.len());
        Ok(table)
    }
}

#[derive(Debug, Clone)]
pub struct BgcInputs {
    pub antismash_results: PathBuf,
    pub bin_directory: PathBuf,
    pub taxonomy: TaxonomyInputs,
}

/// Counts reported at the end of a BGC run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BgcSummary {
    pub records: usize,
    pub regions: usize,
    pub candidate_clusters: usize,
    pub non_other_clusters: usize,
    pub clusters_not_on_contig_edge: usize,
    pub total_cluster_length_bp: u64,
    pub bins: usize,
    pub binned_contigs: usize,
    pub unique_binned_contigs: usize,
    pub merged_rows: usize,
    pub merged_bins: usize,
    pub merged_unique_contigs: usize,
    pub contigs_in_more_than_one_bin: usize,
    pub taxonomy_rows: usize,
}

impl BgcSummary {
    pub fn metrics(&self) -> Vec<(&'static str, String)> {
        vec![
            ("records", self.records.to_string()),
            ("regions", self.regions.to_string()),
            ("candidate_clusters", self.candidate_clusters.to_string()),
            ("non_other_clusters", self.non_other_clusters.to_string()),
            (
                "clusters_not_on_contig_edge",
                self.clusters_not_on_contig_edge.to_string(),
            ),
            ("total_cluster_length_bp", self.total_cluster_length_bp.to_string()),
            ("bins", self.bins.to_string()),
            ("binned_contigs", self.binned_contigs.to_string()),
            ("unique_binned_contigs", self.unique_binned_contigs.to_string()),
            ("merged_rows", self.merged_rows.to_string()),
            ("merged_bins", self.merged_bins.to_string()),
            ("merged_unique_contigs", self.merged_unique_contigs.to_string()),
            (
                "contigs_in_more_than_one_bin",
                self.contigs_in_more_than_one_bin.to_string(),
            ),
            ("taxonomy_rows", self.taxonomy_rows.to_string()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BgcAnalysis {
    pub annotation: AnnotationSummary,
    pub inventory: BinInventory,
    pub taxonomy: TaxonomyTable,
    pub duplicated_contigs: IndexSet<String>,
    pub duplicates: Vec<BinClusterRow>,
    pub merged: Vec<WithTaxonomy<BinClusterRow>>,
    pub class_product_counts: Vec<ClassProductCount>,
}

impl BgcAnalysis {
    pub fn run(inputs: &BgcInputs, config: &Config) -> Result<Self, BinscopeError> {
        let annotation = AnnotationSummary::load(&inputs.antismash_results, &config.headers)?;
        info!(
            "{} records, {} regions, {} candidate clusters",
            annotation.record_count, annotation.region_count, annotation.candidate_cluster_count
        );

        let inventory = BinInventory::scan(&inputs.bin_directory, config)?;
        info!(
            "{} bins hold {} contigs ({} unique)",
            inventory.bin_count,
            inventory.rows.len(),
            inventory.unique_contig_count()
        );

        let taxonomy = inputs.taxonomy.load(config)?;

        Ok(Self::from_parts(annotation, inventory, taxonomy))
    }

    pub fn from_parts(
        annotation: AnnotationSummary,
        inventory: BinInventory,
        taxonomy: TaxonomyTable,
    ) -> Self {
        let bin_clusters = left_join_clusters(&inventory.rows, &annotation.clusters);

        let duplicated_contigs = inventory.duplicate_contigs();
        if !duplicated_contigs.is_empty() {
            warn!(
                "{} contigs are assigned to more than one bin",
                duplicated_contigs.len()
            );
        }
        let duplicates = duplicate_report(&bin_clusters, &duplicated_contigs);

        let merged = attach_taxonomy(bin_clusters, &taxonomy);
        let class_product_counts = class_product_counts(&merged);

        Self {
            annotation,
            inventory,
            taxonomy,
            duplicated_contigs,
            duplicates,
            merged,
            class_product_counts,
        }
    }

    pub fn summary(&self) -> BgcSummary {
        BgcSummary {
            records: self.annotation.record_count,
            regions: self.annotation.region_count,
            candidate_clusters: self.annotation.candidate_cluster_count,
            non_other_clusters: self.annotation.non_other_count(),
            clusters_not_on_contig_edge: self.annotation.not_on_edge_count(),
            total_cluster_length_bp: self.annotation.total_cluster_length(),
            bins: self.inventory.bin_count,
            binned_contigs: self.inventory.rows.len(),
            unique_binned_contigs: self.inventory.unique_contig_count(),
            merged_rows: self.merged.len(),
            merged_bins: distinct(&self.merged, |r| r.row.bin.as_str()).len(),
            merged_unique_contigs: distinct(&self.merged, |r| r.row.contig.as_str()).len(),
            contigs_in_more_than_one_bin: self.duplicated_contigs.len(),
            taxonomy_rows: self.taxonomy.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlobInputs {
    pub bin_directory: PathBuf,
    pub taxonomy: TaxonomyInputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobSummary {
    pub bins: usize,
    pub binned_contigs: usize,
    pub taxonomy_rows: usize,
    pub bins_with_taxonomy: usize,
    pub contigs_with_taxonomy: usize,
    pub merged_rows: usize,
}

impl BlobSummary {
    pub fn metrics(&self) -> Vec<(&'static str, String)> {
        vec![
            ("bins", self.bins.to_string()),
            ("binned_contigs", self.binned_contigs.to_string()),
            ("taxonomy_rows", self.taxonomy_rows.to_string()),
            ("bins_with_taxonomy", self.bins_with_taxonomy.to_string()),
            ("contigs_with_taxonomy", self.contigs_with_taxonomy.to_string()),
            ("merged_rows", self.merged_rows.to_string()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BlobAnalysis {
    pub inventory: BlobInventory,
    pub taxonomy: TaxonomyTable,
    pub merged: Vec<WithTaxonomy<BlobContig>>,
}

impl BlobAnalysis {
    pub fn run(inputs: &BlobInputs, config: &Config) -> Result<Self, BinscopeError> {
        let inventory = BlobInventory::scan(&inputs.bin_directory, config)?;
        info!(
            "{} contigs were read from {} bins",
            inventory.rows.len(),
            inventory.bin_count
        );

        let taxonomy = inputs.taxonomy.load(config)?;
        Ok(Self::from_parts(inventory, taxonomy))
    }

    pub fn from_parts(inventory: BlobInventory, taxonomy: TaxonomyTable) -> Self {
        if taxonomy.len() != inventory.bin_count {
            warn!(
                "Taxonomy covers {} bins but {} bins were read",
                taxonomy.len(),
                inventory.bin_count
            );
        }

        let merged = attach_taxonomy(inventory.rows.clone(), &taxonomy);

        let classified = merged.iter().filter(|r| r.taxonomy.is_some()).count();
        if classified != merged.len() {
            warn!(
                "{} of {} contigs have no taxonomy and are left out of the plots",
                merged.len() - classified,
                merged.len()
            );
        }

        Self {
            inventory,
            taxonomy,
            merged,
        }
    }

    pub fn summary(&self) -> BlobSummary {
        let bins_with_taxonomy = self
            .inventory
            .bin_names()
            .into_iter()
            .filter(|bin| self.taxonomy.get(bin).is_some())
            .count();

        BlobSummary {
            bins: self.inventory.bin_count,
            binned_contigs: self.inventory.rows.len(),
            taxonomy_rows: self.taxonomy.len(),
            bins_with_taxonomy,
            contigs_with_taxonomy: self.merged.iter().filter(|r| r.taxonomy.is_some()).count(),
            merged_rows: self.merged.len(),
        }
    }
}
