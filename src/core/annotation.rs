//! Candidate cluster extraction from antiSMASH GenBank output.

use crate::bio::genbank::{self, Feature, GenBankRecord};
use crate::bio::header;
use crate::core::config::HeaderConfig;
use crate::BinscopeError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Structured comment block antiSMASH writes into every record
pub const ANTISMASH_BLOCK: &str = "antiSMASH-Data";
/// Key holding the contig id as it appeared in the assembly
pub const ORIGINAL_ID_KEY: &str = "Original ID";

pub const REGION_FEATURE: &str = "region";
pub const CANDIDATE_CLUSTER_FEATURE: &str = "cand_cluster";

/// Product label antiSMASH uses for clusters of no known class
pub const OTHER_PRODUCT: &str = "other";

/// One candidate cluster and the contig it sits on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRow {
    pub contig: String,
    pub contig_length: u64,
    pub candidate_cluster_length: u64,
    pub on_contig_edge: bool,
    pub number_of_protoclusters: u32,
    pub candidate_cluster_kind: String,
    pub product: String,
}

impl ClusterRow {
    fn from_feature(
        record: &GenBankRecord,
        feature: &Feature,
        layout: &HeaderConfig,
    ) -> Result<Self, BinscopeError> {
        let contig = record
            .structured_comment(ANTISMASH_BLOCK, ORIGINAL_ID_KEY)
            .ok_or_else(|| {
                BinscopeError::MissingField(format!(
                    "record {} has no '{}' in its {} comment",
                    record.name, ORIGINAL_ID_KEY, ANTISMASH_BLOCK
                ))
            })?;

        let protoclusters = required_qualifier(record, feature, "protoclusters")?;
        let number_of_protoclusters = protoclusters.trim().parse::<u32>().map_err(|_| {
            BinscopeError::Parse(format!(
                "record {}: protoclusters '{}' is not an integer",
                record.name, protoclusters
            ))
        })?;

        let on_contig_edge = parse_flag(record, required_qualifier(record, feature, "contig_edge")?)?;

        Ok(Self {
            contig: contig.to_string(),
            contig_length: header::decode_length(contig, layout)?,
            candidate_cluster_length: feature.span()?.len(),
            on_contig_edge,
            number_of_protoclusters,
            candidate_cluster_kind: required_qualifier(record, feature, "kind")?.to_string(),
            product: required_qualifier(record, feature, "product")?.to_string(),
        })
    }
}

fn required_qualifier<'a>(
    record: &GenBankRecord,
    feature: &'a Feature,
    name: &str,
) -> Result<&'a str, BinscopeError> {
    feature.qualifier(name).ok_or_else(|| {
        BinscopeError::MissingField(format!(
            "record {}: {} feature at {} has no /{} qualifier",
            record.name, feature.key, feature.location, name
        ))
    })
}

fn parse_flag(record: &GenBankRecord, value: &str) -> Result<bool, BinscopeError> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(BinscopeError::Parse(format!(
            "record {}: contig_edge '{}' is not True/False",
            record.name, other
        ))),
    }
}

/// Feature counts and candidate clusters of one antiSMASH results file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSummary {
    pub record_count: usize,
    pub region_count: usize,
    pub candidate_cluster_count: usize,
    pub clusters: Vec<ClusterRow>,
}

impl AnnotationSummary {
    pub fn load<P: AsRef<Path>>(path: P, layout: &HeaderConfig) -> Result<Self, BinscopeError> {
        let path = path.as_ref();
        let records = genbank::parse_genbank(path)?;
        debug!("Read {} GenBank records from {}", records.len(), path.display());
        Self::from_records(&records, layout)
    }

    pub fn from_records(
        records: &[GenBankRecord],
        layout: &HeaderConfig,
    ) -> Result<Self, BinscopeError> {
        let mut summary = Self {
            record_count: records.len(),
            ..Default::default()
        };

        for record in records {
            summary.region_count += record.features_of(REGION_FEATURE).count();
            summary.candidate_cluster_count += record.features_of(CANDIDATE_CLUSTER_FEATURE).count();
        }

        summary.clusters.reserve(summary.candidate_cluster_count);
        for record in records {
            for feature in record.features_of(CANDIDATE_CLUSTER_FEATURE) {
                summary
                    .clusters
                    .push(ClusterRow::from_feature(record, feature, layout)?);
            }
        }

        Ok(summary)
    }

    pub fn non_other_count(&self) -> usize {
        self.clusters
            .iter()
            .filter(|c| c.product != OTHER_PRODUCT)
            .count()
    }

    pub fn not_on_edge_count(&self) -> usize {
        self.clusters.iter().filter(|c| !c.on_contig_edge).count()
    }

    pub fn total_cluster_length(&self) -> u64 {
        self.clusters.iter().map(|c| c.candidate_cluster_length).sum()
    }

    /// Clusters per product, most frequent first
    pub fn product_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for cluster in &self.clusters {
            *counts.entry(cluster.product.as_str()).or_insert(0) += 1;
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(product, n)| (product.to_string(), n))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}
