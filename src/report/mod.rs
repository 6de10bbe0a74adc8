//! Files written into the output directory of each pipeline.

pub mod charts;
pub mod tsv;

use crate::core::bins::BlobContig;
use crate::core::config::ChartConfig;
use crate::core::merge::WithTaxonomy;
use crate::core::pipeline::{BgcAnalysis, BlobAnalysis};
use crate::BinscopeError;
use charts::{BarChart, FacetedBarChart, ScatterPlot, ScatterPoint};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DUPLICATES_TSV: &str = "contigs_in_more_than_one_bin.tsv";
pub const BIN_BGC_TSV: &str = "final_bin_bgc_df.tsv";
pub const BGC_SUMMARY_TSV: &str = "bgc_summary.tsv";
pub const CLASS_PRODUCT_TSV: &str = "bgcs_per_class_per_product.tsv";
pub const PRODUCT_CHART: &str = "BGCs_per_sec_met_class.svg";
pub const CLASS_PRODUCT_CHART: &str = "BGCs_per_sec_met_class_per_tax_class.svg";

pub const BLOB_TSV: &str = "blob_df_final.tsv";
pub const BLOB_LOWEST_ID_CHART: &str = "dereplicated_genomes_gtdbtk_lowest_ID.svg";
pub const BLOB_CLASS_CHART: &str = "dereplicated_genomes_gtdbtk_class.svg";

/// Collects the paths of written artifacts
struct ArtifactWriter<'a> {
    dir: &'a Path,
    written: Vec<PathBuf>,
}

impl<'a> ArtifactWriter<'a> {
    fn new(dir: &'a Path) -> Self {
        Self {
            dir,
            written: Vec::new(),
        }
    }

    fn write<F>(&mut self, name: &str, f: F) -> Result<(), BinscopeError>
    where
        F: FnOnce(&Path) -> Result<(), BinscopeError>,
    {
        let path = self.dir.join(name);
        f(&path)?;
        debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

pub fn product_chart(analysis: &BgcAnalysis) -> BarChart {
    let mut chart = BarChart::new("BGCs per secondary metabolite class")
        .with_labels("product", "# BGCs");
    for (product, count) in analysis.annotation.product_counts() {
        chart.add_bar(product, count as f64);
    }
    chart
}

pub fn class_product_chart(analysis: &BgcAnalysis) -> FacetedBarChart {
    FacetedBarChart::from_triples(
        "BGCs per secondary metabolite class per taxonomic class",
        "# BGCs",
        analysis
            .class_product_counts
            .iter()
            .map(|c| (c.class.as_str(), c.product.as_str(), c.count as f64)),
    )
}

pub fn write_bgc_artifacts(
    analysis: &BgcAnalysis,
    out_dir: &Path,
    config: &ChartConfig,
) -> Result<Vec<PathBuf>, BinscopeError> {
    let mut writer = ArtifactWriter::new(out_dir);

    writer.write(DUPLICATES_TSV, |p| tsv::write_tsv_file(p, &analysis.duplicates))?;
    writer.write(BIN_BGC_TSV, |p| tsv::write_tsv_file(p, &analysis.merged))?;
    writer.write(BGC_SUMMARY_TSV, |p| {
        tsv::write_metrics_file(p, &analysis.summary().metrics())
    })?;
    writer.write(CLASS_PRODUCT_TSV, |p| {
        tsv::write_tsv_file(p, &analysis.class_product_counts)
    })?;

    if analysis.annotation.clusters.is_empty() {
        warn!("No candidate clusters were found, charts will be empty");
    }
    writer.write(PRODUCT_CHART, |p| {
        charts::write_svg(p, &product_chart(analysis).render(config))
    })?;
    writer.write(CLASS_PRODUCT_CHART, |p| {
        charts::write_svg(p, &class_product_chart(analysis).render(config))
    })?;

    Ok(writer.written)
}

/// Scatter of GC against coverage, colored by `hue`. Only contigs of bins
/// with a GTDB-tk classification are plotted.
pub fn blob_chart<F>(analysis: &BlobAnalysis, title: &str, hue_label: &str, hue: F) -> ScatterPlot
where
    F: Fn(&WithTaxonomy<BlobContig>) -> Option<&str>,
{
    let points = analysis
        .merged
        .iter()
        .filter_map(|r| {
            r.taxonomy.as_ref()?;
            let coverage = r.row.coverage?;
            Some(ScatterPoint {
                x: r.row.gc_content,
                y: coverage,
                size: r.row.length.unwrap_or(0) as f64,
                group: hue(r).map(str::to_string),
            })
        })
        .collect();

    ScatterPlot {
        title: title.to_string(),
        x_label: "gc_content".to_string(),
        y_label: "coverage".to_string(),
        hue_label: hue_label.to_string(),
        size_label: "length".to_string(),
        log_y: true,
        points,
    }
}

pub fn write_blob_artifacts(
    analysis: &BlobAnalysis,
    out_dir: &Path,
    config: &ChartConfig,
) -> Result<Vec<PathBuf>, BinscopeError> {
    let mut writer = ArtifactWriter::new(out_dir);

    writer.write(BLOB_TSV, |p| tsv::write_tsv_file(p, &analysis.merged))?;

    let lowest_id = blob_chart(analysis, "Dereplicated genomes by lowest ID", "lowest_ID", |r| {
        r.lowest_id()
    });
    let class = blob_chart(analysis, "Dereplicated genomes by class", "class", |r| r.class());

    let classified = analysis
        .merged
        .iter()
        .filter(|r| r.taxonomy.is_some())
        .count();

    for (name, hue, plot) in [
        (BLOB_LOWEST_ID_CHART, "lowest_ID", lowest_id),
        (BLOB_CLASS_CHART, "class", class),
    ] {
        let skipped = plot.skipped_points() + (classified - plot.points.len());
        if skipped > 0 {
            warn!(
                "{} contigs without a positive coverage are left out of the {} plot",
                skipped, hue
            );
        }
        writer.write(name, |p| charts::write_svg(p, &plot.render(config)))?;
    }

    Ok(writer.written)
}
