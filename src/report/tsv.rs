//! Tab-separated report tables.
//!
//! Missing values are written as empty cells and booleans as `True`/`False`,
//! matching what antiSMASH puts in its own qualifiers.

use crate::core::annotation::ClusterRow;
use crate::core::bins::BlobContig;
use crate::core::merge::{BinClusterRow, ClassProductCount, WithTaxonomy};
use crate::BinscopeError;
use std::io::Write;
use std::path::Path;

/// A row that can be written as one line of a TSV table
pub trait TsvRow {
    fn header() -> Vec<&'static str>;
    fn fields(&self) -> Vec<String>;
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

const CLUSTER_COLUMNS: [&str; 6] = [
    "contig_length",
    "candidate_cluster_length",
    "on_contig_edge",
    "number_of_protoclusters",
    "candidate_cluster_kind",
    "product",
];

fn cluster_fields(cluster: Option<&ClusterRow>) -> Vec<String> {
    match cluster {
        Some(c) => vec![
            c.contig_length.to_string(),
            c.candidate_cluster_length.to_string(),
            flag(c.on_contig_edge).to_string(),
            c.number_of_protoclusters.to_string(),
            c.candidate_cluster_kind.clone(),
            c.product.clone(),
        ],
        None => vec![String::new(); CLUSTER_COLUMNS.len()],
    }
}

impl TsvRow for BinClusterRow {
    fn header() -> Vec<&'static str> {
        let mut header = vec!["bin", "contig"];
        header.extend(CLUSTER_COLUMNS);
        header
    }

    fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.bin.clone(), self.contig.clone()];
        fields.extend(cluster_fields(self.cluster.as_ref()));
        fields
    }
}

impl TsvRow for WithTaxonomy<BinClusterRow> {
    fn header() -> Vec<&'static str> {
        let mut header = BinClusterRow::header();
        header.extend(["classification", "class"]);
        header
    }

    fn fields(&self) -> Vec<String> {
        let mut fields = self.row.fields();
        fields.push(opt(self.classification()));
        fields.push(opt(self.class()));
        fields
    }
}

impl TsvRow for WithTaxonomy<BlobContig> {
    fn header() -> Vec<&'static str> {
        vec![
            "mag",
            "header",
            "length",
            "coverage",
            "gc_content",
            "classification",
            "class",
            "lowest_ID",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.row.bin.clone(),
            self.row.contig.clone(),
            opt(self.row.length),
            opt(self.row.coverage),
            self.row.gc_content.to_string(),
            opt(self.classification()),
            opt(self.class()),
            opt(self.lowest_id()),
        ]
    }
}

impl TsvRow for ClassProductCount {
    fn header() -> Vec<&'static str> {
        vec!["class", "product", "bgc_count"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.class.clone(),
            self.product.clone(),
            self.count.to_string(),
        ]
    }
}

pub fn write_tsv<T: TsvRow, W: Write>(writer: W, rows: &[T]) -> Result<(), BinscopeError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    writer.write_record(T::header())?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_tsv_file<T: TsvRow>(path: &Path, rows: &[T]) -> Result<(), BinscopeError> {
    let file = std::fs::File::create(path)?;
    write_tsv(std::io::BufWriter::new(file), rows)
}

/// Write `metric<TAB>value` pairs
pub fn write_metrics_file(path: &Path, metrics: &[(&str, String)]) -> Result<(), BinscopeError> {
    let file = std::fs::File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(std::io::BufWriter::new(file));

    writer.write_record(["metric", "value"])?;
    for (metric, value) in metrics {
        writer.write_record([*metric, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: TsvRow>(rows: &[T]) -> String {
        let mut buffer = Vec::new();
        write_tsv(&mut buffer, rows).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_unmatched_rows_have_empty_cells() {
        let rows = vec![
            BinClusterRow {
                bin: "bin.1".to_string(),
                contig: "c1".to_string(),
                cluster: None,
            },
            BinClusterRow {
                bin: "bin.1".to_string(),
                contig: "c2".to_string(),
                cluster: Some(ClusterRow {
                    contig: "c2".to_string(),
                    contig_length: 9000,
                    candidate_cluster_length: 4000,
                    on_contig_edge: true,
                    number_of_protoclusters: 2,
                    candidate_cluster_kind: "neighbouring".to_string(),
                    product: "NRPS".to_string(),
                }),
            },
        ];

        let text = render(&rows);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "bin\tcontig\tcontig_length\tcandidate_cluster_length\ton_contig_edge\tnumber_of_protoclusters\tcandidate_cluster_kind\tproduct"
        );
        assert_eq!(lines[1], "bin.1\tc1\t\t\t\t\t\t");
        assert_eq!(lines[2], "bin.1\tc2\t9000\t4000\tTrue\t2\tneighbouring\tNRPS");
    }

    #[test]
    fn test_blob_rows() {
        let rows = vec![WithTaxonomy {
            row: BlobContig {
                bin: "bin.1".to_string(),
                contig: "NODE_1_length_4_cov_2.5".to_string(),
                length: Some(4),
                coverage: Some(2.5),
                gc_content: 50.0,
            },
            taxonomy: None,
        }];

        let text = render(&rows);
        assert_eq!(
            text.lines().nth(1),
            Some("bin.1\tNODE_1_length_4_cov_2.5\t4\t2.5\t50\t\t\t")
        );
    }

    #[test]
    fn test_header_only_for_no_rows() {
        let rows: Vec<ClassProductCount> = Vec::new();
        assert_eq!(render(&rows), "class\tproduct\tbgc_count\n");
    }
}
