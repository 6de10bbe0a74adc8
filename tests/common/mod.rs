#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding the inputs and outputs of one test
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write `bins/<name>.fasta` for every bin and return the directory
    pub fn create_bins(&self, bins: &[(&str, &[(&str, &str)])]) -> Result<PathBuf> {
        let dir = self.path("bins");
        fs::create_dir_all(&dir)?;
        for (name, contigs) in bins {
            fs::write(dir.join(format!("{}.fasta", name)), fasta(contigs))?;
        }
        Ok(dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path("results")
    }
}

pub fn binscope_cmd() -> Command {
    Command::cargo_bin("binscope").expect("binscope binary should be built")
}

pub fn fasta(contigs: &[(&str, &str)]) -> String {
    let mut content = String::new();
    for (id, sequence) in contigs {
        content.push_str(&format!(">{}\n{}\n", id, sequence));
    }
    content
}

/// A candidate cluster as antiSMASH writes it
pub struct Cluster<'a> {
    pub location: &'a str,
    pub product: &'a str,
    pub contig_edge: bool,
    pub kind: &'a str,
    pub protoclusters: u32,
}

impl<'a> Cluster<'a> {
    pub fn new(location: &'a str, product: &'a str) -> Self {
        Self {
            location,
            product,
            contig_edge: false,
            kind: "single",
            protoclusters: 1,
        }
    }

    pub fn on_edge(mut self) -> Self {
        self.contig_edge = true;
        self
    }
}

const QUALIFIER_INDENT: &str = "                     ";

/// One antiSMASH region record for the contig `original_id`
pub fn antismash_record(original_id: &str, clusters: &[Cluster]) -> String {
    let q = QUALIFIER_INDENT;
    let mut text = format!(
        "LOCUS       {:<16}     5000 bp    DNA     linear   UNK 01-JAN-1980\n",
        "c00001_NODE_1.."
    );
    text.push_str(&format!("DEFINITION  {}.\n", original_id));
    text.push_str("COMMENT     ##antiSMASH-Data-START##\n");
    text.push_str("            Version      :: 6.1.1\n");
    text.push_str(&format!("            Original ID  :: {}\n", original_id));
    text.push_str("            ##antiSMASH-Data-END##\n");
    text.push_str("FEATURES             Location/Qualifiers\n");
    for cluster in clusters {
        text.push_str(&format!("     region          {}\n", cluster.location));
        text.push_str(&format!("{q}/product=\"{}\"\n", cluster.product));
        text.push_str(&format!("     cand_cluster    {}\n", cluster.location));
        text.push_str(&format!(
            "{q}/contig_edge=\"{}\"\n",
            if cluster.contig_edge { "True" } else { "False" }
        ));
        text.push_str(&format!("{q}/kind=\"{}\"\n", cluster.kind));
        text.push_str(&format!("{q}/product=\"{}\"\n", cluster.product));
        text.push_str(&format!("{q}/protoclusters=\"{}\"\n", cluster.protoclusters));
    }
    text.push_str("ORIGIN\n");
    text.push_str("        1 acgtacgtac gtacgtacgt\n");
    text.push_str("//\n");
    text
}

pub fn gtdb_table(rows: &[(&str, &str)]) -> String {
    let mut content = String::from("user_genome\tclassification\tfastani_reference\tnote\n");
    for (bin, classification) in rows {
        content.push_str(&format!("{}\t{}\tN/A\tN/A\n", bin, classification));
    }
    content
}

pub const STREPTOMYCES: &str =
    "d__Bacteria;p__Actinobacteriota;c__Actinomycetia;o__Streptomycetales;f__Streptomycetaceae;g__Streptomyces;s__";
pub const BACILLUS: &str = "d__Bacteria;p__Firmicutes;c__Bacilli;o__Bacillales;f__;g__;s__";
pub const NITROSOPUMILUS: &str =
    "d__Archaea;p__Thermoproteota;c__Nitrososphaeria;o__Nitrososphaerales;f__Nitrosopumilaceae;g__Nitrosopumilus;s__";

/// Lines of a TSV file split into cells, header included
pub fn read_tsv(path: &Path) -> Result<Vec<Vec<String>>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect())
}

/// The standard three-bin, two-contig-overlap scenario used across tests
pub struct BgcScenario {
    pub env: TestEnvironment,
    pub antismash: PathBuf,
    pub bins: PathBuf,
    pub bacteria: PathBuf,
    pub archaea: PathBuf,
}

impl BgcScenario {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;

        let mut gbk = antismash_record(
            "NODE_1_length_48000_cov_3.2",
            &[Cluster::new("101..20100", "NRPS")],
        );
        gbk.push_str(&antismash_record(
            "NODE_2_length_9000_cov_7.0",
            &[Cluster::new("1..4000", "terpene").on_edge()],
        ));
        gbk.push_str(&antismash_record(
            "NODE_7_length_30000_cov_1.5",
            &[Cluster::new("5001..6000", "other")],
        ));
        let antismash = env.create_input_file("gene_clusters.gbk", &gbk)?;

        let bins = env.create_bins(&[
            (
                "bin.1",
                &[
                    ("NODE_1_length_48000_cov_3.2", "GGCC"),
                    ("NODE_3_length_500_cov_2.0", "ATAT"),
                ],
            ),
            (
                "bin.2",
                &[
                    ("NODE_2_length_9000_cov_7.0", "GCAT"),
                    ("NODE_3_length_500_cov_2.0", "ATAT"),
                ],
            ),
            ("bin.3", &[("NODE_4_length_800_cov_9.0", "GCGA")]),
        ])?;

        let bacteria = env.create_input_file(
            "gtdbtk.bac120.summary.tsv",
            &gtdb_table(&[("bin.1", STREPTOMYCES), ("bin.2", BACILLUS)]),
        )?;
        let archaea = env.create_input_file(
            "gtdbtk.ar53.summary.tsv",
            &gtdb_table(&[("bin.3", NITROSOPUMILUS)]),
        )?;

        Ok(Self {
            env,
            antismash,
            bins,
            bacteria,
            archaea,
        })
    }
}
