pub mod annotation;
pub mod bins;
pub mod config;
pub mod merge;
pub mod pipeline;
pub mod taxonomy_table;

pub use annotation::{AnnotationSummary, ClusterRow};
pub use bins::{BinContig, BinInventory, BinKeyed, BlobContig, BlobInventory};
pub use merge::{BinClusterRow, ClassProductCount, WithTaxonomy};
pub use pipeline::{BgcAnalysis, BgcInputs, BlobAnalysis, BlobInputs, TaxonomyInputs};
pub use taxonomy_table::{TaxonomyRow, TaxonomyTable};
