pub mod fasta;
pub mod genbank;
pub mod header;
pub mod sequence;
pub mod taxonomy;

pub use genbank::{Feature, FeatureLocation, GenBankRecord};
pub use header::ContigHeader;
pub use sequence::Sequence;
pub use taxonomy::Lineage;
