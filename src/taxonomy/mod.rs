//! Expertise taxonomy
//!
//! A fixed category -> area -> topic tree, loaded from an embedded YAML
//! definition, with traversal helpers and a mapper that buckets free-text
//! expertise strings into canonical node IDs.

mod error;
mod node;
mod tree;
mod unified;

pub use error::{TaxonomyError, TaxonomyResult};
pub use node::TaxonomyNode;
pub use tree::Taxonomy;
pub use unified::{
    FacultyTopic, FacultyTopics, TaxonomySource, UnifiedMetadata, UnifiedNode, UnifiedTaxonomy,
    SYNC_STRATEGY, UNIFIED_TAXONOMY_VERSION,
};
