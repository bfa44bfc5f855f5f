//! Travel journal posts: YAML frontmatter parsing and queries over the
//! resulting records.

pub mod aggregator;
pub mod archive;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod pins;
pub mod query;
pub mod record;
pub mod source;
pub mod stats;
pub mod values;

pub use aggregator::{BlogAggregator, BlogPost, DocumentReport};
pub use config::AggregatorConfig;
pub use frontmatter::{Fields, ParsedDocument};
pub use record::{BlogRecord, Coordinates, Location, ValidationResult};
pub use source::{DirectorySource, DocumentSource, MemorySource};
