//! Media data model and discovery-side iteration.
//!
//! This module provides:
//! - The `MediaRecord` sum type (image / video / sidecar)
//! - Parsing of raw feed nodes into records
//! - The flattener turning a page source into an ordered record sequence

pub mod flatten;
pub mod parser;
pub mod record;

pub use flatten::{MediaFlattener, TimeWindow};
pub use parser::parse_media_node;
pub use record::{MediaKind, MediaRecord};
