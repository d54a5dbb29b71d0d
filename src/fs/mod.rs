//! File system concerns: destinations and artifact naming.

pub mod dest;
pub mod naming;

pub use dest::Destination;
pub use naming::{sanitize_filename, NameGenerator, TemplateNamer};
