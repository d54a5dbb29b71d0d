//! Configuration loading and validation.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Merging CLI arguments over the file values
//! - Validating the result before a run starts

pub mod loader;
pub mod validation;

pub use loader::{Config, NetworkConfig, OptionsConfig};
pub use validation::{parse_post_shortcode, parse_time_window, validate_config};
