/// Command-line interface
pub mod cli;
/// Configuration values, INI loading and defaults
pub mod configuration;
/// Error types
pub mod error;
/// Image decoding and PNG export
pub mod image;
/// Diagnostic output setup
pub mod logging;
/// Composition progress display
pub mod progress;
