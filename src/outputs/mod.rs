//! Output generation for scrape runs.
//!
//! - [`json`]: writes the classified records of one run to a dated JSON file

pub mod json;
