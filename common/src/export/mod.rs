//! Export core modules shared across CLI and WASM wrappers.

pub mod delimited;

#[cfg(feature = "excel")]
pub mod excel_core;

pub use delimited::{to_csv, to_tsv, Delimiter};
