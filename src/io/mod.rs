//! CSV import and export for the pipeline's flat-file interfaces.

pub mod export;
pub mod import;
