//! Classification domain model.
//!
//! # Responsibility
//! - Define the cell classification states and their transition table.
//! - Read and write classification through host-owned cell metadata.
//!
//! # Invariants
//! - Classification is derived from metadata, never cached apart from it.
//! - The legacy `is_solution` flag is migrated on first observation.

pub mod classification;
pub mod metadata;
