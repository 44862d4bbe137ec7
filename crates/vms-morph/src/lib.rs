//! Morphology decomposer: PREFIX + MIDDLE + SUFFIX (+ articulator).
//!
//! The MIDDLE is the canonical classification key for every downstream
//! component, so all of them must decompose with the same [`Decomposer`]
//! built from one versioned table file.

pub mod decompose;
pub mod tables;

pub use decompose::{Decomposer, MorphologicalRecord};
pub use tables::{CANONICAL_TABLES_TOML, MorphologyTables, TABLES_FIXTURE};
