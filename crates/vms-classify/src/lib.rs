//! Token and MIDDLE classification.
//!
//! * [`MiddleClassifier`] stratifies the Currier-A vocabulary into RI,
//!   PP_AZC and PP_BNATIVE from corpus-wide set membership.
//! * [`InstructionClassTable`] is the precomputed class fixture: token →
//!   class id, class → functional role, class → member MIDDLEs.
//! * [`DerivedIndices`] are the JSON index files built from both.

pub mod classes;
pub mod indices;
pub mod middle;

pub use classes::{CLASS_TABLE_FIXTURE, InstructionClass, InstructionClassTable};
pub use indices::{
    DerivedIndices, FOLIO_FOOTPRINTS_FILE, FOLIO_REGIMES_FILE, MIDDLE_CLASSES_FILE,
};
pub use middle::{MiddleClassifier, StratumCounts, classify_middle};
