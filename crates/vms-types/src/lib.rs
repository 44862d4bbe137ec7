//! Core type definitions shared across the workbench.
//!
//! Tokens are created once at corpus load and never mutated. The category
//! enums here replace the ad hoc string tags ("RI", "PP", "REACHABLE", ...)
//! with closed sum types so that every caller has to branch on every case.

pub mod category;
pub mod config;
pub mod token;

pub use category::{
    BundleType, ClassId, CorpusSystem, FunctionalRole, LegalityStatus, MiddleClass, Regime,
};
pub use config::{
    AnalysisConfig, DEFAULT_GALLOWS, DEFAULT_RESTRICTED_SPREAD_MAX, RecordGranularity,
};
pub use token::{FolioId, Language, Placement, PRIMARY_TRANSCRIBER, Token};
