//! Reachability / legality engine.
//!
//! Given a bundle, decides for every B-folio whether it is REACHABLE,
//! CONDITIONAL or UNREACHABLE and which instruction classes survive there.
//! See [`engine`] for the rules.

pub mod engine;
pub mod result;

pub use engine::{LegalityEngine, compute_bundle_legality, folio_status};
pub use result::{FolioLegality, LegalityResult};
