//! Records and bundles.
//!
//! [`build_records`] segments the Currier-A token stream; [`BundleRegistry`]
//! collapses records by PP MIDDLE-set and classifies each bundle against the
//! AZC folio vocabularies.

pub mod bundles;
pub mod records;

pub use bundles::{
    Bundle, BundleId, BundleRegistry, bundle_type, compatible_folios, is_restricted,
    restricted_middles,
};
pub use records::{Record, RecordToken, build_records};
