//! Legality outcomes and their aggregates.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use vms_bundle::BundleId;
use vms_corpus::RegimeMap;
use vms_types::{ClassId, FolioId, LegalityStatus, Regime};

/// Outcome for one (bundle, B-folio) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolioLegality {
    pub status: LegalityStatus,
    pub surviving_classes: BTreeSet<ClassId>,
}

/// Per-folio outcomes for one bundle, keyed by folio id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegalityResult {
    pub bundle_id: BundleId,
    pub folios: BTreeMap<FolioId, FolioLegality>,
}

impl LegalityResult {
    #[must_use]
    pub fn get(&self, folio: &FolioId) -> Option<&FolioLegality> {
        self.folios.get(folio)
    }

    #[must_use]
    pub fn status_of(&self, folio: &FolioId) -> Option<LegalityStatus> {
        self.folios.get(folio).map(|f| f.status)
    }

    /// Number of folios in each status. Every status is present, zero or not.
    #[must_use]
    pub fn status_counts(&self) -> BTreeMap<LegalityStatus, usize> {
        let mut counts: BTreeMap<LegalityStatus, usize> = [
            LegalityStatus::Reachable,
            LegalityStatus::Conditional,
            LegalityStatus::Unreachable,
        ]
        .into_iter()
        .map(|status| (status, 0))
        .collect();
        for folio in self.folios.values() {
            *counts.entry(folio.status).or_default() += 1;
        }
        counts
    }

    /// Folios with `status`, ordered.
    pub fn folios_with(&self, status: LegalityStatus) -> impl Iterator<Item = &FolioId> {
        self.folios
            .iter()
            .filter(move |(_, f)| f.status == status)
            .map(|(folio, _)| folio)
    }

    /// Status tallies grouped by REGIME label. Unlabelled folios are left out.
    #[must_use]
    pub fn status_by_regime(
        &self,
        regimes: &RegimeMap,
    ) -> BTreeMap<Regime, BTreeMap<LegalityStatus, usize>> {
        let mut grouped: BTreeMap<Regime, BTreeMap<LegalityStatus, usize>> = BTreeMap::new();
        for (folio, legality) in &self.folios {
            if let Some(regime) = regimes.regime_of(folio) {
                *grouped
                    .entry(regime)
                    .or_default()
                    .entry(legality.status)
                    .or_default() += 1;
            }
        }
        grouped
    }

    /// Number of folios on which each class survives.
    #[must_use]
    pub fn class_survival_counts(&self) -> BTreeMap<ClassId, usize> {
        let mut counts = BTreeMap::new();
        for folio in self.folios.values() {
            for class in &folio.surviving_classes {
                *counts.entry(*class).or_default() += 1;
            }
        }
        counts
    }

    /// Classes surviving on at least one folio.
    #[must_use]
    pub fn surviving_union(&self) -> BTreeSet<ClassId> {
        self.folios
            .values()
            .flat_map(|f| f.surviving_classes.iter().copied())
            .collect()
    }
}
