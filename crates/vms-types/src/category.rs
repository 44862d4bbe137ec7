//! Closed category enums produced by the classifier and legality engine.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Corpus systems
// ---------------------------------------------------------------------------

/// Which sub-corpus a token contributes vocabulary to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusSystem {
    /// Currier A paragraph text.
    CurrierA,
    /// Currier B paragraph text.
    CurrierB,
    /// Diagram text on the zodiac/astronomical/cosmological folios.
    Azc,
    /// Unassigned text outside the AZC sections.
    Unassigned,
}

impl CorpusSystem {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrierA => "currier_a",
            Self::CurrierB => "currier_b",
            Self::Azc => "azc",
            Self::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for CorpusSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MIDDLE classification
// ---------------------------------------------------------------------------

/// Vocabulary stratum of a MIDDLE.
///
/// `Ri` and the two `Pp*` variants partition the Currier-A vocabulary;
/// `NotApplicable` is a valid outcome for MIDDLEs outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MiddleClass {
    /// Registry-internal: attested in Currier A, never in Currier B.
    Ri,
    /// Pipeline-participating and also attested in AZC diagram text.
    PpAzc,
    /// Pipeline-participating, absent from AZC diagram text.
    #[serde(rename = "PP_BNATIVE")]
    PpBNative,
    /// Not part of the Currier-A vocabulary.
    NotApplicable,
}

impl MiddleClass {
    #[must_use]
    pub const fn is_pp(self) -> bool {
        matches!(self, Self::PpAzc | Self::PpBNative)
    }

    #[must_use]
    pub const fn is_ri(self) -> bool {
        matches!(self, Self::Ri)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ri => "RI",
            Self::PpAzc => "PP_AZC",
            Self::PpBNative => "PP_BNATIVE",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }
}

impl fmt::Display for MiddleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Instruction classes
// ---------------------------------------------------------------------------

/// Identifier of a precomputed instruction class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u16);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Functional role shared by the members of an instruction class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionalRole {
    CoreControl,
    EnergyOperator,
    FlowOperator,
    FrequentOperator,
    Auxiliary,
}

impl FunctionalRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CoreControl => "CORE_CONTROL",
            Self::EnergyOperator => "ENERGY_OPERATOR",
            Self::FlowOperator => "FLOW_OPERATOR",
            Self::FrequentOperator => "FREQUENT_OPERATOR",
            Self::Auxiliary => "AUXILIARY",
        }
    }
}

impl fmt::Display for FunctionalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// REGIME labels
// ---------------------------------------------------------------------------

/// Externally supplied 4-way label per B-folio. Used only as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "REGIME_1")]
    Regime1,
    #[serde(rename = "REGIME_2")]
    Regime2,
    #[serde(rename = "REGIME_3")]
    Regime3,
    #[serde(rename = "REGIME_4")]
    Regime4,
}

impl Regime {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regime1 => "REGIME_1",
            Self::Regime2 => "REGIME_2",
            Self::Regime3 => "REGIME_3",
            Self::Regime4 => "REGIME_4",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Bundle and legality outcomes
// ---------------------------------------------------------------------------

/// How a bundle's restricted MIDDLEs interact with the AZC constraint graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleType {
    /// Restricted MIDDLEs present and at least one AZC folio carries all of them.
    Activating,
    /// Restricted MIDDLEs present but no AZC folio carries all of them.
    Blocked,
    /// Only unrestricted MIDDLEs; compatible with every AZC folio.
    Neutral,
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Activating => "ACTIVATING",
            Self::Blocked => "BLOCKED",
            Self::Neutral => "NEUTRAL",
        })
    }
}

/// Terminal reachability state of a (bundle, B-folio) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalityStatus {
    Reachable,
    Conditional,
    Unreachable,
}

impl fmt::Display for LegalityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reachable => "REACHABLE",
            Self::Conditional => "CONDITIONAL",
            Self::Unreachable => "UNREACHABLE",
        })
    }
}
