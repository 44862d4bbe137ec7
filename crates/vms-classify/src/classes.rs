//! Precomputed instruction-class table.
//!
//! The table is an external fixture: a JSON document listing each class with
//! its functional role and member tokens.
//!
//! ```json
//! {
//!   "version": 1,
//!   "classes": [
//!     { "id": 1, "role": "CORE_CONTROL", "members": ["daiin", "ol"] },
//!     { "id": 8, "role": "ENERGY_OPERATOR", "members": ["chedy", "shedy"] }
//!   ]
//! }
//! ```
//!
//! A token may belong to at most one class. Member MIDDLEs are derived once
//! with the workbench decomposer when the table is loaded.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use vms_corpus::{load_json_fixture, parse_json_fixture};
use vms_error::{Result, VmsError};
use vms_morph::Decomposer;
use vms_types::{ClassId, FunctionalRole};

const LOG_COMPONENT: &str = "vms.classify.classes";

/// Fixture name used in error messages.
pub const CLASS_TABLE_FIXTURE: &str = "instruction_classes";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassTable {
    version: u32,
    classes: Vec<RawClass>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClass {
    id: u16,
    role: FunctionalRole,
    members: Vec<String>,
}

/// One equivalence class of B tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionClass {
    pub id: ClassId,
    pub role: FunctionalRole,
    pub members: BTreeSet<String>,
    /// Distinct MIDDLEs of the members.
    pub middles: BTreeSet<String>,
    /// At least one member decomposes without a MIDDLE.
    pub has_atomic_member: bool,
}

impl InstructionClass {
    /// True if any member MIDDLE is in `legal`, or any member is atomic.
    #[must_use]
    pub fn survives(&self, legal: impl Fn(&str) -> bool) -> bool {
        self.has_atomic_member || self.middles.iter().any(|m| legal(m))
    }
}

/// Loaded instruction-class table with token and MIDDLE indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionClassTable {
    version: u32,
    classes: BTreeMap<ClassId, InstructionClass>,
    by_token: BTreeMap<String, ClassId>,
    by_middle: BTreeMap<String, BTreeSet<ClassId>>,
}

impl InstructionClassTable {
    /// Load the class fixture. Absence is fatal.
    pub fn load(path: &Path, decomposer: &Decomposer) -> Result<Self> {
        let raw: RawClassTable = load_json_fixture(path, CLASS_TABLE_FIXTURE)?;
        let table = Self::from_raw(raw, decomposer)?;
        info!(
            component = LOG_COMPONENT,
            path = %path.display(),
            classes = table.len(),
            tokens = table.by_token.len(),
            "instruction class table loaded"
        );
        Ok(table)
    }

    pub fn from_json_str(text: &str, decomposer: &Decomposer) -> Result<Self> {
        let raw: RawClassTable = parse_json_fixture(text, CLASS_TABLE_FIXTURE)?;
        Self::from_raw(raw, decomposer)
    }

    fn from_raw(raw: RawClassTable, decomposer: &Decomposer) -> Result<Self> {
        if raw.version == 0 {
            return Err(VmsError::invalid_fixture(
                CLASS_TABLE_FIXTURE,
                "version must be at least 1",
            ));
        }
        let mut classes = BTreeMap::new();
        let mut by_token: BTreeMap<String, ClassId> = BTreeMap::new();
        let mut by_middle: BTreeMap<String, BTreeSet<ClassId>> = BTreeMap::new();

        for raw_class in raw.classes {
            let id = ClassId(raw_class.id);
            if classes.contains_key(&id) {
                return Err(VmsError::invalid_fixture(
                    CLASS_TABLE_FIXTURE,
                    format!("class {id} is declared twice"),
                ));
            }
            if raw_class.members.is_empty() {
                return Err(VmsError::invalid_fixture(
                    CLASS_TABLE_FIXTURE,
                    format!("class {id} has no members"),
                ));
            }
            let mut class = InstructionClass {
                id,
                role: raw_class.role,
                members: BTreeSet::new(),
                middles: BTreeSet::new(),
                has_atomic_member: false,
            };
            for token in raw_class.members {
                if token.is_empty() {
                    return Err(VmsError::invalid_fixture(
                        CLASS_TABLE_FIXTURE,
                        format!("class {id} lists an empty token"),
                    ));
                }
                if let Some(other) = by_token.insert(token.clone(), id) {
                    return Err(VmsError::invalid_fixture(
                        CLASS_TABLE_FIXTURE,
                        format!("token `{token}` is listed in both {other} and {id}"),
                    ));
                }
                match decomposer.decompose(&token).middle {
                    Some(middle) => {
                        by_middle.entry(middle.clone()).or_default().insert(id);
                        class.middles.insert(middle);
                    }
                    None => class.has_atomic_member = true,
                }
                class.members.insert(token);
            }
            classes.insert(id, class);
        }

        Ok(Self {
            version: raw.version,
            classes,
            by_token,
            by_middle,
        })
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Direct token lookup. Unknown tokens are `None`, not an error.
    #[must_use]
    pub fn classify_token(&self, token: &str) -> Option<ClassId> {
        self.by_token.get(token).copied()
    }

    #[must_use]
    pub fn class(&self, id: ClassId) -> Option<&InstructionClass> {
        self.classes.get(&id)
    }

    /// Classes in id order.
    pub fn classes(&self) -> impl Iterator<Item = &InstructionClass> {
        self.classes.values()
    }

    #[must_use]
    pub fn ids(&self) -> BTreeSet<ClassId> {
        self.classes.keys().copied().collect()
    }

    #[must_use]
    pub fn role_of(&self, id: ClassId) -> Option<FunctionalRole> {
        self.classes.get(&id).map(|class| class.role)
    }

    #[must_use]
    pub fn role_of_token(&self, token: &str) -> Option<FunctionalRole> {
        self.classify_token(token).and_then(|id| self.role_of(id))
    }

    /// Classes with at least one member carrying `middle`.
    #[must_use]
    pub fn classes_with_middle(&self, middle: &str) -> Option<&BTreeSet<ClassId>> {
        self.by_middle.get(middle)
    }

    /// MIDDLE → class-set index over every member MIDDLE.
    #[must_use]
    pub fn middle_index(&self) -> &BTreeMap<String, BTreeSet<ClassId>> {
        &self.by_middle
    }
}
