/// Structure registry for the water-level monitoring service.
///
/// Defines the water-control structures a field operator can report on,
/// with their type tag, physical dimensions and planned discharge. The
/// registry is loaded from a TOML file of `[[structure]]` tables:
///
/// ```toml
/// [[structure]]
/// id = "12"
/// name = "Main canal head regulator"
/// type = "SG"
/// b = 300.0
/// hc = 50.0
/// num_gates = 2.0
/// planned_flow = 5.5
/// ```
///
/// A reading form identifies the chosen structure as `"<id>_<type tag>"`;
/// `parse_selection` and `resolve_selection` turn that back into a registry
/// entry.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::config::{read_file, ConfigError};
use crate::logging::{self, Component};
use crate::model::{
    SluiceGateDimensions, StructureDimensions, StructureType, WeirDimensions,
};

// ---------------------------------------------------------------------------
// Structure metadata
// ---------------------------------------------------------------------------

/// One water-control structure as stored in the registry.
///
/// Dimension fields are optional because each type uses a different subset;
/// `dimensions` checks that the fields its type needs are present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Structure {
    pub id: String,
    pub name: String,
    /// Type tag, e.g. "BCW" or "SG".
    #[serde(rename = "type")]
    pub structure_type: String,
    pub bc: Option<f64>,
    pub p1: Option<f64>,
    pub l: Option<f64>,
    pub b: Option<f64>,
    pub hc: Option<f64>,
    pub num_gates: Option<f64>,
    /// Planned discharge; structures without one are not offered for readings.
    pub planned_flow: Option<f64>,
}

impl Structure {
    pub fn kind(&self) -> StructureType {
        StructureType::from_tag(&self.structure_type)
    }

    /// Resolves the dimension record for this structure's type.
    pub fn dimensions(&self) -> Result<StructureDimensions, ConfigError> {
        match self.kind() {
            StructureType::BroadCrestedWeir => Ok(StructureDimensions::BroadCrestedWeir(
                WeirDimensions {
                    bc: self.require(self.bc, "bc")?,
                    p1: self.require(self.p1, "p1")?,
                    l: self.require(self.l, "l")?,
                },
            )),
            StructureType::SluiceGate => Ok(StructureDimensions::SluiceGate(
                SluiceGateDimensions {
                    b: self.require(self.b, "b")?,
                    hc: self.require(self.hc, "hc")?,
                    num_gates: self.require(self.num_gates, "num_gates")?,
                },
            )),
            StructureType::Other(tag) => Ok(StructureDimensions::Unsupported { tag }),
        }
    }

    /// The value a reading form submits for this structure.
    pub fn selection_value(&self) -> String {
        format!("{}_{}", self.id, self.structure_type)
    }

    fn require(&self, value: Option<f64>, field: &str) -> Result<f64, ConfigError> {
        let value = value.ok_or_else(|| {
            ConfigError::Invalid(format!(
                "structure {} ({}) is missing `{}`",
                self.id, self.structure_type, field
            ))
        })?;
        if !value.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "structure {} ({}) has non-finite `{}` = {}",
                self.id, self.structure_type, field, value
            )));
        }
        Ok(value)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "structure")]
    structures: Vec<Structure>,
}

/// Parses registry TOML text. Duplicate identifiers are rejected.
pub fn parse_structures(text: &str) -> Result<Vec<Structure>, ConfigError> {
    let file: RegistryFile = toml::from_str(text)?;
    for (idx, structure) in file.structures.iter().enumerate() {
        if structure.id.is_empty() {
            return Err(ConfigError::Invalid(format!("structure #{} has an empty id", idx + 1)));
        }
        if file.structures[..idx].iter().any(|s| s.id == structure.id) {
            return Err(ConfigError::Invalid(format!(
                "duplicate structure id {}",
                structure.id
            )));
        }
    }
    Ok(file.structures)
}

/// Loads the registry from a TOML file.
pub fn load_structures<P: AsRef<Path>>(path: P) -> Result<Vec<Structure>, ConfigError> {
    let text = read_file(path.as_ref())?;
    let structures = parse_structures(&text)?;
    logging::info(
        Component::Registry,
        None,
        &format!(
            "Loaded {} structures from {}",
            structures.len(),
            path.as_ref().display()
        ),
    );
    Ok(structures)
}

/// Structures that have a planned discharge, in registry order.
pub fn structures_with_planned_flow(structures: &[Structure]) -> Vec<&Structure> {
    structures.iter().filter(|s| s.planned_flow.is_some()).collect()
}

/// Looks up a structure by identifier. Returns `None` if not found.
pub fn find_structure<'a>(structures: &'a [Structure], id: &str) -> Option<&'a Structure> {
    structures.iter().find(|s| s.id == id)
}

// ---------------------------------------------------------------------------
// Selection values
// ---------------------------------------------------------------------------

/// A decoded `"<id>_<type tag>"` selection value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub structure_id: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The value is not of the form `<id>_<tag>`.
    Malformed(String),
    /// No structure has the selected identifier.
    UnknownStructure(String),
    /// The structure exists but its type differs from the selected tag.
    TagMismatch { structure_id: String, expected: String, found: String },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Malformed(value) => write!(f, "Malformed selection: {:?}", value),
            SelectionError::UnknownStructure(id) => write!(f, "Unknown structure: {}", id),
            SelectionError::TagMismatch {
                structure_id,
                expected,
                found,
            } => write!(
                f,
                "Structure {} is {}, selection says {}",
                structure_id, expected, found
            ),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Splits a selection value at its first underscore.
pub fn parse_selection(value: &str) -> Result<Selection, SelectionError> {
    match value.trim().split_once('_') {
        Some((id, tag)) if !id.is_empty() && !tag.is_empty() => Ok(Selection {
            structure_id: id.to_string(),
            tag: tag.to_string(),
        }),
        _ => Err(SelectionError::Malformed(value.to_string())),
    }
}

/// Finds the structure a selection value refers to.
pub fn resolve_selection<'a>(
    structures: &'a [Structure],
    value: &str,
) -> Result<&'a Structure, SelectionError> {
    let selection = parse_selection(value)?;
    let structure = find_structure(structures, &selection.structure_id)
        .ok_or_else(|| SelectionError::UnknownStructure(selection.structure_id.clone()))?;
    if structure.structure_type != selection.tag {
        return Err(SelectionError::TagMismatch {
            structure_id: selection.structure_id,
            expected: structure.kind().tag().to_string(),
            found: selection.tag,
        });
    }
    Ok(structure)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
