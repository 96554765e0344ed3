/// Core data types for the structure flow engine.
///
/// This module defines the shared domain model imported by all other modules:
/// the closed set of structure dimension records, the rows of a sluice gate
/// discharge table, and the error taxonomy of a single flow calculation.
/// It contains no logic beyond tag parsing and error formatting.

use std::fmt;

// ---------------------------------------------------------------------------
// Structure type tags
// ---------------------------------------------------------------------------

/// Type tag used for broad-crested weirs.
pub const TAG_BCW: &str = "BCW";

/// Type tag used for sluice gates.
pub const TAG_SG: &str = "SG";

/// The structure family named by a type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureType {
    BroadCrestedWeir,
    SluiceGate,
    /// Any tag without a discharge model (e.g. "TW", the trapezoidal weir).
    Other(String),
}

impl StructureType {
    /// Parses a type tag. Matching is exact; unknown tags are kept verbatim.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            TAG_BCW => StructureType::BroadCrestedWeir,
            TAG_SG => StructureType::SluiceGate,
            other => StructureType::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            StructureType::BroadCrestedWeir => TAG_BCW,
            StructureType::SluiceGate => TAG_SG,
            StructureType::Other(tag) => tag,
        }
    }
}

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// Physical parameters of a broad-crested weir, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeirDimensions {
    /// Crest width.
    pub bc: f64,
    /// Upstream head above crest.
    pub p1: f64,
    /// Characteristic length used in the head ratio.
    pub l: f64,
}

/// Physical parameters of a sluice gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SluiceGateDimensions {
    /// Gate width, in centimetres.
    pub b: f64,
    /// Height correction (bed/sill offset), in centimetres.
    pub hc: f64,
    /// Multiplier applied to the single-gate discharge.
    pub num_gates: f64,
}

/// Dimensions of a water-control structure, one variant per structure type.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureDimensions {
    BroadCrestedWeir(WeirDimensions),
    SluiceGate(SluiceGateDimensions),
    /// A structure whose type has no discharge model.
    Unsupported { tag: String },
}

// ---------------------------------------------------------------------------
// Discharge table rows
// ---------------------------------------------------------------------------

/// One grid point of a sluice gate discharge table.
///
/// Both coordinates are centimetres on the table grid. `flow` is `None` when
/// the discharge is undefined at this point (negative square-root argument);
/// such rows are kept so the table layout does not depend on the height
/// correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeTableRow {
    pub corrected_level: i32,
    pub gate_opening: i32,
    pub flow: Option<f64>,
}

impl DischargeTableRow {
    pub fn key(&self) -> (i32, i32) {
        (self.corrected_level, self.gate_opening)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Outcomes of a flow calculation that produce no discharge value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Inputs outside the domain of the empirical model (non-positive weir
    /// head, undefined table corner, non-finite input or result).
    OutOfDomain { reason: String },
    /// The structure type has no discharge model.
    UnsupportedStructureType(String),
    /// None of the four table corners around the query point exist.
    NoInterpolationData { level: f64, gate_opening: f64 },
}

impl FlowError {
    pub fn out_of_domain(reason: impl Into<String>) -> Self {
        FlowError::OutOfDomain {
            reason: reason.into(),
        }
    }

    /// `true` for outcomes that are a normal consequence of the table domain
    /// rather than a bad input or configuration.
    pub fn is_expected(&self) -> bool {
        matches!(self, FlowError::NoInterpolationData { .. })
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::OutOfDomain { reason } => write!(f, "Out of domain: {}", reason),
            FlowError::UnsupportedStructureType(tag) => {
                write!(f, "Unsupported structure type: {}", tag)
            }
            FlowError::NoInterpolationData {
                level,
                gate_opening,
            } => write!(
                f,
                "No interpolation data at corrected level {} cm, gate opening {} cm",
                level, gate_opening
            ),
        }
    }
}

impl std::error::Error for FlowError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
