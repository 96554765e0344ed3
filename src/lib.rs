/// wlmsys_flow: discharge calculation for water-control structures.
///
/// Computes the flow through a broad-crested weir (closed-form formula) or a
/// sluice gate (generated discharge table + bilinear interpolation) from a
/// field reading of water level and gate opening.
///
/// # Module structure
///
/// ```text
/// wlmsys_flow
/// ├── model       — shared data types (StructureDimensions, DischargeTableRow, FlowError, …)
/// ├── config      — empirical coefficients and table grid, TOML / .env loading
/// ├── hydraulics
/// │   ├── weir        — broad-crested weir formula
/// │   ├── table       — sluice gate discharge table
/// │   └── interpolate — bilinear interpolation with corner fallback
/// ├── calculator  — FlowCalculator, dispatch on structure type
/// ├── structures  — structure registry and "<id>_<tag>" selection values
/// ├── record      — measurement records, performance ratio K, local time
/// └── logging     — structured logging and failure classification
/// ```

pub mod calculator;
pub mod config;
pub mod hydraulics;
pub mod logging;
pub mod model;
pub mod record;
pub mod structures;

pub use calculator::FlowCalculator;
pub use config::ModelConfig;
pub use model::{FlowError, StructureDimensions};
