//! Empirical model configuration.
//!
//! Every coefficient of the weir formula and the sluice gate discharge
//! polynomial, plus the discharge table grid, lives in [`ModelConfig`].
//! Defaults reproduce the calibrated field model; a TOML file may override
//! any subset of fields if the model is recalibrated for a deployment.
//!
//! ```toml
//! [grid]
//! max_raw_level_cm = 500
//!
//! [sluice]
//! contraction = 0.6
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Environment variable naming the model file, read after loading `.env`.
pub const MODEL_CONFIG_ENV: &str = "WLMSYS_MODEL_CONFIG";

/// Most decimal places a rounded discharge may keep. Beyond this `10^d`
/// stops being exact and eventually overflows.
pub const MAX_DECIMALS: u32 = 15;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: String, source: std::io::Error },
    /// The file is not valid TOML for the expected shape.
    Parse(String),
    /// The file parsed but describes an unusable model or structure.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Cannot read {}: {}", path, source),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

/// Coefficients of the broad-crested weir formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeirCoefficients {
    /// Discharge coefficient at zero head ratio.
    pub cd_base: f64,
    /// Increase of the discharge coefficient per unit head ratio.
    pub cd_head_slope: f64,
    /// Approach velocity cubic, highest order first.
    pub cv_c3: f64,
    pub cv_c2: f64,
    pub cv_c1: f64,
    pub cv_c0: f64,
    /// Gravitational acceleration, m/s².
    pub gravity: f64,
}

impl Default for WeirCoefficients {
    fn default() -> Self {
        Self {
            cd_base: 0.93,
            cd_head_slope: 0.1,
            cv_c3: 0.255,
            cv_c2: 0.06,
            cv_c1: 0.0263,
            cv_c0: 1.0001,
            gravity: 9.8,
        }
    }
}

/// Coefficients of the sluice gate discharge model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SluiceCoefficients {
    /// Quintic in the opening/head ratio, `r^5` term first.
    pub poly: [f64; 6],
    /// Twice the gravitational acceleration, m/s².
    pub two_g: f64,
    /// Vena contracta coefficient applied to the gate opening.
    pub contraction: f64,
    /// Decimal places kept on each table flow.
    pub flow_decimals: u32,
}

impl Default for SluiceCoefficients {
    fn default() -> Self {
        Self {
            poly: [-0.82, 1.4048, -0.6713, 0.2075, 0.0063, 0.5881],
            two_g: 19.6,
            contraction: 0.61,
            flow_decimals: 2,
        }
    }
}

/// Sampling grid of the sluice gate discharge table, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableGrid {
    /// Spacing of both axes.
    pub step_cm: i32,
    /// Highest raw water level the table must cover.
    pub max_raw_level_cm: i32,
    pub min_gate_opening_cm: i32,
    pub max_gate_opening_cm: i32,
}

impl Default for TableGrid {
    fn default() -> Self {
        Self {
            step_cm: 5,
            max_raw_level_cm: 400,
            min_gate_opening_cm: 5,
            max_gate_opening_cm: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weir: WeirCoefficients,
    pub sluice: SluiceCoefficients,
    pub grid: TableGrid,
    /// Decimal places kept on an interpolated sluice gate discharge.
    pub interpolated_decimals: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weir: WeirCoefficients::default(),
            sluice: SluiceCoefficients::default(),
            grid: TableGrid::default(),
            interpolated_decimals: 3,
        }
    }
}

impl ModelConfig {
    /// Parses and validates a model from TOML text. Absent fields keep their
    /// default values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a model file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = read_file(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        crate::logging::info(
            crate::logging::Component::Config,
            None,
            &format!("Loaded model configuration from {}", path.as_ref().display()),
        );
        Ok(config)
    }

    /// Loads the model named by `WLMSYS_MODEL_CONFIG` (a `.env` file is
    /// honoured). Without the variable the default model is returned.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        match std::env::var(MODEL_CONFIG_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.step_cm <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid.step_cm must be positive, got {}",
                grid.step_cm
            )));
        }
        if grid.min_gate_opening_cm <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid.min_gate_opening_cm must be positive, got {}",
                grid.min_gate_opening_cm
            )));
        }
        if grid.min_gate_opening_cm > grid.max_gate_opening_cm {
            return Err(ConfigError::Invalid(format!(
                "gate opening range is empty: {}..={}",
                grid.min_gate_opening_cm, grid.max_gate_opening_cm
            )));
        }
        if grid.min_gate_opening_cm % grid.step_cm != 0
            || grid.max_gate_opening_cm % grid.step_cm != 0
        {
            return Err(ConfigError::Invalid(format!(
                "gate opening bounds must be multiples of the {} cm step",
                grid.step_cm
            )));
        }
        if grid.max_raw_level_cm < 0 {
            return Err(ConfigError::Invalid(format!(
                "grid.max_raw_level_cm must not be negative, got {}",
                grid.max_raw_level_cm
            )));
        }
        for (field, decimals) in [
            ("interpolated_decimals", self.interpolated_decimals),
            ("sluice.flow_decimals", self.sluice.flow_decimals),
        ] {
            if decimals > MAX_DECIMALS {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at most {}, got {}",
                    field, MAX_DECIMALS, decimals
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
