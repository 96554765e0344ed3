//! Measurement records.
//!
//! A field reading (water level, gate opening) on a registered structure is
//! turned into a record holding the computed discharge and its performance
//! ratio against the structure's planned discharge. Storing the record is the
//! caller's job; this module only derives it.
//!
//! # Clock injection
//! `MeasurementRecord::compute` takes `now` rather than calling `Utc::now()`,
//! so records are deterministic in tests.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::fmt;

use crate::calculator::FlowCalculator;
use crate::config::ConfigError;
use crate::model::FlowError;
use crate::structures::Structure;

/// Offset of the sites' local time (Asia/Vientiane, no daylight saving).
pub const SITE_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Ratio of actual to planned discharge, defined as 0 for a zero plan.
pub fn performance_ratio(actual: f64, planned: f64) -> f64 {
    if planned == 0.0 { 0.0 } else { actual / planned }
}

/// Formats a UTC instant in the sites' local time, e.g. `5/1/2024, 8:00:00 PM`.
pub fn to_local_display(timestamp: DateTime<Utc>) -> String {
    const FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
    match FixedOffset::east_opt(SITE_UTC_OFFSET_SECS) {
        Some(offset) => timestamp.with_timezone(&offset).format(FORMAT).to_string(),
        None => timestamp.format(FORMAT).to_string(),
    }
}

#[derive(Debug)]
pub enum RecordError {
    /// The structure's registry entry cannot be resolved to dimensions.
    Structure(ConfigError),
    /// The structure has no planned discharge to compare against.
    NoPlannedFlow(String),
    /// No discharge could be computed for the reading.
    Flow(FlowError),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Structure(err) => write!(f, "{}", err),
            RecordError::NoPlannedFlow(id) => write!(f, "Structure {} has no planned flow", id),
            RecordError::Flow(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::Structure(err) => Some(err),
            RecordError::Flow(err) => Some(err),
            RecordError::NoPlannedFlow(_) => None,
        }
    }
}

impl From<ConfigError> for RecordError {
    fn from(err: ConfigError) -> Self {
        RecordError::Structure(err)
    }
}

impl From<FlowError> for RecordError {
    fn from(err: FlowError) -> Self {
        RecordError::Flow(err)
    }
}

/// A reading together with its computed discharge and performance ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub structure_id: String,
    pub water_level_cm: f64,
    pub gate_opening_cm: f64,
    pub q_planned: f64,
    pub q_actual: f64,
    pub k: f64,
    pub recorded_at: DateTime<Utc>,
}

impl MeasurementRecord {
    pub fn compute(
        calculator: &FlowCalculator,
        structure: &Structure,
        water_level_cm: f64,
        gate_opening_cm: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        let q_planned = structure
            .planned_flow
            .ok_or_else(|| RecordError::NoPlannedFlow(structure.id.clone()))?;
        let dims = structure.dimensions()?;
        let q_actual =
            calculator.compute_for(&structure.id, water_level_cm, gate_opening_cm, &dims)?;

        Ok(Self {
            structure_id: structure.id.clone(),
            water_level_cm,
            gate_opening_cm,
            q_planned,
            q_actual,
            k: performance_ratio(q_actual, q_planned),
            recorded_at: now,
        })
    }

    pub fn local_timestamp(&self) -> String {
        to_local_display(self.recorded_at)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
