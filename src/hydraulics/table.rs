//! Sluice gate discharge table.
//!
//! The table samples the gate discharge model on a square grid of corrected
//! water level × gate opening. Only points where the opening does not exceed
//! the corrected head are generated; everything else is physically invalid
//! and simply absent from the table.
//!
//! Tables are built per calculation and never cached. Two tables built from
//! the same dimensions and model are equal.

use super::round_half_up;
use crate::config::{ModelConfig, SluiceCoefficients};
use crate::model::{DischargeTableRow, SluiceGateDimensions};

/// Grid of sluice gate discharges, sorted by `(corrected_level, gate_opening)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeTable {
    step: i32,
    rows: Vec<DischargeTableRow>,
}

impl DischargeTable {
    /// Generates the table for one sluice gate.
    ///
    /// Corrected levels run from 0 up to `max_raw_level_cm - hc` (never below
    /// 0), gate openings over the configured range, both in grid steps.
    pub fn build(dims: &SluiceGateDimensions, model: &ModelConfig) -> Self {
        let grid = &model.grid;
        let step = grid.step_cm;
        if step <= 0 {
            return Self::from_rows(step, Vec::new());
        }
        let max_corrected = (grid.max_raw_level_cm as f64 - dims.hc).max(0.0);
        if !max_corrected.is_finite() {
            return Self::from_rows(step, Vec::new());
        }

        let mut rows = Vec::new();
        let mut corrected = 0;
        while corrected as f64 <= max_corrected {
            let mut opening = grid.min_gate_opening_cm;
            while opening <= grid.max_gate_opening_cm {
                if corrected >= opening {
                    rows.push(DischargeTableRow {
                        corrected_level: corrected,
                        gate_opening: opening,
                        flow: gate_flow(corrected, opening, dims, &model.sluice),
                    });
                }
                opening += step;
            }
            match corrected.checked_add(step) {
                Some(next) => corrected = next,
                None => break,
            }
        }

        Self::from_rows(step, rows)
    }

    /// Wraps arbitrary rows, sorting them into table order.
    pub fn from_rows(step: i32, mut rows: Vec<DischargeTableRow>) -> Self {
        rows.sort_by_key(DischargeTableRow::key);
        Self { step, rows }
    }

    /// Grid spacing in centimetres.
    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn rows(&self) -> &[DischargeTableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the row at an exact grid point.
    pub fn locate(&self, corrected_level: i32, gate_opening: i32) -> Option<&DischargeTableRow> {
        let key = (corrected_level, gate_opening);
        let idx = self.rows.partition_point(|row| row.key() < key);
        self.rows.get(idx).filter(|row| row.key() == key)
    }

    /// Number of rows whose discharge is undefined.
    pub fn undefined_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.flow.is_none()).count()
    }
}

/// Discharge at one grid point, scaled by the gate count and rounded.
///
/// `None` when the contracted head under the gate is negative, which happens
/// only for a negative height correction.
fn gate_flow(
    corrected: i32,
    opening: i32,
    dims: &SluiceGateDimensions,
    coeffs: &SluiceCoefficients,
) -> Option<f64> {
    let true_head = corrected as f64 + dims.hc;
    let r = opening as f64 / corrected as f64;
    let [c5, c4, c3, c2, c1, c0] = coeffs.poly;
    let poly = c5 * r.powf(5.0)
        + c4 * r.powf(4.0)
        + c3 * r.powf(3.0)
        + c2 * r.powf(2.0)
        + c1 * r
        + c0;

    let radicand = coeffs.two_g * (true_head / 100.0 - coeffs.contraction * (opening as f64 / 100.0));
    if radicand < 0.0 {
        return None;
    }

    let q = poly * (opening as f64 / 100.0) * (dims.b / 100.0) * radicand.sqrt();
    let scaled = round_half_up(q * dims.num_gates, coeffs.flow_decimals);
    scaled.is_finite().then_some(scaled)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
