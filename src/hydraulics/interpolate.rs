//! Bilinear interpolation within a sluice gate discharge table.
//!
//! The query point is bracketed by the grid lines below and above it on both
//! axes. Corners missing from the table (outside the generated domain) are
//! substituted from the other corners in a fixed order:
//!
//! | corner | substitutes, in order |
//! |--------|-----------------------|
//! | a11    | q21, q12, q22         |
//! | a12    | q22, q11, q21         |
//! | a21    | q11, q22, q12         |
//! | a22    | q12, q21, q11         |
//!
//! The order is not symmetric. Reference data was produced with exactly these
//! chains, so they must not be replaced by a nearest-neighbour rule.

use super::round_half_up;
use super::table::DischargeTable;
use crate::logging::{self, Component};
use crate::model::FlowError;

/// Discharge values of the four bracketing corners, `None` where absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    /// (low level, low opening)
    pub q11: Option<f64>,
    /// (low level, high opening)
    pub q12: Option<f64>,
    /// (high level, low opening)
    pub q21: Option<f64>,
    /// (high level, high opening)
    pub q22: Option<f64>,
}

impl Corners {
    pub fn all_absent(&self) -> bool {
        self.q11.is_none() && self.q12.is_none() && self.q21.is_none() && self.q22.is_none()
    }

    /// Corner values after substitution, as `[a11, a12, a21, a22]`.
    pub fn substituted(&self) -> [f64; 4] {
        let Corners { q11, q12, q21, q22 } = *self;
        [
            first_present([q11, q21, q12, q22]),
            first_present([q12, q22, q11, q21]),
            first_present([q21, q11, q22, q12]),
            first_present([q22, q12, q21, q11]),
        ]
    }
}

fn first_present(chain: [Option<f64>; 4]) -> f64 {
    chain.into_iter().flatten().next().unwrap_or(0.0)
}

/// Exact lookup of a grid point.
///
/// `Ok(None)` when the point is not in the table; `OutOfDomain` when the
/// point exists but its discharge is undefined.
pub fn locate_q(
    table: &DischargeTable,
    corrected_level: i32,
    gate_opening: i32,
) -> Result<Option<f64>, FlowError> {
    match table.locate(corrected_level, gate_opening) {
        None => Ok(None),
        Some(row) => row.flow.map(Some).ok_or_else(|| {
            FlowError::out_of_domain(format!(
                "discharge undefined at corrected level {} cm, gate opening {} cm",
                corrected_level, gate_opening
            ))
        }),
    }
}

/// Grid lines bracketing `value`: the lower line as `f64`, then both lines
/// as table coordinates. `None` when they fall outside the `i32` grid.
fn bracket(value: f64, step: i32) -> Option<(f64, i32, i32)> {
    let low = (value / step as f64).floor() * step as f64;
    if !low.is_finite() || low < i32::MIN as f64 || low > i32::MAX as f64 {
        return None;
    }
    let lo = low as i32;
    Some((low, lo, lo.checked_add(step)?))
}

/// Interpolates the discharge at a corrected level and gate opening, both in
/// centimetres, rounding to `decimals` places.
///
/// Returns `NoInterpolationData` when none of the four bracketing corners is
/// in the table, and `OutOfDomain` when the blend is not a finite number.
pub fn interpolate(
    table: &DischargeTable,
    corrected_level: f64,
    gate_opening: f64,
    decimals: u32,
) -> Result<f64, FlowError> {
    if !corrected_level.is_finite() || !gate_opening.is_finite() {
        return Err(FlowError::out_of_domain(format!(
            "non-finite query point ({}, {})",
            corrected_level, gate_opening
        )));
    }

    let no_data = || FlowError::NoInterpolationData {
        level: corrected_level,
        gate_opening,
    };
    let step = table.step() as f64;
    let (wl_low, wl_lo, wl_hi) = bracket(corrected_level, table.step()).ok_or_else(no_data)?;
    let (go_low, go_lo, go_hi) = bracket(gate_opening, table.step()).ok_or_else(no_data)?;

    let corners = Corners {
        q11: locate_q(table, wl_lo, go_lo)?,
        q12: locate_q(table, wl_lo, go_hi)?,
        q21: locate_q(table, wl_hi, go_lo)?,
        q22: locate_q(table, wl_hi, go_hi)?,
    };
    logging::debug(
        Component::Interpolator,
        None,
        &format!(
            "q11,q12,q21,q22 = {:?}, {:?}, {:?}, {:?}",
            corners.q11, corners.q12, corners.q21, corners.q22
        ),
    );

    if corners.all_absent() {
        return Err(no_data());
    }

    let t = (corrected_level - wl_low) / step;
    let u = (gate_opening - go_low) / step;
    let [a11, a12, a21, a22] = corners.substituted();
    logging::debug(
        Component::Interpolator,
        None,
        &format!("t,u = {}, {}; a11,a12,a21,a22 = {}, {}, {}, {}", t, u, a11, a12, a21, a22),
    );

    let q = (1.0 - t) * (1.0 - u) * a11
        + (1.0 - t) * u * a12
        + t * (1.0 - u) * a21
        + t * u * a22;
    let rounded = round_half_up(q, decimals);
    if !rounded.is_finite() {
        return Err(FlowError::out_of_domain(format!(
            "interpolated discharge is undefined at ({}, {})",
            corrected_level, gate_opening
        )));
    }
    Ok(rounded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::model::{DischargeTableRow, SluiceGateDimensions};

    fn reference_table() -> DischargeTable {
        let dims = SluiceGateDimensions {
            b: 300.0,
            hc: 50.0,
            num_gates: 1.0,
        };
        DischargeTable::build(&dims, &ModelConfig::default())
    }

    /// Builds a table holding only the given corners of the cell
    /// level 100..105 × opening 50..55.
    fn cell(q11: Option<f64>, q12: Option<f64>, q21: Option<f64>, q22: Option<f64>) -> DischargeTable {
        let corners = [((100, 50), q11), ((100, 55), q12), ((105, 50), q21), ((105, 55), q22)];
        let rows = corners
            .into_iter()
            .filter_map(|((level, opening), q)| {
                q.map(|flow| DischargeTableRow {
                    corrected_level: level,
                    gate_opening: opening,
                    flow: Some(flow),
                })
            })
            .collect();
        DischargeTable::from_rows(5, rows)
    }

    // At (101, 51): t = u = 0.2, weights 0.64 / 0.16 / 0.16 / 0.04.
    fn at_cell_point(table: &DischargeTable) -> f64 {
        interpolate(table, 101.0, 51.0, 3).expect("at least one corner present")
    }

    // --- Exact grid points --------------------------------------------------

    #[test]
    fn test_grid_point_returns_stored_value() {
        let table = reference_table();
        assert_eq!(interpolate(&table, 100.0, 50.0, 3), Ok(4.51));
        assert_eq!(interpolate(&table, 200.0, 100.0, 3), Ok(11.35));
    }

    // --- Interior points ----------------------------------------------------

    #[test]
    fn test_interior_point_blends_four_corners() {
        let table = reference_table();
        assert_eq!(interpolate(&table, 102.0, 52.0, 3), Ok(4.72));
        assert_eq!(interpolate(&table, 102.5, 52.5, 3), Ok(4.773));
    }

    #[test]
    fn test_missing_corner_near_domain_edge_uses_fallback() {
        // (5, 10) is absent because the opening exceeds the head.
        let table = reference_table();
        assert_eq!(interpolate(&table, 7.0, 8.0, 3), Ok(0.551));
    }

    // --- No data ------------------------------------------------------------

    #[test]
    fn test_all_corners_missing_is_no_data_not_zero() {
        let table = reference_table();
        let result = interpolate(&table, 2.0, 40.0, 3);
        assert!(
            matches!(result, Err(FlowError::NoInterpolationData { .. })),
            "expected no-data outcome, got {:?}",
            result
        );
    }

    #[test]
    fn test_negative_level_has_no_data() {
        let table = reference_table();
        let result = interpolate(&table, -20.0, 10.0, 3);
        assert!(matches!(result, Err(FlowError::NoInterpolationData { .. })));
    }

    #[test]
    fn test_non_finite_query_is_out_of_domain() {
        let table = reference_table();
        let result = interpolate(&table, f64::NAN, 10.0, 3);
        assert!(matches!(result, Err(FlowError::OutOfDomain { .. })));
    }

    #[test]
    fn test_query_far_beyond_the_grid_has_no_data() {
        let table = reference_table();
        for (level, opening) in [(1e12, 50.0), (102.0, 1e12), (-1e12, 50.0), (1e12, 1e12)] {
            let result = interpolate(&table, level, opening, 3);
            assert!(
                matches!(result, Err(FlowError::NoInterpolationData { .. })),
                "({}, {}) should have no data, got {:?}",
                level,
                opening,
                result
            );
        }
    }

    #[test]
    fn test_unrepresentable_rounding_is_out_of_domain() {
        // 10^400 overflows, so the rounded blend would be NaN.
        let table = reference_table();
        let result = interpolate(&table, 102.0, 52.0, 400);
        assert!(matches!(result, Err(FlowError::OutOfDomain { .. })), "got {:?}", result);
    }

    #[test]
    fn test_undefined_corner_is_out_of_domain() {
        let table = DischargeTable::from_rows(
            5,
            vec![
                DischargeTableRow { corrected_level: 100, gate_opening: 50, flow: Some(1.0) },
                DischargeTableRow { corrected_level: 105, gate_opening: 50, flow: None },
            ],
        );
        let result = interpolate(&table, 101.0, 51.0, 3);
        assert!(matches!(result, Err(FlowError::OutOfDomain { .. })), "got {:?}", result);
    }

    // --- Fallback chains ----------------------------------------------------

    #[test]
    fn test_missing_q11_takes_q21() {
        let table = cell(None, Some(1.0), Some(2.0), Some(4.0));
        // a11 = q21 = 2 → 0.64·2 + 0.16·1 + 0.16·2 + 0.04·4
        assert_eq!(at_cell_point(&table), 1.92);
    }

    #[test]
    fn test_missing_q12_takes_q22() {
        let table = cell(Some(1.0), None, Some(2.0), Some(4.0));
        // a12 = q22 = 4 → 0.64·1 + 0.16·4 + 0.16·2 + 0.04·4
        assert_eq!(at_cell_point(&table), 1.76);
    }

    #[test]
    fn test_missing_q21_takes_q11() {
        let table = cell(Some(1.0), Some(2.0), None, Some(4.0));
        // a21 = q11 = 1 → 0.64·1 + 0.16·2 + 0.16·1 + 0.04·4
        assert_eq!(at_cell_point(&table), 1.28);
    }

    #[test]
    fn test_missing_q22_takes_q12() {
        let table = cell(Some(1.0), Some(2.0), Some(3.0), None);
        // a22 = q12 = 2 → 0.64·1 + 0.16·2 + 0.16·3 + 0.04·2
        assert_eq!(at_cell_point(&table), 1.52);
    }

    #[test]
    fn test_second_substitute_used_when_first_also_missing() {
        let table = cell(None, Some(2.0), None, Some(4.0));
        // a11 = q12 = 2 (q21 missing), a21 = q22 = 4 (q11 missing)
        assert_eq!(at_cell_point(&table), 2.4);
    }

    #[test]
    fn test_single_corner_fills_the_whole_cell() {
        let table = cell(None, None, None, Some(4.0));
        assert_eq!(at_cell_point(&table), 4.0);
    }

    #[test]
    fn test_substitution_chains_are_not_symmetric() {
        let corners = Corners {
            q11: None,
            q12: Some(1.0),
            q21: Some(2.0),
            q22: None,
        };
        // a11 prefers the level neighbour, a22 the opening neighbour.
        assert_eq!(corners.substituted(), [2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_locate_q_distinguishes_absent_from_undefined() {
        let table = DischargeTable::from_rows(
            5,
            vec![DischargeTableRow { corrected_level: 10, gate_opening: 5, flow: None }],
        );
        assert_eq!(locate_q(&table, 10, 10), Ok(None));
        assert!(locate_q(&table, 10, 5).is_err());
    }
}
