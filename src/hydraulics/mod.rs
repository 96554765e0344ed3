/// Discharge models for the supported structure families.
///
/// Submodules:
/// - `weir`        — closed-form broad-crested weir formula.
/// - `table`       — sluice gate discharge table generation.
/// - `interpolate` — bilinear interpolation within a discharge table.

pub mod interpolate;
pub mod table;
pub mod weir;

/// Rounds to `decimals` places with ties towards positive infinity.
///
/// Matches the rounding used when the reference tables were produced, which
/// differs from `f64::round` for negative ties.
pub(crate) fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}
