//! Broad-crested weir discharge.
//!
//! The formula is evaluated term by term in a fixed order. Algebraically
//! simpler forms (the crest width cancels in the area ratio, for example)
//! give results that differ in the last bits, so do not simplify.

use crate::config::WeirCoefficients;
use crate::model::{FlowError, WeirDimensions};

/// Discharge over a broad-crested weir for a water level in centimetres.
///
/// Returns `OutOfDomain` for a non-positive or non-finite level, and for
/// dimensions that make any intermediate term non-finite.
pub fn discharge(
    level_cm: f64,
    dims: &WeirDimensions,
    coeffs: &WeirCoefficients,
) -> Result<f64, FlowError> {
    if !level_cm.is_finite() || level_cm <= 0.0 {
        return Err(FlowError::out_of_domain(format!(
            "weir head must be positive, got {} cm",
            level_cm
        )));
    }

    let hm = level_cm / 100.0;
    let hl = hm / dims.l;
    let cd = coeffs.cd_base + coeffs.cd_head_slope * hl;
    let aa1 = (hm * dims.bc) / ((hm + dims.p1) * dims.bc);
    let cd_aa1 = cd * aa1;
    let cv = coeffs.cv_c3 * cd_aa1.powf(3.0)
        + coeffs.cv_c2 * cd_aa1.powf(2.0)
        + coeffs.cv_c1 * cd_aa1
        + coeffs.cv_c0;
    let q = cv
        * cd
        * (2.0 / 3.0)
        * (2.0 * coeffs.gravity / 3.0).sqrt()
        * dims.bc
        * hm.powf(1.5);

    if !q.is_finite() {
        return Err(FlowError::out_of_domain(format!(
            "weir discharge is undefined for bc={}, p1={}, l={} at {} cm",
            dims.bc, dims.p1, dims.l, level_cm
        )));
    }
    Ok(q)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
