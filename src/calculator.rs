//! Flow calculation facade.
//!
//! Dispatches on the structure type: broad-crested weirs use the closed-form
//! formula, sluice gates build a discharge table and interpolate within it.
//! A calculator holds only its model configuration and keeps no state
//! between calls, so one instance can serve any number of threads.

use crate::config::ModelConfig;
use crate::hydraulics::{interpolate, table::DischargeTable, weir};
use crate::logging::{self, Component};
use crate::model::{FlowError, SluiceGateDimensions, StructureDimensions};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowCalculator {
    model: ModelConfig,
}

impl FlowCalculator {
    pub fn new(model: ModelConfig) -> Self {
        Self { model }
    }

    /// Discharge through a structure for a raw water level and gate opening,
    /// both in centimetres. The gate opening is ignored for weirs.
    pub fn compute(
        &self,
        level_cm: f64,
        gate_opening_cm: f64,
        dims: &StructureDimensions,
    ) -> Result<f64, FlowError> {
        match dims {
            StructureDimensions::BroadCrestedWeir(weir_dims) => {
                logging::debug(Component::Weir, None, &format!("BCW structure at {} cm", level_cm));
                weir::discharge(level_cm, weir_dims, &self.model.weir)
            }
            StructureDimensions::SluiceGate(gate) => {
                self.sluice_gate_flow(level_cm, gate_opening_cm, gate)
            }
            StructureDimensions::Unsupported { tag } => {
                Err(FlowError::UnsupportedStructureType(tag.clone()))
            }
        }
    }

    /// Like [`compute`](Self::compute), logging any failure against the
    /// structure identifier.
    pub fn compute_for(
        &self,
        structure_id: &str,
        level_cm: f64,
        gate_opening_cm: f64,
        dims: &StructureDimensions,
    ) -> Result<f64, FlowError> {
        self.compute(level_cm, gate_opening_cm, dims).inspect_err(|err| {
            logging::log_flow_failure(Some(structure_id), "Flow calculation", err)
        })
    }

    /// Builds the discharge table this calculator would use for a gate.
    pub fn discharge_table(&self, gate: &SluiceGateDimensions) -> DischargeTable {
        DischargeTable::build(gate, &self.model)
    }

    fn sluice_gate_flow(
        &self,
        level_cm: f64,
        gate_opening_cm: f64,
        gate: &SluiceGateDimensions,
    ) -> Result<f64, FlowError> {
        if !(gate.b.is_finite() && gate.hc.is_finite() && gate.num_gates.is_finite()) {
            return Err(FlowError::out_of_domain(format!(
                "sluice gate dimensions must be finite, got b={}, hc={}, num_gates={}",
                gate.b, gate.hc, gate.num_gates
            )));
        }
        let corrected = level_cm - gate.hc;
        let table = self.discharge_table(gate);
        logging::debug(
            Component::Sluice,
            None,
            &format!(
                "SG table with {} rows, query at corrected level {} cm, opening {} cm",
                table.len(),
                corrected,
                gate_opening_cm
            ),
        );
        interpolate::interpolate(
            &table,
            corrected,
            gate_opening_cm,
            self.model.interpolated_decimals,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeirDimensions;

    fn reference_gate() -> StructureDimensions {
        StructureDimensions::SluiceGate(SluiceGateDimensions {
            b: 300.0,
            hc: 50.0,
            num_gates: 1.0,
        })
    }

    #[test]
    fn test_weir_dispatch_ignores_gate_opening() {
        let calc = FlowCalculator::default();
        let dims = StructureDimensions::BroadCrestedWeir(WeirDimensions {
            bc: 1.0,
            p1: 0.5,
            l: 2.0,
        });
        let a = calc.compute(50.0, 0.0, &dims).expect("in domain");
        let b = calc.compute(50.0, 120.0, &dims).expect("in domain");
        assert_eq!(a, b);
        assert_eq!(a.to_bits(), 0.6064805115213348f64.to_bits());
    }

    #[test]
    fn test_sluice_gate_query_is_height_corrected() {
        // Raw 152 cm with hc = 50 reads the table at corrected 102 cm.
        let calc = FlowCalculator::default();
        assert_eq!(calc.compute(152.0, 52.0, &reference_gate()), Ok(4.72));
    }

    #[test]
    fn test_multi_gate_structure() {
        let calc = FlowCalculator::default();
        let dims = StructureDimensions::SluiceGate(SluiceGateDimensions {
            b: 150.0,
            hc: 20.0,
            num_gates: 2.0,
        });
        assert_eq!(calc.compute(180.0, 33.0, &dims), Ok(3.292));
    }

    #[test]
    fn test_sluice_gate_below_opening_has_no_data() {
        let calc = FlowCalculator::default();
        let result = calc.compute(52.0, 40.0, &reference_gate());
        assert!(matches!(result, Err(FlowError::NoInterpolationData { .. })));
    }

    #[test]
    fn test_huge_level_or_opening_has_no_data() {
        let calc = FlowCalculator::default();
        for (level, opening) in [(1e12, 50.0), (152.0, 1e12)] {
            let result = calc.compute(level, opening, &reference_gate());
            assert!(
                matches!(result, Err(FlowError::NoInterpolationData { .. })),
                "got {:?}",
                result
            );
        }
    }

    #[test]
    fn test_non_finite_gate_dimensions_are_out_of_domain() {
        let calc = FlowCalculator::default();
        for hc in [f64::NEG_INFINITY, f64::NAN] {
            let dims = StructureDimensions::SluiceGate(SluiceGateDimensions {
                b: 300.0,
                hc,
                num_gates: 1.0,
            });
            let result = calc.compute(152.0, 52.0, &dims);
            assert!(
                matches!(result, Err(FlowError::OutOfDomain { .. })),
                "hc = {} should be rejected, got {:?}",
                hc,
                result
            );
        }
    }

    #[test]
    fn test_unsupported_type_never_yields_a_number() {
        let calc = FlowCalculator::default();
        let dims = StructureDimensions::Unsupported { tag: "TW".to_string() };
        assert_eq!(
            calc.compute(100.0, 20.0, &dims),
            Err(FlowError::UnsupportedStructureType("TW".to_string()))
        );
    }

    #[test]
    fn test_compute_for_returns_same_outcome() {
        let calc = FlowCalculator::default();
        assert_eq!(
            calc.compute_for("12", 152.0, 52.0, &reference_gate()),
            calc.compute(152.0, 52.0, &reference_gate())
        );
    }

    #[test]
    fn test_recalibrated_model_changes_weir_result() {
        let mut model = ModelConfig::default();
        model.weir.gravity = 9.81;
        let dims = StructureDimensions::BroadCrestedWeir(WeirDimensions {
            bc: 1.0,
            p1: 0.5,
            l: 2.0,
        });
        let default_q = FlowCalculator::default().compute(50.0, 0.0, &dims).expect("in domain");
        let tuned_q = FlowCalculator::new(model).compute(50.0, 0.0, &dims).expect("in domain");
        assert!(tuned_q > default_q);
    }
}
