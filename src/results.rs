//! Result types for stack stress analysis

use serde::{Deserialize, Serialize};

use crate::elements::Layer;
use crate::loads::OperatingPoint;
use crate::math::{linspace, power_term};

/// Coefficients of the homogeneous solution `u = A·r^h + B·r^-h` for one layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressCoefficients {
    pub a: f64,
    pub b: f64,
}

/// Stress component selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressComponent {
    Radial,
    Tangential,
}

/// Radial and tangential stress at one radius
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StressSample {
    pub r: f64,
    pub radial: f64,
    pub tangential: f64,
}

/// Stress extremes over one layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayerStressSummary {
    pub min_radial: f64,
    pub max_radial: f64,
    pub min_tangential: f64,
    pub max_tangential: f64,
}

impl LayerStressSummary {
    /// Largest |σ| of the requested component
    pub fn peak_magnitude(&self, component: StressComponent) -> f64 {
        match component {
            StressComponent::Radial => self.min_radial.abs().max(self.max_radial.abs()),
            StressComponent::Tangential => {
                self.min_tangential.abs().max(self.max_tangential.abs())
            }
        }
    }
}

/// Stress distribution in one solved layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressField {
    pub layer: Layer,
    pub coefficients: StressCoefficients,
    pub operating: OperatingPoint,
}

impl StressField {
    pub fn new(layer: Layer, coefficients: StressCoefficients, operating: OperatingPoint) -> Self {
        Self {
            layer,
            coefficients,
            operating,
        }
    }

    /// Radial stress σ_r(r) in Pa
    pub fn radial(&self, r: f64) -> f64 {
        let d = self.layer.material.derived();
        let StressCoefficients { a, b } = self.coefficients;
        power_term(a * d.radial_a(), r, d.h - 1.0)
            + power_term(b * d.radial_b(), r, -d.h - 1.0)
            + d.radial_spin() * self.operating.omega_squared() * r * r
            + d.zeta_r * self.operating.delta_t
    }

    /// Tangential (hoop) stress σ_t(r) in Pa
    pub fn tangential(&self, r: f64) -> f64 {
        let d = self.layer.material.derived();
        let StressCoefficients { a, b } = self.coefficients;
        power_term(a * d.tangential_a(), r, d.h - 1.0)
            + power_term(b * d.tangential_b(), r, -d.h - 1.0)
            + d.tangential_spin() * self.operating.omega_squared() * r * r
            + d.zeta_t * self.operating.delta_t
    }

    /// Radial displacement u(r) in m, measured from this layer's unstrained shape
    pub fn displacement(&self, r: f64) -> f64 {
        let d = self.layer.material.derived();
        let StressCoefficients { a, b } = self.coefficients;
        power_term(a, r, d.h)
            + power_term(b, r, -d.h)
            + d.beta * self.operating.omega_squared() * r.powi(3)
            + d.zeta_u * self.operating.delta_t * r
    }

    /// Stresses at `n` evenly spaced radii across the layer, both ends included
    pub fn sample(&self, n: usize) -> Vec<StressSample> {
        linspace(self.layer.r_i, self.layer.r_o, n.max(2))
            .into_iter()
            .map(|r| StressSample {
                r,
                radial: self.radial(r),
                tangential: self.tangential(r),
            })
            .collect()
    }

    /// Min/max of both components over `n` sample radii
    pub fn summary(&self, n: usize) -> LayerStressSummary {
        let init = LayerStressSummary {
            min_radial: f64::INFINITY,
            max_radial: f64::NEG_INFINITY,
            min_tangential: f64::INFINITY,
            max_tangential: f64::NEG_INFINITY,
        };
        self.sample(n).iter().fold(init, |acc, s| LayerStressSummary {
            min_radial: acc.min_radial.min(s.radial),
            max_radial: acc.max_radial.max(s.radial),
            min_tangential: acc.min_tangential.min(s.tangential),
            max_tangential: acc.max_tangential.max(s.tangential),
        })
    }
}

/// Continuity check at an internal interface
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InterfaceResidual {
    /// Index of the inner layer of the interface
    pub index: usize,
    pub radius: f64,
    /// σ_r(outer layer) − σ_r(inner layer) in Pa
    pub radial_jump: f64,
    /// Displacement mismatch left after closing the declared interference, in m
    pub displacement_jump: f64,
}

/// A layer whose stress exceeds one of its declared limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitViolation {
    pub index: usize,
    pub layer: String,
    pub component: StressComponent,
    pub peak: f64,
    pub limit: f64,
}

/// Solved stress fields for every layer of a stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackSolution {
    fields: Vec<StressField>,
    samples_per_layer: usize,
}

impl StackSolution {
    pub(crate) fn new(fields: Vec<StressField>, samples_per_layer: usize) -> Self {
        Self {
            fields,
            samples_per_layer,
        }
    }

    pub fn fields(&self) -> &[StressField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&StressField> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Stress extremes of one layer at the solver's sampling density
    pub fn layer_summary(&self, index: usize) -> Option<LayerStressSummary> {
        self.fields
            .get(index)
            .map(|f| f.summary(self.samples_per_layer))
    }

    /// Radial stress at `r`, taken from the innermost layer containing it
    pub fn radial_at(&self, r: f64) -> Option<f64> {
        self.fields
            .iter()
            .find(|f| f.layer.contains(r))
            .map(|f| f.radial(r))
    }

    /// Tangential stress at `r`, taken from the innermost layer containing it
    pub fn tangential_at(&self, r: f64) -> Option<f64> {
        self.fields
            .iter()
            .find(|f| f.layer.contains(r))
            .map(|f| f.tangential(r))
    }

    /// Stress and displacement continuity at every internal interface
    pub fn interface_residuals(&self) -> Vec<InterfaceResidual> {
        self.fields
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let (inner, outer) = (&pair[0], &pair[1]);
                let radius = inner.layer.r_o;
                InterfaceResidual {
                    index,
                    radius,
                    radial_jump: outer.radial(radius) - inner.radial(radius),
                    displacement_jump: outer.displacement(radius) - inner.displacement(radius)
                        + outer.layer.interference,
                }
            })
            .collect()
    }

    /// Compare each layer's peak |σ| against its declared limits
    pub fn check_layer_limits(&self) -> Vec<LimitViolation> {
        let mut violations = Vec::new();
        for (index, field) in self.fields.iter().enumerate() {
            let summary = field.summary(self.samples_per_layer);
            let limits = [
                (StressComponent::Radial, field.layer.max_radial_stress),
                (StressComponent::Tangential, field.layer.max_tangential_stress),
            ];
            for (component, limit) in limits {
                let Some(limit) = limit else { continue };
                let peak = summary.peak_magnitude(component);
                if peak > limit {
                    violations.push(LimitViolation {
                        index,
                        layer: field.layer.name.clone(),
                        component,
                        peak,
                        limit,
                    });
                }
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, Stack};
    use crate::solver::StackSolver;
    use approx::assert_relative_eq;

    fn spun_disk() -> StackSolution {
        let stack = Stack::from_thicknesses(&[
            ("Shaft", 0.02, Material::structural_steel()),
            ("Ring", 0.03, Material::ndfeb()),
        ])
        .unwrap();
        let op = OperatingPoint::from_rpm(6_000.0, 0.0).unwrap();
        StackSolver::default().solve(&stack, &op).unwrap()
    }

    #[test]
    fn test_sample_includes_both_ends() {
        let solution = spun_disk();
        let samples = solution.field(1).unwrap().sample(5);
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].r, 0.02);
        assert_eq!(samples[4].r, 0.05);
        assert_eq!(solution.field(0).unwrap().sample(0).len(), 2);
    }

    #[test]
    fn test_summary_brackets_samples() {
        let solution = spun_disk();
        let summary = solution.layer_summary(0).unwrap();
        // Spinning solid shaft: both stresses peak at the centre
        assert!(summary.max_radial >= summary.min_radial);
        assert_relative_eq!(
            summary.max_tangential,
            solution.tangential_at(0.0).unwrap(),
            max_relative = 1e-12
        );
        assert!(solution.layer_summary(2).is_none());
    }

    #[test]
    fn test_point_queries_outside_stack() {
        let solution = spun_disk();
        assert!(solution.radial_at(0.06).is_none());
        assert!(solution.tangential_at(-0.01).is_none());
        // Interface radius resolves to the inner layer
        let inner = solution.field(0).unwrap().radial(0.02);
        assert_eq!(solution.radial_at(0.02), Some(inner));
    }

    #[test]
    fn test_peak_magnitude_uses_largest_absolute_value() {
        let summary = LayerStressSummary {
            min_radial: -5.0,
            max_radial: 2.0,
            min_tangential: 1.0,
            max_tangential: 3.0,
        };
        assert_eq!(summary.peak_magnitude(StressComponent::Radial), 5.0);
        assert_eq!(summary.peak_magnitude(StressComponent::Tangential), 3.0);
    }
}
