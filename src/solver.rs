//! Layered rotating-disk solver
//!
//! Each layer carries two unknowns `(A, B)` of the homogeneous solution,
//! except the innermost solid layer whose `B` is fixed to zero so the stress
//! stays finite at the centre. For `N` layers the `2N − 1` unknowns are
//! ordered `A_0, A_1, B_1, …, A_{N−1}, B_{N−1}` and the equations are
//!
//! - rows `0 .. N−1`: radial stress continuity at each interface
//! - row `N − 1`: radial stress equals the applied pressure at the surface
//! - rows `N .. 2N−1`: radial displacement continuity at each interface,
//!   offset by the outer layer's interference
//!
//! Stress rows are divided by the stiffest layer's `c1` and displacement
//! rows by the interface radius so both are strain-sized before the LU
//! factorisation.

use log::{debug, warn};

use crate::analysis::SolverOptions;
use crate::elements::{DerivedConstants, Stack};
use crate::error::{RotorError, RotorResult};
use crate::loads::OperatingPoint;
use crate::math::{self, Mat, Vec as RVec};
use crate::results::{StackSolution, StressCoefficients, StressField};

/// Column of the `A` coefficient of layer `k`
fn col_a(k: usize) -> usize {
    if k == 0 {
        0
    } else {
        2 * k - 1
    }
}

/// Column of the `B` coefficient of layer `k` (none for the solid core)
fn col_b(k: usize) -> Option<usize> {
    (k > 0).then(|| 2 * k)
}

/// Radial stress of the particular (load) solution
fn radial_load(d: &DerivedConstants, op: &OperatingPoint, r: f64) -> f64 {
    d.radial_spin() * op.omega_squared() * r * r + d.zeta_r * op.delta_t
}

/// Radial displacement of the particular (load) solution
fn displacement_load(d: &DerivedConstants, op: &OperatingPoint, r: f64) -> f64 {
    d.beta * op.omega_squared() * r.powi(3) + d.zeta_u * op.delta_t * r
}

/// Assembles and solves the interface system of a stack
#[derive(Debug, Clone, Default)]
pub struct StackSolver {
    options: SolverOptions,
}

impl StackSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Solve every layer's stress coefficients for one operating point
    pub fn solve(&self, stack: &Stack, op: &OperatingPoint) -> RotorResult<StackSolution> {
        let layers = stack.layers();
        let n = layers.len();
        if n > 0 && layers[0].interference != 0.0 {
            warn!(
                "interference {} on innermost layer '{}' has no neighbour and is ignored",
                layers[0].interference, layers[0].name
            );
        }

        let (k, p) = self.assemble(stack, op)?;
        debug!(
            "solving {}x{} stack system ({} layers, omega = {:.3} rad/s, dT = {:.3})",
            k.nrows(),
            k.ncols(),
            n,
            op.omega,
            op.delta_t
        );

        let x = math::solve_linear_system(&k, &p).ok_or_else(|| {
            RotorError::SingularSystem(format!(
                "{}x{} interface system could not be factorised",
                k.nrows(),
                k.ncols()
            ))
        })?;

        let fields = layers
            .iter()
            .enumerate()
            .map(|(idx, layer)| {
                let coefficients = StressCoefficients {
                    a: x[col_a(idx)],
                    b: col_b(idx).map_or(0.0, |c| x[c]),
                };
                StressField::new(layer.clone(), coefficients, *op)
            })
            .collect();

        let solution = StackSolution::new(fields, self.options.samples_per_layer);
        if self.options.check_continuity {
            self.verify_continuity(&solution)?;
        }
        Ok(solution)
    }

    /// Build the `(2N−1)×(2N−1)` system matrix and right-hand side
    pub fn assemble(&self, stack: &Stack, op: &OperatingPoint) -> RotorResult<(Mat, RVec)> {
        let layers = stack.layers();
        let n = layers.len();
        if n == 0 {
            return Err(RotorError::SingularSystem("stack has no layers".to_string()));
        }
        let size = 2 * n - 1;
        let mut k = Mat::zeros(size, size);
        let mut p = RVec::zeros(size);

        let stress_scale = layers
            .iter()
            .map(|l| l.material.derived().c1)
            .fold(0.0_f64, f64::max);

        for j in 0..n - 1 {
            let inner = layers[j].material.derived();
            let outer = layers[j + 1].material.derived();
            let r = layers[j].r_o;

            // (a) radial stress continuity
            k[(j, col_a(j))] += inner.radial_a() * r.powf(inner.h - 1.0) / stress_scale;
            if let Some(c) = col_b(j) {
                k[(j, c)] += inner.radial_b() * r.powf(-inner.h - 1.0) / stress_scale;
            }
            k[(j, col_a(j + 1))] -= outer.radial_a() * r.powf(outer.h - 1.0) / stress_scale;
            if let Some(c) = col_b(j + 1) {
                k[(j, c)] -= outer.radial_b() * r.powf(-outer.h - 1.0) / stress_scale;
            }
            p[j] = (radial_load(outer, op, r) - radial_load(inner, op, r)) / stress_scale;

            // (c) displacement continuity, u_outer − u_inner = −Δ_outer
            let row = n + j;
            k[(row, col_a(j + 1))] += r.powf(outer.h) / r;
            if let Some(c) = col_b(j + 1) {
                k[(row, c)] += r.powf(-outer.h) / r;
            }
            k[(row, col_a(j))] -= r.powf(inner.h) / r;
            if let Some(c) = col_b(j) {
                k[(row, c)] -= r.powf(-inner.h) / r;
            }
            p[row] = (-layers[j + 1].interference - displacement_load(outer, op, r)
                + displacement_load(inner, op, r))
                / r;
        }

        // (b) outer surface
        let last = n - 1;
        let d = layers[last].material.derived();
        let r = layers[last].r_o;
        k[(last, col_a(last))] = d.radial_a() * r.powf(d.h - 1.0) / stress_scale;
        if let Some(c) = col_b(last) {
            k[(last, c)] = d.radial_b() * r.powf(-d.h - 1.0) / stress_scale;
        }
        p[last] = (-op.outer_pressure - radial_load(d, op, r)) / stress_scale;

        Ok((k, p))
    }

    fn verify_continuity(&self, solution: &StackSolution) -> RotorResult<()> {
        let tol = self.options.continuity_tolerance;
        for res in solution.interface_residuals() {
            let (inner, outer) = match (solution.field(res.index), solution.field(res.index + 1)) {
                (Some(i), Some(o)) => (i, o),
                _ => continue,
            };
            let r = res.radius;
            let stress_ref = inner
                .radial(r)
                .abs()
                .max(inner.tangential(r).abs())
                .max(outer.tangential(r).abs())
                .max(1.0);
            let disp_ref = inner
                .displacement(r)
                .abs()
                .max(outer.displacement(r).abs())
                .max(outer.layer.interference.abs())
                .max(f64::MIN_POSITIVE);

            if res.radial_jump.abs() > tol * stress_ref
                || res.displacement_jump.abs() > tol * disp_ref
            {
                return Err(RotorError::SingularSystem(format!(
                    "ill-conditioned solve: continuity residual at r = {r} is {:.3e} Pa / {:.3e} m",
                    res.radial_jump, res.displacement_jump
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Layer, Material};
    use approx::assert_relative_eq;

    fn rotor_stack() -> Stack {
        Stack::from_thicknesses(&[
            ("Shaft", 0.005, Material::structural_steel()),
            ("Core", 0.117, Material::electrical_steel()),
            ("Magnets", 0.003, Material::ndfeb()),
            ("Sleeve", 0.002, Material::carbon_fiber_sleeve()),
        ])
        .unwrap()
    }

    #[test]
    fn test_system_size() {
        let solver = StackSolver::default();
        let (k, p) = solver
            .assemble(&rotor_stack(), &OperatingPoint::at_rest())
            .unwrap();
        assert_eq!(k.shape(), (7, 7));
        assert_eq!(p.len(), 7);
    }

    #[test]
    fn test_zero_load_gives_zero_stress() {
        let stack = rotor_stack();
        let solution = StackSolver::default()
            .solve(&stack, &OperatingPoint::at_rest())
            .unwrap();
        for field in solution.fields() {
            for s in field.sample(16) {
                assert_eq!(s.radial, 0.0);
                assert_eq!(s.tangential, 0.0);
            }
        }
    }

    #[test]
    fn test_solid_disk_centre_stress() {
        let (rho, e, nu, r_o) = (7850.0, 200e9, 0.3, 0.1);
        let disk = Stack::from_thicknesses(&[(
            "Disk",
            r_o,
            Material::isotropic(rho, e, nu, 1.2e-5).unwrap(),
        )])
        .unwrap();
        let op = OperatingPoint::from_rpm(12_000.0, 0.0).unwrap();
        let solution = StackSolver::default().solve(&disk, &op).unwrap();
        let field = solution.field(0).unwrap();

        let expected = (3.0 + nu) / 8.0 * rho * op.omega_squared() * r_o * r_o;
        assert_relative_eq!(field.radial(0.0), expected, max_relative = 1e-6);
        assert_relative_eq!(field.tangential(0.0), expected, max_relative = 1e-6);
        assert!(field.radial(r_o).abs() < 1e-6 * expected);
        let hoop_rim = (1.0 - nu) / 4.0 * rho * op.omega_squared() * r_o * r_o;
        assert_relative_eq!(field.tangential(r_o), hoop_rim, max_relative = 1e-6);
    }

    #[test]
    fn test_uniform_heating_of_single_material_is_stress_free() {
        let stack = Stack::from_thicknesses(&[
            ("Shaft", 0.01, Material::structural_steel()),
            ("Ring", 0.02, Material::structural_steel()),
        ])
        .unwrap();
        let op = OperatingPoint::new(0.0, 80.0).unwrap();
        let solution = StackSolver::default().solve(&stack, &op).unwrap();
        for field in solution.fields() {
            let s = field.summary(8);
            assert!(s.peak_magnitude(crate::results::StressComponent::Radial) < 1e-3);
            assert!(s.peak_magnitude(crate::results::StressComponent::Tangential) < 1e-3);
        }
    }

    #[test]
    fn test_shrink_fit_contact_pressure() {
        let (e, nu, b, c, delta) = (200e9, 0.3, 0.02, 0.05, 20e-6);
        let mat = Material::isotropic(7850.0, e, nu, 1.2e-5).unwrap();
        let shaft = Layer::new("Shaft", 0.0, b, mat).unwrap();
        let hub = Layer::new("Hub", b, c - b, mat)
            .unwrap()
            .with_interference(-delta);
        let stack = Stack::new(vec![shaft, hub]).unwrap();
        let solution = StackSolver::default()
            .solve(&stack, &OperatingPoint::at_rest())
            .unwrap();

        let pressure = e * delta * (c * c - b * b) / (2.0 * b * c * c);
        assert_relative_eq!(solution.radial_at(b).unwrap(), -pressure, max_relative = 1e-6);
        // Solid shaft under external pressure is uniformly compressed
        assert_relative_eq!(
            solution.field(0).unwrap().tangential(0.0),
            -pressure,
            max_relative = 1e-6
        );
        assert!(solution.field(1).unwrap().tangential(b) > 0.0);
    }

    #[test]
    fn test_interface_continuity_with_composite_sleeve() {
        let stack = rotor_stack();
        let sleeve = stack.layer(3).unwrap().clone().with_interference(-1e-4);
        let layers = vec![
            stack.layer(0).unwrap().clone(),
            stack.layer(1).unwrap().clone(),
            stack.layer(2).unwrap().clone(),
            sleeve,
        ];
        let stack = Stack::new(layers).unwrap();
        let op = OperatingPoint::from_rpm(10_000.0, 10.0).unwrap();
        let solution = StackSolver::default().solve(&stack, &op).unwrap();

        for res in solution.interface_residuals() {
            let inner = solution.field(res.index).unwrap();
            let scale = inner.radial(res.radius).abs().max(1.0);
            assert!(res.radial_jump.abs() < 1e-7 * scale, "{res:?}");
            assert!(res.displacement_jump.abs() < 1e-10, "{res:?}");
        }
        let outer = solution.field(3).unwrap();
        assert!(outer.radial(stack.outer_radius()).abs() < 1.0);
        // Shrink fit puts the sleeve in hoop tension
        assert!(outer.tangential(outer.layer.r_i) > 0.0);
    }

    #[test]
    fn test_outer_pressure_boundary() {
        let stack = Stack::from_thicknesses(&[("Disk", 0.05, Material::structural_steel())]).unwrap();
        let op = OperatingPoint::at_rest().with_outer_pressure(5e6);
        let solution = StackSolver::default().solve(&stack, &op).unwrap();
        let field = solution.field(0).unwrap();
        assert_relative_eq!(field.radial(0.05), -5e6, max_relative = 1e-9);
        assert_relative_eq!(field.radial(0.0), -5e6, max_relative = 1e-9);
    }
}
