//! Rotor Stress - analytic stresses in layered rotating cylinders
//!
//! This library solves the axisymmetric elasticity problem for a stack of
//! concentric cylindrical layers (shaft, rotor core, magnets, retention
//! sleeve) under:
//! - Centrifugal loading at constant angular velocity
//! - Uniform temperature change
//! - Shrink-fit interference between layers
//! - External pressure on the outer surface
//!
//! Layers are isotropic (plane stress) or transversely isotropic with the
//! fibre along the hoop direction (generalized plane strain). On top of the
//! solver, [`sizing::SleeveSizer`] searches for the thinnest composite sleeve
//! and matching interference that keep the sleeve and magnets inside their
//! stress limits.
//!
//! ## Example
//! ```rust
//! use rotor_stress::prelude::*;
//!
//! let stack = Stack::from_thicknesses(&[
//!     ("Shaft", 5e-3, Material::structural_steel()),
//!     ("Core", 117e-3, Material::electrical_steel()),
//!     ("Magnets", 3e-3, Material::ndfeb()),
//! ])
//! .unwrap();
//!
//! let op = OperatingPoint::from_rpm(10_000.0, 10.0).unwrap();
//! let solution = StackSolver::default().solve(&stack, &op).unwrap();
//!
//! // Free outer surface
//! let sigma_r = solution.radial_at(stack.outer_radius()).unwrap();
//! assert!(sigma_r.abs() < 1.0);
//!
//! let problem = SleeveProblem::new(
//!     stack,
//!     Material::carbon_fiber_sleeve(),
//!     StressLimits::new(-100e6, 1300e6, 0.0, 80e6).unwrap(),
//!     op,
//! );
//! let design = SleeveSizer::new(problem, SizerOptions::default())
//!     .unwrap()
//!     .size_default()
//!     .unwrap();
//! assert!(design.margins.is_feasible());
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod results;
pub mod sizing;
pub mod solver;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::SolverOptions;
    pub use crate::elements::{DerivedConstants, Layer, Material, MaterialProperties, Stack};
    pub use crate::error::{RotorError, RotorResult};
    pub use crate::loads::OperatingPoint;
    pub use crate::results::{
        InterfaceResidual, LayerStressSummary, LimitViolation, StackSolution, StressCoefficients,
        StressComponent, StressField, StressSample,
    };
    pub use crate::sizing::{
        ConstrainedMinimization, ConstraintMargins, SearchPolicy, SizerOptions, SleeveDesign,
        SleeveProblem, SleeveSizer, StagedSearch, StressLimits, TrialBudget,
    };
    pub use crate::solver::StackSolver;
}
