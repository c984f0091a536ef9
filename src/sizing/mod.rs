//! Retention sleeve sizing
//!
//! A [`SleeveProblem`] fixes the inner rotor (shaft, core, magnets as the
//! outermost inner layer), the sleeve material, the operating point and the
//! four stress limits. [`SleeveSizer`] evaluates trial designs
//! `(d_sl, Δ_sl)` and hands the search itself to a [`SearchPolicy`].

mod constrained;
mod staged;

pub use constrained::ConstrainedMinimization;
pub use staged::StagedSearch;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::SolverOptions;
use crate::elements::{Layer, Material, Stack};
use crate::error::{RotorError, RotorResult};
use crate::loads::OperatingPoint;
use crate::results::{StackSolution, StressSample};
use crate::solver::StackSolver;

/// Allowable stresses for the sleeve and magnets, in Pa
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressLimits {
    /// Most compressive radial stress allowed in the sleeve (≤ 0)
    pub max_compressive_radial_sleeve: f64,
    /// Largest hoop tension allowed in the sleeve
    pub max_tensile_tangential_sleeve: f64,
    /// Largest radial stress allowed in the magnets (≤ 0, magnets never in radial tension)
    pub max_radial_magnet: f64,
    /// Largest hoop stress allowed in the magnets
    pub max_tangential_magnet: f64,
}

impl StressLimits {
    pub fn new(
        max_compressive_radial_sleeve: f64,
        max_tensile_tangential_sleeve: f64,
        max_radial_magnet: f64,
        max_tangential_magnet: f64,
    ) -> RotorResult<Self> {
        let all = [
            max_compressive_radial_sleeve,
            max_tensile_tangential_sleeve,
            max_radial_magnet,
            max_tangential_magnet,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(RotorError::InputDomain(format!(
                "stress limits must be finite, got {all:?}"
            )));
        }
        if max_compressive_radial_sleeve > 0.0 {
            return Err(RotorError::InputDomain(format!(
                "sleeve radial limit is a compressive bound and must be <= 0, got {max_compressive_radial_sleeve}"
            )));
        }
        if max_radial_magnet > 0.0 {
            return Err(RotorError::InputDomain(format!(
                "magnet radial limit must be <= 0, got {max_radial_magnet}"
            )));
        }
        Ok(Self {
            max_compressive_radial_sleeve,
            max_tensile_tangential_sleeve,
            max_radial_magnet,
            max_tangential_magnet,
        })
    }
}

/// Signed distance of a trial design from each limit (≥ 0 means satisfied), in Pa
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintMargins {
    pub sleeve_radial: f64,
    pub sleeve_tangential: f64,
    pub magnet_radial: f64,
    pub magnet_tangential: f64,
}

impl ConstraintMargins {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.sleeve_radial,
            self.sleeve_tangential,
            self.magnet_radial,
            self.magnet_tangential,
        ]
    }

    /// Smallest margin; NaN counts as a violation
    pub fn min(&self) -> f64 {
        self.as_array()
            .into_iter()
            .fold(f64::INFINITY, |acc, m| if m.is_nan() { f64::NEG_INFINITY } else { acc.min(m) })
    }

    pub fn is_feasible(&self) -> bool {
        self.min() >= 0.0
    }
}

/// Sampled stresses of the magnet and sleeve layers of one trial
#[derive(Debug, Clone)]
pub(crate) struct StressProfile {
    pub magnets: Vec<StressSample>,
    pub sleeve: Vec<StressSample>,
}

impl StressProfile {
    fn from_solution(solution: &StackSolution, samples: usize) -> Option<Self> {
        let n = solution.len();
        if n < 2 {
            return None;
        }
        Some(Self {
            magnets: solution.field(n - 2)?.sample(samples),
            sleeve: solution.field(n - 1)?.sample(samples),
        })
    }

    fn margins(&self, limits: &StressLimits) -> ConstraintMargins {
        ConstraintMargins {
            sleeve_radial: min_of(&self.sleeve, |s| s.radial)
                - limits.max_compressive_radial_sleeve,
            sleeve_tangential: limits.max_tensile_tangential_sleeve
                - max_of(&self.sleeve, |s| s.tangential),
            magnet_radial: limits.max_radial_magnet - max_of(&self.magnets, |s| s.radial),
            magnet_tangential: limits.max_tangential_magnet
                - max_of(&self.magnets, |s| s.tangential),
        }
    }
}

fn min_of(samples: &[StressSample], f: impl Fn(&StressSample) -> f64) -> f64 {
    samples.iter().map(f).fold(f64::INFINITY, f64::min)
}

fn max_of(samples: &[StressSample], f: impl Fn(&StressSample) -> f64) -> f64 {
    samples.iter().map(f).fold(f64::NEG_INFINITY, f64::max)
}

/// One evaluated sleeve design
#[derive(Debug, Clone)]
pub(crate) struct Trial {
    pub thickness: f64,
    pub interference: f64,
    pub margins: ConstraintMargins,
    pub profile: StressProfile,
    pub solution: StackSolution,
}

/// Counts trial evaluations against a hard cap
#[derive(Debug, Clone)]
pub struct TrialBudget {
    used: usize,
    max: usize,
}

impl TrialBudget {
    pub fn new(max: usize) -> Self {
        Self { used: 0, max }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.max - self.used
    }

    /// Spend one evaluation, failing once the cap is reached
    pub fn charge(&mut self) -> RotorResult<()> {
        if self.used >= self.max {
            return Err(RotorError::infeasible(
                format!("evaluation budget of {} trials exhausted", self.max),
                self.used,
            ));
        }
        self.used += 1;
        Ok(())
    }
}

/// Deepest shrink fit allowed, as a fraction of the rotor radius
const MAX_INTERFERENCE_RATIO: f64 = 0.01;

/// Search and sampling options for sleeve sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizerOptions {
    /// Hard cap on trial evaluations
    pub max_evaluations: usize,
    /// Bisection stops once the bracket is narrower than this, in m
    pub length_tolerance: f64,
    /// Cap on bisection steps per refinement
    pub max_bisections: usize,
    /// Points of the geometric thickness scan
    pub thickness_scan_points: usize,
    /// Points of the interference scan (staged search)
    pub interference_steps: usize,
    /// Alternations of the staged search
    pub max_rounds: usize,
    /// Thinnest sleeve tried, as a fraction of the rotor radius
    pub min_thickness_ratio: f64,
    /// Deepest interference tried, as a fraction of the rotor radius
    pub max_interference_ratio: f64,
    /// Reference thickness of the first staged round, as a fraction of the rotor radius
    pub reference_thickness_ratio: f64,
    /// Sample radii per layer when extracting stress extremes
    pub samples_per_layer: usize,
}

impl Default for SizerOptions {
    fn default() -> Self {
        Self {
            max_evaluations: 400,
            length_tolerance: 1e-7,
            max_bisections: 60,
            thickness_scan_points: 48,
            interference_steps: 50,
            max_rounds: 4,
            min_thickness_ratio: 1e-4,
            max_interference_ratio: MAX_INTERFERENCE_RATIO,
            reference_thickness_ratio: 1e-3,
            samples_per_layer: 64,
        }
    }
}

impl SizerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> RotorResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check that the search box stays inside `d ∈ (0, r]`, `Δ ∈ [−0.01·r, 0]`
    pub fn validate(&self) -> RotorResult<()> {
        if !(self.min_thickness_ratio > 0.0 && self.min_thickness_ratio <= 1.0) {
            return Err(RotorError::InputDomain(format!(
                "min_thickness_ratio must lie in (0, 1], got {}",
                self.min_thickness_ratio
            )));
        }
        if !(0.0..=MAX_INTERFERENCE_RATIO).contains(&self.max_interference_ratio) {
            return Err(RotorError::InputDomain(format!(
                "max_interference_ratio must lie in [0, {MAX_INTERFERENCE_RATIO}], got {}",
                self.max_interference_ratio
            )));
        }
        if !(self.reference_thickness_ratio.is_finite() && self.reference_thickness_ratio > 0.0) {
            return Err(RotorError::InputDomain(format!(
                "reference_thickness_ratio must be finite and positive, got {}",
                self.reference_thickness_ratio
            )));
        }
        if !(self.length_tolerance.is_finite() && self.length_tolerance > 0.0) {
            return Err(RotorError::InputDomain(format!(
                "length_tolerance must be finite and positive, got {}",
                self.length_tolerance
            )));
        }
        Ok(())
    }

    pub fn with_max_evaluations(mut self, max: usize) -> Self {
        self.max_evaluations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.length_tolerance = tol;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples_per_layer = samples.max(2);
        self
    }
}

/// Inputs of one sleeve sizing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleeveProblem {
    /// Shaft, core and magnets; the outermost layer is taken as the magnets
    pub inner: Stack,
    pub sleeve: Material,
    pub limits: StressLimits,
    pub operating: OperatingPoint,
}

impl SleeveProblem {
    pub fn new(
        inner: Stack,
        sleeve: Material,
        limits: StressLimits,
        operating: OperatingPoint,
    ) -> Self {
        Self {
            inner,
            sleeve,
            limits,
            operating,
        }
    }

    /// Outer radius of the magnets, where the sleeve starts
    pub fn rotor_radius(&self) -> f64 {
        self.inner.outer_radius()
    }

    /// The inner stack with a sleeve of thickness `d` and interference `delta`
    pub fn stack_for(&self, thickness: f64, interference: f64) -> RotorResult<Stack> {
        let sleeve = Layer::new("Sleeve", self.rotor_radius(), thickness, self.sleeve)?
            .with_interference(interference);
        self.inner.with_outer_layer(sleeve)
    }
}

/// A feasible sleeve design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleeveDesign {
    /// Sleeve thickness in m
    pub thickness: f64,
    /// Sleeve interference in m (negative = shrink fit)
    pub interference: f64,
    pub margins: ConstraintMargins,
    /// Trial evaluations spent
    pub evaluations: usize,
    /// Whether the search met its tolerance before stopping
    pub converged: bool,
    pub policy: String,
    pub solution: StackSolution,
}

/// Strategy for searching the `(d_sl, Δ_sl)` box
///
/// Implementations must return a design whose margins are all satisfied or
/// an [`RotorError::InfeasibleDesign`], and must charge every evaluation to
/// the budget.
pub trait SearchPolicy {
    fn name(&self) -> &'static str;

    fn search(&self, sizer: &SleeveSizer, budget: &mut TrialBudget) -> RotorResult<SleeveDesign>;
}

/// Evaluates sleeve trials for one problem and runs search policies over them
#[derive(Debug, Clone)]
pub struct SleeveSizer {
    problem: SleeveProblem,
    options: SizerOptions,
    solver: StackSolver,
}

impl SleeveSizer {
    pub fn new(problem: SleeveProblem, options: SizerOptions) -> RotorResult<Self> {
        options.validate()?;
        let solver = StackSolver::new(SolverOptions::default().with_samples(options.samples_per_layer));
        Ok(Self {
            problem,
            options,
            solver,
        })
    }

    pub fn problem(&self) -> &SleeveProblem {
        &self.problem
    }

    pub fn options(&self) -> &SizerOptions {
        &self.options
    }

    /// `[d_min, d_max]` in m
    pub fn thickness_bounds(&self) -> (f64, f64) {
        let r = self.problem.rotor_radius();
        (self.options.min_thickness_ratio * r, r)
    }

    /// `[Δ_min, 0]` in m
    pub fn interference_bounds(&self) -> (f64, f64) {
        (-self.options.max_interference_ratio * self.problem.rotor_radius(), 0.0)
    }

    /// Run a search policy
    pub fn size(&self, policy: &dyn SearchPolicy) -> RotorResult<SleeveDesign> {
        let mut budget = TrialBudget::new(self.options.max_evaluations);
        let design = policy.search(self, &mut budget)?;

        // Never hand out a design that violates its limits.
        if !design.margins.is_feasible() {
            return Err(RotorError::infeasible(
                format!("{} returned a design violating its limits", policy.name()),
                design.evaluations,
            ));
        }
        info!(
            "{}: sleeve {:.4} mm, interference {:.4} mm after {} evaluations (converged: {})",
            policy.name(),
            design.thickness * 1e3,
            design.interference * 1e3,
            design.evaluations,
            design.converged
        );
        Ok(design)
    }

    /// Run the constrained-minimisation policy with default settings
    pub fn size_default(&self) -> RotorResult<SleeveDesign> {
        self.size(&ConstrainedMinimization)
    }

    /// Margins of a single design, outside of any search budget
    pub fn evaluate(&self, thickness: f64, interference: f64) -> RotorResult<ConstraintMargins> {
        let stack = self.problem.stack_for(thickness, interference)?;
        let solution = self.solver.solve(&stack, &self.problem.operating)?;
        let profile = StressProfile::from_solution(&solution, self.options.samples_per_layer)
            .ok_or_else(|| RotorError::SingularSystem("sleeve stack needs magnets and sleeve".into()))?;
        Ok(profile.margins(&self.problem.limits))
    }

    /// Evaluate a trial, charging the budget; a singular trial stack is a rejected trial
    pub(crate) fn trial(
        &self,
        budget: &mut TrialBudget,
        thickness: f64,
        interference: f64,
    ) -> RotorResult<Option<Trial>> {
        budget.charge()?;
        let solved = self
            .problem
            .stack_for(thickness, interference)
            .and_then(|stack| self.solver.solve(&stack, &self.problem.operating));
        let solution = match solved {
            Ok(solution) => solution,
            Err(RotorError::SingularSystem(msg)) => {
                warn!("rejecting trial d = {thickness:.4e} m, delta = {interference:.4e} m: {msg}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let Some(profile) = StressProfile::from_solution(&solution, self.options.samples_per_layer)
        else {
            return Ok(None);
        };
        let margins = profile.margins(&self.problem.limits);
        debug!(
            "trial {}: d = {:.4e} m, delta = {:.4e} m, margins = {:?}",
            budget.used(),
            thickness,
            interference,
            margins.as_array()
        );
        Ok(Some(Trial {
            thickness,
            interference,
            margins,
            profile,
            solution,
        }))
    }

    pub(crate) fn design(
        &self,
        trial: Trial,
        budget: &TrialBudget,
        converged: bool,
        policy: &str,
    ) -> SleeveDesign {
        SleeveDesign {
            thickness: trial.thickness,
            interference: trial.interference,
            margins: trial.margins,
            evaluations: budget.used(),
            converged,
            policy: policy.to_string(),
            solution: trial.solution,
        }
    }
}
