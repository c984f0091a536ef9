//! Minimum-thickness search subject to the four stress constraints
//!
//! With the geometry fixed, the system matrix does not depend on the
//! interference, so every sampled stress is affine in `Δ_sl`. Two solves at
//! the ends of the interference range therefore give each constraint as a
//! half-line in `Δ_sl`, and the feasible interferences for that thickness
//! form an interval found without further iteration. The thickness is then
//! minimised by a geometric scan that brackets the first feasible value,
//! refined by bisection.

use log::debug;

use super::{SearchPolicy, SleeveDesign, SleeveSizer, StressProfile, Trial, TrialBudget};
use crate::error::{RotorError, RotorResult};
use crate::math::geomspace;

/// Minimise `d_sl` subject to the sleeve and magnet stress limits
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedMinimization;

/// Feasible fraction `t ∈ [lo, hi]` of the interference range, `Δ = t·Δ_min`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    fn unit() -> Self {
        Self { lo: 0.0, hi: 1.0 }
    }

    /// Intersect with `{t : a + b·t ≥ 0}`
    fn restrict(&mut self, a: f64, b: f64) {
        if a.is_nan() || b.is_nan() {
            self.lo = f64::INFINITY;
        } else if b > 0.0 {
            self.lo = self.lo.max(-a / b);
        } else if b < 0.0 {
            self.hi = self.hi.min(-a / b);
        } else if a < 0.0 {
            self.lo = f64::INFINITY;
        }
    }

    fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    fn midpoint(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }
}

/// Interference fractions satisfying every sampled constraint
fn feasible_interval(sizer: &SleeveSizer, at_zero: &StressProfile, at_min: &StressProfile) -> Interval {
    let limits = &sizer.problem().limits;
    let mut interval = Interval::unit();

    for (s0, s1) in at_zero.sleeve.iter().zip(&at_min.sleeve) {
        // σ_r ≥ limit
        interval.restrict(s0.radial - limits.max_compressive_radial_sleeve, s1.radial - s0.radial);
        // σ_t ≤ limit
        interval.restrict(
            limits.max_tensile_tangential_sleeve - s0.tangential,
            s0.tangential - s1.tangential,
        );
    }
    for (s0, s1) in at_zero.magnets.iter().zip(&at_min.magnets) {
        interval.restrict(limits.max_radial_magnet - s0.radial, s0.radial - s1.radial);
        interval.restrict(
            limits.max_tangential_magnet - s0.tangential,
            s0.tangential - s1.tangential,
        );
    }
    interval
}

impl ConstrainedMinimization {
    /// A validated feasible trial at thickness `d`, if any interference admits one
    fn feasible_at(
        &self,
        sizer: &SleeveSizer,
        budget: &mut TrialBudget,
        thickness: f64,
    ) -> RotorResult<Option<Trial>> {
        let (delta_min, _) = sizer.interference_bounds();

        let Some(at_zero) = sizer.trial(budget, thickness, 0.0)? else {
            return Ok(None);
        };
        if at_zero.margins.is_feasible() && delta_min == 0.0 {
            return Ok(Some(at_zero));
        }
        let Some(at_min) = sizer.trial(budget, thickness, delta_min)? else {
            return Ok(None);
        };

        let interval = feasible_interval(sizer, &at_zero.profile, &at_min.profile);
        if interval.is_empty() {
            return Ok(None);
        }
        let t = interval.midpoint();
        if t == 0.0 {
            return Ok(at_zero.margins.is_feasible().then_some(at_zero));
        }
        if t == 1.0 {
            return Ok(at_min.margins.is_feasible().then_some(at_min));
        }

        let checked = sizer.trial(budget, thickness, t * delta_min)?;
        Ok(checked.filter(|trial| {
            let ok = trial.margins.is_feasible();
            if !ok {
                debug!("interval midpoint at d = {thickness:.4e} m failed re-validation");
            }
            ok
        }))
    }
}

impl SearchPolicy for ConstrainedMinimization {
    fn name(&self) -> &'static str {
        "constrained minimization"
    }

    fn search(&self, sizer: &SleeveSizer, budget: &mut TrialBudget) -> RotorResult<SleeveDesign> {
        let opts = sizer.options();
        let (d_min, d_max) = sizer.thickness_bounds();

        let mut last_infeasible = None;
        let mut first_feasible = None;
        for d in geomspace(d_min, d_max, opts.thickness_scan_points.max(2)) {
            match self.feasible_at(sizer, budget, d)? {
                Some(trial) => {
                    first_feasible = Some(trial);
                    break;
                }
                None => last_infeasible = Some(d),
            }
        }

        let Some(mut best) = first_feasible else {
            return Err(RotorError::infeasible(
                format!(
                    "no interference in [{:.4e}, 0] m meets all limits for any thickness up to {:.4e} m",
                    sizer.interference_bounds().0,
                    d_max
                ),
                budget.used(),
            ));
        };

        // Feasible at the thinnest sleeve: the bound itself is the optimum.
        let Some(mut lo) = last_infeasible else {
            return Ok(sizer.design(best, budget, true, self.name()));
        };

        let mut converged = false;
        for _ in 0..opts.max_bisections {
            if best.thickness - lo <= opts.length_tolerance {
                converged = true;
                break;
            }
            let mid = 0.5 * (lo + best.thickness);
            match self.feasible_at(sizer, budget, mid) {
                Ok(Some(trial)) => best = trial,
                Ok(None) => lo = mid,
                // Out of budget: keep the last validated design
                Err(e) if e.is_infeasible() => break,
                Err(e) => return Err(e),
            }
        }
        converged |= best.thickness - lo <= opts.length_tolerance;

        Ok(sizer.design(best, budget, converged, self.name()))
    }
}
