//! Two-stage monotone search
//!
//! Stage one fixes the thickness and walks the interference from zero
//! towards `Δ_min`, keeping the deepest value whose sleeve hoop stress stays
//! under its limit. Stage two fixes that interference and walks the
//! thickness upwards until the magnets are no longer in radial tension.
//! Each candidate is re-validated against all four limits, and the stages
//! are alternated with the latest thickness as the next reference.

use log::debug;

use super::{SearchPolicy, SleeveDesign, SleeveSizer, Trial, TrialBudget};
use crate::error::{RotorError, RotorResult};
use crate::math::{geomspace, linspace};

/// Interference scan followed by a thickness scan
#[derive(Debug, Clone, Copy, Default)]
pub struct StagedSearch;

/// Which single margin a scan watches
#[derive(Debug, Clone, Copy)]
enum Watch {
    SleeveTangential,
    MagnetRadial,
}

impl Watch {
    fn satisfied(self, trial: &Trial) -> bool {
        match self {
            Watch::SleeveTangential => trial.margins.sleeve_tangential >= 0.0,
            Watch::MagnetRadial => trial.margins.magnet_radial >= 0.0,
        }
    }

    /// The variable this scan moves
    fn variable(self, trial: &Trial) -> f64 {
        match self {
            Watch::SleeveTangential => trial.interference,
            Watch::MagnetRadial => trial.thickness,
        }
    }

    /// `(d, Δ)` of `trial` with the scanned variable replaced by `value`
    fn with_variable(self, trial: &Trial, value: f64) -> (f64, f64) {
        match self {
            Watch::SleeveTangential => (trial.thickness, value),
            Watch::MagnetRadial => (value, trial.interference),
        }
    }
}

/// Bisect between a passing trial and a failing value of the scanned
/// variable, returning the last passing trial
fn refine(
    sizer: &SleeveSizer,
    budget: &mut TrialBudget,
    mut pass: Trial,
    mut fail: f64,
    watch: Watch,
) -> RotorResult<Trial> {
    let opts = sizer.options();
    for _ in 0..opts.max_bisections {
        let current = watch.variable(&pass);
        if (current - fail).abs() <= opts.length_tolerance {
            break;
        }
        let mid = 0.5 * (current + fail);
        let (d, delta) = watch.with_variable(&pass, mid);
        match sizer.trial(budget, d, delta)? {
            Some(trial) if watch.satisfied(&trial) => pass = trial,
            _ => fail = mid,
        }
    }
    Ok(pass)
}

impl StagedSearch {
    /// Deepest interference at `thickness` keeping the sleeve hoop stress in limit
    fn interference_stage(
        &self,
        sizer: &SleeveSizer,
        budget: &mut TrialBudget,
        thickness: f64,
    ) -> RotorResult<Trial> {
        let (delta_min, _) = sizer.interference_bounds();
        let steps = sizer.options().interference_steps.max(1);

        let mut pass: Option<Trial> = None;
        for delta in linspace(0.0, delta_min, steps + 1) {
            match sizer.trial(budget, thickness, delta)? {
                Some(trial) if Watch::SleeveTangential.satisfied(&trial) => pass = Some(trial),
                _ => {
                    let Some(pass) = pass else {
                        return Err(RotorError::infeasible(
                            format!("sleeve hoop limit exceeded without interference at d = {thickness:.4e} m"),
                            budget.used(),
                        ));
                    };
                    return refine(sizer, budget, pass, delta, Watch::SleeveTangential);
                }
            }
        }
        pass.ok_or_else(|| RotorError::infeasible("empty interference scan", budget.used()))
    }

    /// Thinnest sleeve at `interference` that keeps the magnets in radial compression
    fn thickness_stage(
        &self,
        sizer: &SleeveSizer,
        budget: &mut TrialBudget,
        interference: f64,
    ) -> RotorResult<Trial> {
        let (d_min, d_max) = sizer.thickness_bounds();
        let points = sizer.options().thickness_scan_points.max(2);

        let mut last_fail = None;
        for d in geomspace(d_min, d_max, points) {
            match sizer.trial(budget, d, interference)? {
                Some(trial) if Watch::MagnetRadial.satisfied(&trial) => {
                    return match last_fail {
                        Some(fail) => refine(sizer, budget, trial, fail, Watch::MagnetRadial),
                        None => Ok(trial),
                    };
                }
                _ => last_fail = Some(d),
            }
        }
        Err(RotorError::infeasible(
            format!(
                "magnets stay in radial tension up to d = {d_max:.4e} m at delta = {interference:.4e} m"
            ),
            budget.used(),
        ))
    }

    fn round(
        &self,
        sizer: &SleeveSizer,
        budget: &mut TrialBudget,
        reference: f64,
    ) -> RotorResult<Trial> {
        let stage_one = self.interference_stage(sizer, budget, reference)?;
        self.thickness_stage(sizer, budget, stage_one.interference)
    }
}

impl SearchPolicy for StagedSearch {
    fn name(&self) -> &'static str {
        "staged search"
    }

    fn search(&self, sizer: &SleeveSizer, budget: &mut TrialBudget) -> RotorResult<SleeveDesign> {
        let opts = sizer.options();
        let (d_min, d_max) = sizer.thickness_bounds();
        let mut reference =
            (opts.reference_thickness_ratio * sizer.problem().rotor_radius()).clamp(d_min, d_max);

        let mut best: Option<Trial> = None;
        let mut previous: Option<f64> = None;
        let mut converged = false;
        let mut last_err = None;

        for round in 0..opts.max_rounds.max(1) {
            let candidate = match self.round(sizer, budget, reference) {
                Ok(trial) => trial,
                Err(e) if e.is_infeasible() => {
                    last_err = Some(e);
                    break;
                }
                Err(e) => return Err(e),
            };
            debug!(
                "staged round {round}: d = {:.4e} m, delta = {:.4e} m, feasible = {}",
                candidate.thickness,
                candidate.interference,
                candidate.margins.is_feasible()
            );

            let d = candidate.thickness;
            let thinner = match &best {
                Some(b) => d < b.thickness,
                None => true,
            };
            if candidate.margins.is_feasible() && thinner {
                best = Some(candidate);
            }
            if previous.is_some_and(|p| (p - d).abs() <= opts.length_tolerance) {
                converged = true;
                break;
            }
            previous = Some(d);
            reference = d;
        }

        match best {
            Some(trial) => Ok(sizer.design(trial, budget, converged, self.name())),
            None => Err(last_err.unwrap_or_else(|| {
                RotorError::infeasible(
                    "staged candidates never satisfied all four limits",
                    budget.used(),
                )
            })),
        }
    }
}
