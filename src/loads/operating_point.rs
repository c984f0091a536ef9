//! Steady operating point: speed, temperature rise and surface pressure

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{RotorError, RotorResult};

/// Steady-state load on a rotor stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    /// Rotational speed in rad/s
    pub omega: f64,
    /// Uniform temperature rise above the stress-free state in K
    pub delta_t: f64,
    /// Pressure on the outermost surface in Pa (positive = compressive)
    #[serde(default)]
    pub outer_pressure: f64,
}

impl OperatingPoint {
    /// Create an operating point from speed in rad/s and temperature rise
    pub fn new(omega: f64, delta_t: f64) -> RotorResult<Self> {
        if !omega.is_finite() {
            return Err(RotorError::InputDomain(format!(
                "rotational speed must be finite, got {omega}"
            )));
        }
        if !delta_t.is_finite() {
            return Err(RotorError::InputDomain(format!(
                "temperature rise must be finite, got {delta_t}"
            )));
        }
        Ok(Self {
            omega,
            delta_t,
            outer_pressure: 0.0,
        })
    }

    /// Create an operating point from speed in revolutions per minute
    pub fn from_rpm(rpm: f64, delta_t: f64) -> RotorResult<Self> {
        Self::new(rpm * 2.0 * PI / 60.0, delta_t)
    }

    /// Stationary, isothermal, unloaded
    pub fn at_rest() -> Self {
        Self {
            omega: 0.0,
            delta_t: 0.0,
            outer_pressure: 0.0,
        }
    }

    /// Apply a pressure to the outermost surface
    pub fn with_outer_pressure(mut self, pressure: f64) -> Self {
        self.outer_pressure = pressure;
        self
    }

    pub fn omega_squared(&self) -> f64 {
        self.omega * self.omega
    }

    pub fn rpm(&self) -> f64 {
        self.omega * 60.0 / (2.0 * PI)
    }
}

impl Default for OperatingPoint {
    fn default() -> Self {
        Self::at_rest()
    }
}
