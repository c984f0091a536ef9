//! A single radial band of a rotor stack

use serde::{Deserialize, Serialize};

use super::material::Material;
use crate::error::{RotorError, RotorResult};

/// One radial band of the stack bound to a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Label used in logs and limit reports
    pub name: String,
    /// Inner radius in m
    pub r_i: f64,
    /// Outer radius in m
    pub r_o: f64,
    pub material: Material,
    /// Allowable |σ_r| in Pa
    pub max_radial_stress: Option<f64>,
    /// Allowable |σ_t| in Pa
    pub max_tangential_stress: Option<f64>,
    /// Radial oversize of this layer's inner boundary in m (negative = shrink fit)
    pub interference: f64,
}

impl Layer {
    /// Create a layer from its inner radius and thickness
    pub fn new(name: &str, r_i: f64, thickness: f64, material: Material) -> RotorResult<Self> {
        if !r_i.is_finite() || r_i < 0.0 {
            return Err(RotorError::InputDomain(format!(
                "layer '{name}': inner radius must be finite and >= 0, got {r_i}"
            )));
        }
        if !thickness.is_finite() || thickness < 0.0 {
            return Err(RotorError::InputDomain(format!(
                "layer '{name}': thickness must be finite and >= 0, got {thickness}"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            r_i,
            r_o: r_i + thickness,
            material,
            max_radial_stress: None,
            max_tangential_stress: None,
            interference: 0.0,
        })
    }

    /// Attach a radial stress limit
    pub fn with_max_radial_stress(mut self, limit: f64) -> Self {
        self.max_radial_stress = Some(limit);
        self
    }

    /// Attach a tangential stress limit
    pub fn with_max_tangential_stress(mut self, limit: f64) -> Self {
        self.max_tangential_stress = Some(limit);
        self
    }

    /// Set the interference at the inner boundary
    pub fn with_interference(mut self, interference: f64) -> Self {
        self.interference = interference;
        self
    }

    pub fn thickness(&self) -> f64 {
        self.r_o - self.r_i
    }

    /// Whether `r` lies inside the band (inclusive)
    pub fn contains(&self, r: f64) -> bool {
        r >= self.r_i && r <= self.r_o
    }
}
