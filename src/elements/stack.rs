//! Ordered, contiguous sequence of layers from the shaft centre outwards

use serde::{Deserialize, Serialize};

use super::layer::Layer;
use super::material::Material;
use crate::error::{RotorError, RotorResult};

/// Radii closer than this (relative to the outer radius) are treated as equal
const RADIUS_TOL: f64 = 1e-12;

/// Immutable rotor stack
///
/// Invariants: at least one layer, the innermost layer starts at `r = 0`,
/// every layer has positive thickness and each layer starts where the
/// previous one ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Layer>", into = "Vec<Layer>")]
pub struct Stack {
    layers: Vec<Layer>,
}

impl Stack {
    /// Validate and build a stack
    pub fn new(layers: Vec<Layer>) -> RotorResult<Self> {
        let Some(first) = layers.first() else {
            return Err(RotorError::SingularSystem("stack has no layers".to_string()));
        };
        for layer in &layers {
            if !layer.r_i.is_finite() || !layer.r_o.is_finite() {
                return Err(RotorError::InputDomain(format!(
                    "layer '{}' has non-finite radii ({} .. {})",
                    layer.name, layer.r_i, layer.r_o
                )));
            }
            if !layer.interference.is_finite() {
                return Err(RotorError::InputDomain(format!(
                    "layer '{}' has non-finite interference {}",
                    layer.name, layer.interference
                )));
            }
        }
        if first.r_i != 0.0 {
            return Err(RotorError::SingularSystem(format!(
                "innermost layer '{}' must start at r = 0, starts at {}",
                first.name, first.r_i
            )));
        }

        let scale = layers.iter().map(|l| l.r_o).fold(0.0_f64, f64::max);
        let tol = RADIUS_TOL * scale.max(1.0);

        for (k, layer) in layers.iter().enumerate() {
            let thickness = layer.r_o - layer.r_i;
            if thickness.is_nan() || thickness <= tol {
                return Err(RotorError::SingularSystem(format!(
                    "layer {k} '{}' has zero or negative thickness ({} .. {})",
                    layer.name, layer.r_i, layer.r_o
                )));
            }
            if k > 0 {
                let prev = &layers[k - 1];
                if (layer.r_i - prev.r_o).abs() > tol {
                    return Err(RotorError::SingularSystem(format!(
                        "layer {k} '{}' starts at {} but '{}' ends at {}",
                        layer.name, layer.r_i, prev.name, prev.r_o
                    )));
                }
            }
        }

        Ok(Self { layers })
    }

    /// Build a stack from `(name, thickness, material)` bands, innermost first
    pub fn from_thicknesses(bands: &[(&str, f64, Material)]) -> RotorResult<Self> {
        let mut r = 0.0;
        let mut layers = Vec::with_capacity(bands.len());
        for (name, thickness, material) in bands {
            let layer = Layer::new(name, r, *thickness, *material)?;
            r = layer.r_o;
            layers.push(layer);
        }
        Self::new(layers)
    }

    /// Return a new stack with `layer` appended outside the current outer radius
    pub fn with_outer_layer(&self, layer: Layer) -> RotorResult<Self> {
        let mut layers = self.layers.clone();
        layers.push(layer);
        Self::new(layers)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn outer_radius(&self) -> f64 {
        self.layers.last().map_or(0.0, |l| l.r_o)
    }

    /// Index of the layer containing `r`, preferring the inner layer on an interface
    pub fn layer_index_at(&self, r: f64) -> Option<usize> {
        self.layers.iter().position(|l| l.contains(r))
    }
}

impl TryFrom<Vec<Layer>> for Stack {
    type Error = RotorError;

    fn try_from(layers: Vec<Layer>) -> RotorResult<Self> {
        Self::new(layers)
    }
}

impl From<Stack> for Vec<Layer> {
    fn from(stack: Stack) -> Self {
        stack.layers
    }
}
