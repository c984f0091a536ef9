//! Material properties and derived elastic/thermal constants
//!
//! Each layer of a rotor is described by the coefficients of the
//! axisymmetric stress-strain law
//!
//! ```text
//! σ_r = c1·ε_r + c2·ε_t − (thermal)
//! σ_t = c2·ε_r + c3·ε_t − (thermal)
//! ```
//!
//! Isotropic layers use the plane-stress law. Transversely isotropic layers
//! (hoop-wound composites, fibre along the tangential direction) use the
//! generalized plane-strain law with `ε_z = 0`, which is where the in-plane
//! Poisson ratio `nu_p` enters.

use serde::{Deserialize, Serialize};

use crate::error::{RotorError, RotorResult};

/// Relative tolerance used to detect coincident stiffness terms
const DEGENERACY_TOL: f64 = 1e-9;

/// Raw physical constants of a material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialProperties {
    Isotropic {
        /// Density in kg/m³
        rho: f64,
        /// Young's modulus in Pa
        e: f64,
        /// Poisson's ratio
        nu: f64,
        /// Thermal expansion coefficient in 1/K
        alpha: f64,
    },
    TransverseIsotropic {
        /// Density in kg/m³
        rho: f64,
        /// Modulus along the fibre (tangential) axis in Pa
        e_t: f64,
        /// Modulus in the isotropic r-z plane in Pa
        e_p: f64,
        /// Poisson's ratio for a fibre-direction load, transverse strain
        nu_tp: f64,
        /// Poisson's ratio within the isotropic plane
        nu_p: f64,
        /// Radial thermal expansion coefficient in 1/K
        alpha_r: f64,
        /// Tangential (fibre) thermal expansion coefficient in 1/K
        alpha_t: f64,
    },
}

impl MaterialProperties {
    /// Density in kg/m³
    pub fn density(&self) -> f64 {
        match *self {
            MaterialProperties::Isotropic { rho, .. } => rho,
            MaterialProperties::TransverseIsotropic { rho, .. } => rho,
        }
    }
}

/// Constants derived once from [`MaterialProperties`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedConstants {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    /// Exponent of the homogeneous solution `u = A·r^h + B·r^-h`
    pub h: f64,
    /// Uniform radial stress per kelvin of temperature rise
    pub zeta_r: f64,
    /// Uniform tangential stress per kelvin of temperature rise
    pub zeta_t: f64,
    /// Free thermal radial strain per kelvin
    pub zeta_u: f64,
    /// Centrifugal coupling, particular displacement is `beta·ω²·r³`
    pub beta: f64,
}

impl DerivedConstants {
    /// Radial stress factor of the `A` coefficient
    pub fn radial_a(&self) -> f64 {
        self.c1 * self.h + self.c2
    }

    /// Radial stress factor of the `B` coefficient
    pub fn radial_b(&self) -> f64 {
        self.c2 - self.c1 * self.h
    }

    /// Tangential stress factor of the `A` coefficient
    pub fn tangential_a(&self) -> f64 {
        self.c2 * self.h + self.c3
    }

    /// Tangential stress factor of the `B` coefficient
    pub fn tangential_b(&self) -> f64 {
        self.c3 - self.c2 * self.h
    }

    /// Radial stress factor of the centrifugal particular solution
    pub fn radial_spin(&self) -> f64 {
        (3.0 * self.c1 + self.c2) * self.beta
    }

    /// Tangential stress factor of the centrifugal particular solution
    pub fn tangential_spin(&self) -> f64 {
        (3.0 * self.c2 + self.c3) * self.beta
    }
}

/// A validated material with its derived constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaterialProperties", into = "MaterialProperties")]
pub struct Material {
    properties: MaterialProperties,
    derived: DerivedConstants,
}

impl Material {
    /// Create an isotropic material (plane stress)
    pub fn isotropic(rho: f64, e: f64, nu: f64, alpha: f64) -> RotorResult<Self> {
        Self::from_properties(MaterialProperties::Isotropic { rho, e, nu, alpha })
    }

    /// Create a transversely isotropic material with the fibre along the
    /// tangential direction (generalized plane strain)
    #[allow(clippy::too_many_arguments)]
    pub fn transverse_isotropic(
        rho: f64,
        e_t: f64,
        e_p: f64,
        nu_tp: f64,
        nu_p: f64,
        alpha_r: f64,
        alpha_t: f64,
    ) -> RotorResult<Self> {
        Self::from_properties(MaterialProperties::TransverseIsotropic {
            rho,
            e_t,
            e_p,
            nu_tp,
            nu_p,
            alpha_r,
            alpha_t,
        })
    }

    /// Validate raw constants and derive the stress-law coefficients
    pub fn from_properties(properties: MaterialProperties) -> RotorResult<Self> {
        validate(&properties)?;
        let derived = derive(&properties);

        let spin_den = 9.0 * derived.c1 - derived.c3;
        if spin_den.abs() <= DEGENERACY_TOL * derived.c3.abs().max(derived.c1.abs()) {
            return Err(RotorError::InputDomain(format!(
                "stiffness ratio c3/c1 = 9 makes the centrifugal solution resonant (h = {})",
                derived.h
            )));
        }
        if !derived.zeta_u.is_finite() {
            return Err(RotorError::InputDomain(
                "c1 == c3 with unequal radial and tangential expansion has no power-law thermal solution"
                    .to_string(),
            ));
        }

        Ok(Self {
            properties,
            derived,
        })
    }

    pub fn properties(&self) -> &MaterialProperties {
        &self.properties
    }

    pub fn derived(&self) -> &DerivedConstants {
        &self.derived
    }

    /// Density in kg/m³
    pub fn density(&self) -> f64 {
        self.properties.density()
    }

    pub fn is_isotropic(&self) -> bool {
        matches!(self.properties, MaterialProperties::Isotropic { .. })
    }

    /// Structural steel for shafts
    pub fn structural_steel() -> Self {
        Self::preset(MaterialProperties::Isotropic {
            rho: 7870.0,
            e: 200e9,
            nu: 0.30,
            alpha: 1.2e-5,
        })
    }

    /// Laminated electrical steel for rotor cores (M19-like)
    pub fn electrical_steel() -> Self {
        Self::preset(MaterialProperties::Isotropic {
            rho: 7650.0,
            e: 185e9,
            nu: 0.30,
            alpha: 1.2e-5,
        })
    }

    /// Sintered NdFeB magnet
    pub fn ndfeb() -> Self {
        Self::preset(MaterialProperties::Isotropic {
            rho: 7500.0,
            e: 160e9,
            nu: 0.24,
            alpha: 5.0e-6,
        })
    }

    /// Hoop-wound carbon fibre / epoxy retention sleeve
    pub fn carbon_fiber_sleeve() -> Self {
        Self::preset(MaterialProperties::TransverseIsotropic {
            rho: 1610.0,
            e_t: 125e9,
            e_p: 8.8e9,
            nu_tp: 0.30,
            nu_p: 0.37,
            alpha_r: 3.0e-5,
            alpha_t: -4.7e-7,
        })
    }

    // Presets are known-valid constants, so they skip the validation pass.
    fn preset(properties: MaterialProperties) -> Self {
        Self {
            properties,
            derived: derive(&properties),
        }
    }
}

impl TryFrom<MaterialProperties> for Material {
    type Error = RotorError;

    fn try_from(properties: MaterialProperties) -> RotorResult<Self> {
        Self::from_properties(properties)
    }
}

impl From<Material> for MaterialProperties {
    fn from(material: Material) -> Self {
        material.properties
    }
}

fn require_finite(name: &str, value: f64) -> RotorResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RotorError::InputDomain(format!("{name} must be finite, got {value}")))
    }
}

fn require_positive(name: &str, value: f64) -> RotorResult<()> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(RotorError::InputDomain(format!("{name} must be positive, got {value}")))
    }
}

fn require_density(rho: f64) -> RotorResult<()> {
    require_finite("density", rho)?;
    if rho < 0.0 {
        return Err(RotorError::InputDomain(format!(
            "density must not be negative, got {rho}"
        )));
    }
    Ok(())
}

fn validate(properties: &MaterialProperties) -> RotorResult<()> {
    match *properties {
        MaterialProperties::Isotropic { rho, e, nu, alpha } => {
            require_density(rho)?;
            require_positive("Young's modulus", e)?;
            require_finite("Poisson's ratio", nu)?;
            require_finite("thermal expansion", alpha)?;
            if nu.abs() >= 0.5 {
                return Err(RotorError::InputDomain(format!(
                    "Poisson's ratio must satisfy |nu| < 0.5, got {nu}"
                )));
            }
        }
        MaterialProperties::TransverseIsotropic {
            rho,
            e_t,
            e_p,
            nu_tp,
            nu_p,
            alpha_r,
            alpha_t,
        } => {
            require_density(rho)?;
            require_positive("fibre modulus e_t", e_t)?;
            require_positive("planar modulus e_p", e_p)?;
            require_finite("nu_tp", nu_tp)?;
            require_finite("nu_p", nu_p)?;
            require_finite("alpha_r", alpha_r)?;
            require_finite("alpha_t", alpha_t)?;
            if nu_p.abs() >= 1.0 {
                return Err(RotorError::InputDomain(format!(
                    "in-plane Poisson's ratio must satisfy |nu_p| < 1, got {nu_p}"
                )));
            }
            let del = (1.0 - nu_p) * e_t - 2.0 * nu_tp * nu_tp * e_p;
            if del <= 0.0 {
                return Err(RotorError::InputDomain(format!(
                    "degenerate composite: (1 - nu_p)·e_t - 2·nu_tp²·e_p = {del:.4e} <= 0"
                )));
            }
        }
    }
    Ok(())
}

fn derive(properties: &MaterialProperties) -> DerivedConstants {
    match *properties {
        MaterialProperties::Isotropic { rho, e, nu, alpha } => {
            let c1 = e / (1.0 - nu * nu);
            let c2 = nu * c1;
            let c3 = c1;
            DerivedConstants {
                c1,
                c2,
                c3,
                h: 1.0,
                zeta_r: 0.0,
                zeta_t: 0.0,
                zeta_u: alpha,
                beta: -rho / (9.0 * c1 - c3),
            }
        }
        MaterialProperties::TransverseIsotropic {
            rho,
            e_t,
            e_p,
            nu_tp,
            nu_p,
            alpha_r,
            alpha_t,
        } => {
            let del = (1.0 - nu_p) * e_t - 2.0 * nu_tp * nu_tp * e_p;
            let c1 = e_p * (e_t - nu_tp * nu_tp * e_p) / ((1.0 + nu_p) * del);
            let c2 = nu_tp * e_p * e_t / del;
            let c3 = (1.0 - nu_p) * e_t * e_t / del;

            // Expansion seen in the r-t plane once the axial strain is suppressed
            let alpha_r_eff = (1.0 + nu_p) * alpha_r;
            let alpha_t_eff = alpha_t + nu_tp * (e_p / e_t) * alpha_r;

            let zeta_u = if (c1 - c3).abs() <= DEGENERACY_TOL * c1.max(c3) {
                if (alpha_r_eff - alpha_t_eff).abs()
                    <= DEGENERACY_TOL * alpha_r_eff.abs().max(alpha_t_eff.abs())
                {
                    alpha_r_eff
                } else {
                    f64::NAN
                }
            } else {
                ((c1 - c2) * alpha_r_eff + (c2 - c3) * alpha_t_eff) / (c1 - c3)
            };

            DerivedConstants {
                c1,
                c2,
                c3,
                h: (c3 / c1).sqrt(),
                zeta_r: (c1 + c2) * zeta_u - c1 * alpha_r_eff - c2 * alpha_t_eff,
                zeta_t: (c2 + c3) * zeta_u - c2 * alpha_r_eff - c3 * alpha_t_eff,
                zeta_u,
                beta: -rho / (9.0 * c1 - c3),
            }
        }
    }
}
