//! Material property definitions.
//!
//! Isotropic linear elastic materials and the planar formulations that turn
//! them into the three stiffness coefficients used by assembly.

use crate::error::{Error, Result};
use nalgebra::Matrix3;
use std::fmt;
use std::str::FromStr;

/// Material properties for structural analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Young's modulus (Pa).
    pub youngs_modulus: f64,
    /// Poisson's ratio (dimensionless).
    pub poissons_ratio: f64,
    /// Mass density (kg/m³), zero for a weightless body.
    pub density: f64,
}

impl Material {
    /// Create a new isotropic linear elastic material.
    ///
    /// # Arguments
    ///
    /// * `youngs_modulus` - Young's modulus E (Pa)
    /// * `poissons_ratio` - Poisson's ratio ν (dimensionless, -1 < ν < 0.5)
    ///
    /// # Errors
    ///
    /// Returns error if material properties are physically invalid.
    pub fn new(youngs_modulus: f64, poissons_ratio: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0) || !youngs_modulus.is_finite() {
            return Err(Error::InvalidMaterial(
                "Young's modulus must be positive".into(),
            ));
        }
        if !(poissons_ratio > -1.0 && poissons_ratio < 0.5) {
            return Err(Error::InvalidMaterial(
                "Poisson's ratio must be in range (-1, 0.5)".into(),
            ));
        }
        Ok(Self {
            youngs_modulus,
            poissons_ratio,
            density: 0.0,
        })
    }

    /// Create a material with density specified.
    pub fn with_density(mut self, density: f64) -> Result<Self> {
        if !(density >= 0.0) || !density.is_finite() {
            return Err(Error::InvalidMaterial(
                "Density must be non-negative".into(),
            ));
        }
        self.density = density;
        Ok(self)
    }

    /// Shear modulus G = E / (2(1 + ν)).
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poissons_ratio))
    }

    /// Stiffness coefficients (A, B, C) for a planar formulation.
    pub fn coefficients(&self, case: ElasticCase) -> ElasticCoefficients {
        let e = self.youngs_modulus;
        let nu = self.poissons_ratio;
        let c = self.shear_modulus();

        match case {
            ElasticCase::PlaneStress => {
                let factor = e / (1.0 - nu * nu);
                ElasticCoefficients {
                    a: factor,
                    b: factor * nu,
                    c,
                }
            }
            ElasticCase::PlaneStrain | ElasticCase::Axisymmetric => {
                let factor = e / ((1.0 + nu) * (1.0 - 2.0 * nu));
                ElasticCoefficients {
                    a: factor * (1.0 - nu),
                    b: factor * nu,
                    c,
                }
            }
        }
    }
}

/// Common material presets.
impl Material {
    /// Structural steel (E = 200 GPa, ν = 0.3, ρ = 7850 kg/m³).
    pub fn steel() -> Self {
        Self {
            youngs_modulus: 200e9,
            poissons_ratio: 0.3,
            density: 7850.0,
        }
    }

    /// Aluminum 6061-T6 (E = 68.9 GPa, ν = 0.33, ρ = 2700 kg/m³).
    pub fn aluminum() -> Self {
        Self {
            youngs_modulus: 68.9e9,
            poissons_ratio: 0.33,
            density: 2700.0,
        }
    }

    /// Titanium Ti-6Al-4V (E = 113.8 GPa, ν = 0.342, ρ = 4430 kg/m³).
    pub fn titanium() -> Self {
        Self {
            youngs_modulus: 113.8e9,
            poissons_ratio: 0.342,
            density: 4430.0,
        }
    }

    /// Look up a preset by name (case-insensitive).
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "steel" => Ok(Self::steel()),
            "aluminum" | "aluminium" => Ok(Self::aluminum()),
            "titanium" => Ok(Self::titanium()),
            other => Err(Error::InvalidMaterial(format!(
                "unknown material preset {other:?}"
            ))),
        }
    }
}

/// Planar formulation of the elasticity problem.
///
/// The axisymmetric case shares the plane strain coefficients and is
/// assembled with the same planar integrals (no radial weighting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElasticCase {
    PlaneStress,
    PlaneStrain,
    Axisymmetric,
}

impl FromStr for ElasticCase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "plane-stress" | "planar-stress" => Ok(ElasticCase::PlaneStress),
            "plane-strain" | "planar-strain" => Ok(ElasticCase::PlaneStrain),
            "axisymmetric" | "axisym" => Ok(ElasticCase::Axisymmetric),
            _ => Err(Error::Configuration(format!(
                "unknown planar case {s:?}"
            ))),
        }
    }
}

impl fmt::Display for ElasticCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElasticCase::PlaneStress => "plane-stress",
            ElasticCase::PlaneStrain => "plane-strain",
            ElasticCase::Axisymmetric => "axisymmetric",
        };
        f.write_str(name)
    }
}

/// Stiffness coefficients of the planar constitutive law.
///
/// [σ_xx, σ_yy, τ_xy] = [[A, B, 0], [B, A, 0], [0, 0, C]] · [ε_xx, ε_yy, γ_xy]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ElasticCoefficients {
    /// 3x3 constitutive matrix D.
    pub fn constitutive(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.a, self.b, 0.0,
            self.b, self.a, 0.0,
            0.0,    0.0,    self.c,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_material_creation() {
        let mat = Material::new(200e9, 0.3).unwrap();
        assert_relative_eq!(mat.youngs_modulus, 200e9);
        assert_relative_eq!(mat.poissons_ratio, 0.3);
        assert_relative_eq!(mat.density, 0.0);
    }

    #[test]
    fn test_invalid_youngs_modulus() {
        assert!(Material::new(-100e9, 0.3).is_err());
        assert!(Material::new(0.0, 0.3).is_err());
        assert!(Material::new(f64::NAN, 0.3).is_err());
    }

    #[test]
    fn test_invalid_poissons_ratio() {
        assert!(Material::new(200e9, 0.5).is_err());
        assert!(Material::new(200e9, -1.0).is_err());
        assert!(Material::new(200e9, 0.6).is_err());
    }

    #[test]
    fn test_invalid_density() {
        let mat = Material::new(200e9, 0.3).unwrap();
        assert!(mat.clone().with_density(-1.0).is_err());
        assert_relative_eq!(mat.with_density(2710.0).unwrap().density, 2710.0);
    }

    #[test]
    fn test_plane_stress_coefficients() {
        let mat = Material::new(1.0, 0.25).unwrap();
        let k = mat.coefficients(ElasticCase::PlaneStress);
        assert_relative_eq!(k.a, 1.0 / (1.0 - 0.0625), epsilon = 1e-14);
        assert_relative_eq!(k.b, 0.25 / (1.0 - 0.0625), epsilon = 1e-14);
        assert_relative_eq!(k.c, 1.0 / 2.5, epsilon = 1e-14);
    }

    #[test]
    fn test_plane_strain_coefficients() {
        let e = 68e9;
        let nu = 0.32;
        let mat = Material::new(e, nu).unwrap();
        let k = mat.coefficients(ElasticCase::PlaneStrain);
        let denom = (1.0 + nu) * (1.0 - 2.0 * nu);
        assert_relative_eq!(k.a, e * (1.0 - nu) / denom, max_relative = 1e-14);
        assert_relative_eq!(k.b, e * nu / denom, max_relative = 1e-14);
        assert_relative_eq!(k.c, e / (2.0 * (1.0 + nu)), max_relative = 1e-14);
    }

    #[test]
    fn test_axisymmetric_shares_plane_strain_law() {
        let mat = Material::steel();
        assert_eq!(
            mat.coefficients(ElasticCase::Axisymmetric),
            mat.coefficients(ElasticCase::PlaneStrain)
        );
    }

    #[test]
    fn test_plane_strain_stiffer_than_plane_stress() {
        let mat = Material::steel();
        let strain = mat.coefficients(ElasticCase::PlaneStrain);
        let stress = mat.coefficients(ElasticCase::PlaneStress);
        assert!(strain.a > stress.a);
        assert!(strain.b > stress.b);
        assert_relative_eq!(strain.c, stress.c);
    }

    #[test]
    fn test_constitutive_symmetry() {
        let d = Material::steel().coefficients(ElasticCase::PlaneStress).constitutive();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(d[(i, j)], d[(j, i)], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_case_parsing() {
        assert_eq!("plane-stress".parse::<ElasticCase>().unwrap(), ElasticCase::PlaneStress);
        assert_eq!("PLANAR_STRAIN".parse::<ElasticCase>().unwrap(), ElasticCase::PlaneStrain);
        assert_eq!("axisym".parse::<ElasticCase>().unwrap(), ElasticCase::Axisymmetric);
        assert!("shell".parse::<ElasticCase>().is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(Material::preset("Steel").unwrap(), Material::steel());
        assert_eq!(Material::preset("aluminium").unwrap(), Material::aluminum());
        assert!(Material::preset("wood").is_err());
    }
}
