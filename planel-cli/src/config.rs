//! Run file for the `planel` driver.
//!
//! A run file is a JSON document. Every field has a default, so an empty
//! object `{}` reproduces the stock carabiner run: the mesh in
//! `data/mesh.txt`, aluminium (E = 68 GPa, ν = 0.32, ρ = 2710 kg/m³) under
//! plane stress with g = -9.81, the bottom contact surface held vertically
//! and a 5e6 N/m load on the top contact surface.
//!
//! The stock run's aluminium differs from the `aluminium` preset, so the
//! default material is given as explicit constants.

use anyhow::{Context, Result};
use planel_core::{BoundaryKind, ElasticCase, Material};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Material constants, either a named preset or explicit values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MaterialConfig {
    Preset(String),
    Explicit {
        youngs_modulus: f64,
        poissons_ratio: f64,
        density: f64,
    },
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self::Explicit {
            youngs_modulus: 68e9,
            poissons_ratio: 0.32,
            density: 2.71e3,
        }
    }
}

impl MaterialConfig {
    pub fn build(&self) -> Result<Material> {
        let material = match self {
            Self::Preset(name) => Material::preset(name)?,
            Self::Explicit {
                youngs_modulus,
                poissons_ratio,
                density,
            } => Material::new(*youngs_modulus, *poissons_ratio)?.with_density(*density)?,
        };
        Ok(material)
    }
}

/// Give domain `index` of the mesh a new name before conditions are applied.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DomainRename {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionConfig {
    pub domain: String,
    /// `dirichlet-x`, `dirichlet-y`, `neumann-x` or `neumann-y`.
    pub kind: String,
    #[serde(default)]
    pub value: f64,
}

impl ConditionConfig {
    pub fn kind(&self) -> Result<BoundaryKind> {
        self.kind
            .parse()
            .with_context(|| format!("boundary condition on {:?}", self.domain))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub solution: PathBuf,
    pub problem: Option<PathBuf>,
    /// Mesh with node positions moved by the scaled displacement.
    pub deformed_mesh: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            solution: PathBuf::from("data/nodal_displacements.txt"),
            problem: Some(PathBuf::from("data/problem.txt")),
            deformed_mesh: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub mesh: PathBuf,
    pub material: MaterialConfig,
    /// Gravitational acceleration; positive values load the body towards -y.
    pub gravity: f64,
    pub case: String,
    pub renames: Vec<DomainRename>,
    pub conditions: Vec<ConditionConfig>,
    pub output: OutputConfig,
    pub deformation_factor: f64,
    /// Out-of-plane thickness used for the reported weight [m].
    pub depth: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mesh: PathBuf::from("data/mesh.txt"),
            material: MaterialConfig::default(),
            gravity: -9.81,
            case: ElasticCase::PlaneStress.to_string(),
            renames: vec![
                DomainRename {
                    index: 12,
                    name: "Bottom Contact Surface".to_string(),
                },
                DomainRename {
                    index: 13,
                    name: "Top Contact Surface".to_string(),
                },
            ],
            conditions: vec![
                ConditionConfig {
                    domain: "Bottom Contact Surface".to_string(),
                    kind: BoundaryKind::DirichletY.to_string(),
                    value: 0.0,
                },
                ConditionConfig {
                    domain: "Top Contact Surface".to_string(),
                    kind: BoundaryKind::NeumannY.to_string(),
                    value: 5e6,
                },
            ],
            output: OutputConfig::default(),
            deformation_factor: 1.0,
            depth: 0.01,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read run file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse run file {}", path.display()))
    }

    pub fn case(&self) -> Result<ElasticCase> {
        Ok(self.case.parse()?)
    }
}
