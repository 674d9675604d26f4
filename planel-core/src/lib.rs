//! planel core - 2D linear elasticity by finite elements
//!
//! Solves plane stress, plane strain and axisymmetric elasticity problems on
//! triangle or quad meshes under gravity and edge loads:
//! - P1/Q1 reference elements with fixed Gauss rules
//! - Dense global system with Dirichlet elimination and Gauss solve
//! - Residual (reaction) forces and field integration after the solve
//! - Text formats for meshes, problem summaries and solutions
//!
//! # Architecture
//!
//! - [`Geometry`]: nodes, boundary edges, bulk elements and named domains
//! - [`Material`] and [`ElasticCase`]: the planar constitutive law
//! - [`ElasticityProblem`]: owns the geometry and the [`DenseSystem`],
//!   drives assembly, constraints, solve and residual
//! - [`io`] and [`post`]: file formats and derived quantities

pub mod assembly;
pub mod boundary;
pub mod cfmt;
pub mod element;
pub mod error;
pub mod geometry;
pub mod io;
pub mod material;
pub mod mesh;
pub mod post;
pub mod problem;
pub mod system;
pub mod types;

pub use boundary::{BoundaryCondition, BoundaryKind};
pub use element::{ElementShape, QuadratureRule, ReferenceSpace};
pub use error::{Error, ErrorKind, Result};
pub use geometry::Geometry;
pub use material::{ElasticCase, Material};
pub use mesh::{Domain, Mesh, NodeSet};
pub use problem::ElasticityProblem;
pub use system::DenseSystem;
pub use types::{Component, DofMap, Point2, StrainTensor, StressTensor};
