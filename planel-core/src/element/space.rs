//! Reference element spaces (shape functions on the reference element).
//!
//! # Node Numbering
//!
//! Edge (ξ ∈ [-1, 1]):
//! ```text
//! 0 ------- 1
//! ξ=-1     ξ=+1
//! ```
//!
//! Triangle, nodes at (0,0), (1,0), (0,1):
//! ```text
//! 2
//! | \
//! 0 - 1
//! ```
//!
//! Quad, nodes at (1,1), (-1,1), (-1,-1), (1,-1):
//! ```text
//! 1 --- 0
//! |     |
//! 2 --- 3
//! ```
//!
//! Evaluators always return `MAX_LOCAL_NODES` entries; only the first
//! [`ReferenceSpace::n`] are meaningful, the rest are zero.

use crate::element::{ElementShape, MAX_LOCAL_NODES};
use crate::error::{Error, Result};
use std::fmt;

/// Shape function values, one per local node.
pub type ShapeValues = [f64; MAX_LOCAL_NODES];

/// Shape function derivatives (∂φ/∂ξ, ∂φ/∂η), one pair per local node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeGradients {
    pub dxi: ShapeValues,
    pub deta: ShapeValues,
}

/// P1/Q1 reference spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSpace {
    /// Linear 2-node edge.
    EdgeP1,
    /// Linear 3-node triangle.
    TriangleP1,
    /// Bilinear 4-node quad.
    QuadQ1,
}

const EDGE_NODES: [(f64, f64); 2] = [(-1.0, 0.0), (1.0, 0.0)];
const TRIANGLE_NODES: [(f64, f64); 3] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
const QUAD_NODES: [(f64, f64); 4] = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];

impl ReferenceSpace {
    /// Space for a (shape, local node count) pair.
    ///
    /// # Errors
    ///
    /// Only edge/2, triangle/3 and quad/4 exist.
    pub fn new(shape: ElementShape, n_local: usize) -> Result<Self> {
        match (shape, n_local) {
            (ElementShape::Edge, 2) => Ok(ReferenceSpace::EdgeP1),
            (ElementShape::Triangle, 3) => Ok(ReferenceSpace::TriangleP1),
            (ElementShape::Quad, 4) => Ok(ReferenceSpace::QuadQ1),
            _ => Err(Error::Configuration(format!(
                "cannot create a discrete space with {n_local} nodes for a {shape}"
            ))),
        }
    }

    /// Element shape of this space.
    pub fn shape(&self) -> ElementShape {
        match self {
            ReferenceSpace::EdgeP1 => ElementShape::Edge,
            ReferenceSpace::TriangleP1 => ElementShape::Triangle,
            ReferenceSpace::QuadQ1 => ElementShape::Quad,
        }
    }

    /// Number of shape functions.
    pub fn n(&self) -> usize {
        self.shape().n_nodes()
    }

    /// Reference coordinates of the local nodes (η = 0 on edges).
    pub fn reference_nodes(&self) -> &'static [(f64, f64)] {
        match self {
            ReferenceSpace::EdgeP1 => &EDGE_NODES,
            ReferenceSpace::TriangleP1 => &TRIANGLE_NODES,
            ReferenceSpace::QuadQ1 => &QUAD_NODES,
        }
    }

    /// Shape functions at (ξ, η). Edges ignore η.
    pub fn phi(&self, xi: f64, eta: f64) -> ShapeValues {
        match self {
            ReferenceSpace::EdgeP1 => {
                let [p0, p1] = Self::phi_edge(xi);
                [p0, p1, 0.0, 0.0]
            }
            ReferenceSpace::TriangleP1 => [1.0 - xi - eta, xi, eta, 0.0],
            ReferenceSpace::QuadQ1 => [
                (1.0 + xi) * (1.0 + eta) / 4.0,
                (1.0 - xi) * (1.0 + eta) / 4.0,
                (1.0 - xi) * (1.0 - eta) / 4.0,
                (1.0 + xi) * (1.0 - eta) / 4.0,
            ],
        }
    }

    /// Shape function derivatives at (ξ, η). Edges ignore η and have ∂φ/∂η = 0.
    pub fn dphi(&self, xi: f64, eta: f64) -> ShapeGradients {
        match self {
            ReferenceSpace::EdgeP1 => {
                let [d0, d1] = Self::dphi_edge(xi);
                ShapeGradients {
                    dxi: [d0, d1, 0.0, 0.0],
                    deta: [0.0; MAX_LOCAL_NODES],
                }
            }
            ReferenceSpace::TriangleP1 => ShapeGradients {
                dxi: [-1.0, 1.0, 0.0, 0.0],
                deta: [-1.0, 0.0, 1.0, 0.0],
            },
            ReferenceSpace::QuadQ1 => ShapeGradients {
                dxi: [
                    (1.0 + eta) / 4.0,
                    -(1.0 + eta) / 4.0,
                    -(1.0 - eta) / 4.0,
                    (1.0 - eta) / 4.0,
                ],
                deta: [
                    (1.0 + xi) / 4.0,
                    (1.0 - xi) / 4.0,
                    -(1.0 - xi) / 4.0,
                    -(1.0 + xi) / 4.0,
                ],
            },
        }
    }

    /// Edge shape functions at ξ.
    #[inline]
    pub fn phi_edge(xi: f64) -> [f64; 2] {
        [(1.0 - xi) / 2.0, (1.0 + xi) / 2.0]
    }

    /// Edge shape function derivatives (constant).
    #[inline]
    pub fn dphi_edge(_xi: f64) -> [f64; 2] {
        [-0.5, 0.5]
    }
}

/// Diagnostic table of φ and ∇φ evaluated at every reference node.
impl fmt::Display for ReferenceSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.n();
        for &(xi, eta) in self.reference_nodes() {
            let phi = self.phi(xi, eta);
            let grad = self.dphi(xi, eta);
            for j in 0..n {
                match self {
                    ReferenceSpace::EdgeP1 => {
                        writeln!(
                            f,
                            "(xsi={xi:+.1}) :  phi({j})={:+.1}   dphidxsi({j})={:+.1} ",
                            phi[j], grad.dxi[j]
                        )?;
                    }
                    ReferenceSpace::TriangleP1 | ReferenceSpace::QuadQ1 => {
                        write!(f, "(xsi={xi:+.1},eta={eta:+.1}) :  phi({j})={:+.1}", phi[j])?;
                        writeln!(
                            f,
                            "   dphidxsi({j})={:+.1}   dphideta({j})={:+.1} ",
                            grad.dxi[j], grad.deta[j]
                        )?;
                    }
                }
            }
            writeln!(f, " ")?;
        }
        Ok(())
    }
}
