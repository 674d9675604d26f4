//! Reference elements and their integration rules.
//!
//! The assembly process works on a single bulk shape per mesh (triangles or
//! quads) plus two-node edges for boundary integrals.
//!
//! # Submodules
//!
//! - [`gauss`] - Gauss quadrature rules for numerical integration
//! - [`space`] - Shape functions and their reference derivatives

use std::fmt;

pub mod gauss;
pub mod space;

pub use gauss::{GaussPoint, QuadratureRule};
pub use space::ReferenceSpace;

/// Largest local node count of any supported element.
pub const MAX_LOCAL_NODES: usize = 4;

/// Supported element shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementShape {
    /// 2-node line segment (boundary edges).
    Edge,
    /// 3-node linear triangle.
    Triangle,
    /// 4-node bilinear quadrilateral.
    Quad,
}

impl ElementShape {
    /// Number of nodes for this shape.
    pub fn n_nodes(self) -> usize {
        match self {
            ElementShape::Edge => 2,
            ElementShape::Triangle => 3,
            ElementShape::Quad => 4,
        }
    }

    /// Reference dimension (1 for edges, 2 for surfaces).
    pub fn dimension(self) -> usize {
        match self {
            ElementShape::Edge => 1,
            ElementShape::Triangle | ElementShape::Quad => 2,
        }
    }

    /// Shape with the given local node count, if any.
    pub fn from_n_nodes(n_local: usize) -> Option<Self> {
        match n_local {
            2 => Some(ElementShape::Edge),
            3 => Some(ElementShape::Triangle),
            4 => Some(ElementShape::Quad),
            _ => None,
        }
    }
}

impl fmt::Display for ElementShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementShape::Edge => "edge",
            ElementShape::Triangle => "triangle",
            ElementShape::Quad => "quad",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_node_counts_round_trip() {
        for shape in [ElementShape::Edge, ElementShape::Triangle, ElementShape::Quad] {
            assert_eq!(ElementShape::from_n_nodes(shape.n_nodes()), Some(shape));
            assert!(shape.n_nodes() <= MAX_LOCAL_NODES);
        }
        assert_eq!(ElementShape::from_n_nodes(6), None);
    }

    #[test]
    fn test_shape_dimension() {
        assert_eq!(ElementShape::Edge.dimension(), 1);
        assert_eq!(ElementShape::Quad.dimension(), 2);
    }
}
