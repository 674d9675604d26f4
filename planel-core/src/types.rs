//! Core data types for 2D FEA operations.
//!
//! This module defines fundamental types used throughout planel:
//! - Planar points
//! - Degree of freedom mapping (node id → x/y dof)
//! - In-plane stress and strain vectors

use nalgebra::{Vector2, Vector3};

/// A point in the plane.
pub type Point2 = Vector2<f64>;

/// Displacement component carried by a dof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Horizontal displacement.
    X,
    /// Vertical displacement.
    Y,
}

impl Component {
    /// Offset of this component inside a node's dof pair.
    #[inline]
    pub fn offset(self) -> usize {
        match self {
            Component::X => 0,
            Component::Y => 1,
        }
    }
}

/// The two global dofs attached to one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDofs {
    pub x: usize,
    pub y: usize,
}

impl NodeDofs {
    /// Global dof for the requested component.
    #[inline]
    pub fn get(&self, component: Component) -> usize {
        match component {
            Component::X => self.x,
            Component::Y => self.y,
        }
    }
}

/// Interleaved dof numbering: `[x0, y0, x1, y1, ...]`.
///
/// All node/dof arithmetic goes through here so the layout lives in one place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DofMap;

impl DofMap {
    /// Displacement components per node.
    pub const DOFS_PER_NODE: usize = 2;

    /// Total number of dofs for a node count.
    #[inline]
    pub fn n_dofs(n_nodes: usize) -> usize {
        n_nodes * Self::DOFS_PER_NODE
    }

    /// Both dofs of a node.
    #[inline]
    pub fn node(node: usize) -> NodeDofs {
        NodeDofs {
            x: Self::DOFS_PER_NODE * node,
            y: Self::DOFS_PER_NODE * node + 1,
        }
    }

    /// One dof of a node.
    #[inline]
    pub fn dof(node: usize, component: Component) -> usize {
        Self::DOFS_PER_NODE * node + component.offset()
    }

    /// Inverse mapping: which node and component a dof belongs to.
    #[inline]
    pub fn split(dof: usize) -> (usize, Component) {
        let component = if dof % Self::DOFS_PER_NODE == 0 {
            Component::X
        } else {
            Component::Y
        };
        (dof / Self::DOFS_PER_NODE, component)
    }
}

/// In-plane stress in Voigt notation.
///
/// Components are ordered as: [σ_xx, σ_yy, τ_xy]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressTensor(pub Vector3<f64>);

impl StressTensor {
    /// Create a new stress vector from Voigt components.
    pub fn new(components: [f64; 3]) -> Self {
        Self(Vector3::from_row_slice(&components))
    }

    /// Zero stress state.
    pub fn zero() -> Self {
        Self(Vector3::zeros())
    }

    /// Von Mises equivalent stress assuming σ_zz = 0.
    pub fn von_mises(&self) -> f64 {
        let s_xx = self.0[0];
        let s_yy = self.0[1];
        let t_xy = self.0[2];
        (s_xx * s_xx - s_xx * s_yy + s_yy * s_yy + 3.0 * t_xy * t_xy).sqrt()
    }
}

/// In-plane strain in Voigt notation.
///
/// Components are ordered as: [ε_xx, ε_yy, γ_xy]
/// where γ = 2ε for engineering shear strain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainTensor(pub Vector3<f64>);

impl StrainTensor {
    /// Create a new strain vector from Voigt components.
    pub fn new(components: [f64; 3]) -> Self {
        Self(Vector3::from_row_slice(&components))
    }

    /// Zero strain state.
    pub fn zero() -> Self {
        Self(Vector3::zeros())
    }

    /// In-plane volumetric strain ε_xx + ε_yy.
    pub fn volumetric(&self) -> f64 {
        self.0[0] + self.0[1]
    }
}
