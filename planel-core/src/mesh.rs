//! Mesh data structures for 2D FEA.
//!
//! Stores nodal coordinates, element connectivity tables and named boundary
//! domains.

use crate::element::ElementShape;
use crate::error::{Error, Result};
use crate::types::{DofMap, Point2};

/// Ordered nodal coordinates; the index is the node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSet {
    coords: Vec<Point2>,
}

impl NodeSet {
    /// Create a node set from coordinates.
    pub fn new(coords: Vec<Point2>) -> Self {
        Self { coords }
    }

    /// Create a node set from separate coordinate arrays.
    pub fn from_xy(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::Mesh(format!(
                "coordinate arrays differ in length ({} x, {} y)",
                x.len(),
                y.len()
            )));
        }
        Ok(Self {
            coords: x.iter().zip(y).map(|(&x, &y)| Point2::new(x, y)).collect(),
        })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// True if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinates of one node.
    #[inline]
    pub fn get(&self, node: usize) -> Option<&Point2> {
        self.coords.get(node)
    }

    /// All coordinates.
    pub fn coords(&self) -> &[Point2] {
        &self.coords
    }

    /// Copy of the node set moved by `factor` times an interleaved
    /// displacement vector.
    pub fn displaced(&self, displacement: &[f64], factor: f64) -> Result<Self> {
        if displacement.len() != DofMap::n_dofs(self.len()) {
            return Err(Error::Configuration(format!(
                "displacement has {} entries, expected {}",
                displacement.len(),
                DofMap::n_dofs(self.len())
            )));
        }
        let coords = self
            .coords
            .iter()
            .enumerate()
            .map(|(node, p)| {
                let dofs = DofMap::node(node);
                Point2::new(
                    p.x + factor * displacement[dofs.x],
                    p.y + factor * displacement[dofs.y],
                )
            })
            .collect();
        Ok(Self { coords })
    }

    /// Compute bounding box.
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let first = *self.coords.first()?;
        Some(self.coords[1..].iter().fold((first, first), |(min, max), p| {
            (
                Point2::new(min.x.min(p.x), min.y.min(p.y)),
                Point2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        }))
    }
}

/// Element connectivity table of a single shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    shape: ElementShape,
    /// Row-major global node indices, `shape.n_nodes()` per element.
    connectivity: Vec<usize>,
}

impl Mesh {
    /// Create a mesh, validating the table against the node count.
    pub fn new(shape: ElementShape, connectivity: Vec<usize>, n_nodes: usize) -> Result<Self> {
        let n_local = shape.n_nodes();
        if connectivity.len() % n_local != 0 {
            return Err(Error::Mesh(format!(
                "{shape} connectivity has {} entries, not a multiple of {n_local}",
                connectivity.len()
            )));
        }
        if let Some(pos) = connectivity.iter().position(|&node| node >= n_nodes) {
            return Err(Error::Mesh(format!(
                "{shape} {} references node {} (mesh has {n_nodes} nodes)",
                pos / n_local,
                connectivity[pos]
            )));
        }
        Ok(Self {
            shape,
            connectivity,
        })
    }

    /// Element shape.
    pub fn shape(&self) -> ElementShape {
        self.shape
    }

    /// Local nodes per element.
    pub fn n_local(&self) -> usize {
        self.shape.n_nodes()
    }

    /// Number of elements.
    pub fn n_elements(&self) -> usize {
        self.connectivity.len() / self.n_local()
    }

    /// Global node ids of one element.
    #[inline]
    pub fn element(&self, idx: usize) -> &[usize] {
        let n = self.n_local();
        &self.connectivity[idx * n..(idx + 1) * n]
    }

    /// Iterate over element connectivities.
    pub fn elements(&self) -> impl Iterator<Item = &[usize]> {
        self.connectivity.chunks_exact(self.n_local())
    }

    /// Flat connectivity table.
    pub fn connectivity(&self) -> &[usize] {
        &self.connectivity
    }

    /// Coordinates of an element's nodes.
    pub fn element_coords(&self, nodes: &NodeSet, idx: usize) -> Vec<Point2> {
        self.element(idx)
            .iter()
            .map(|&n| nodes.coords()[n])
            .collect()
    }
}

/// Named subset of the edge mesh (a boundary part).
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    name: String,
    /// Indices into the edge mesh.
    edges: Vec<usize>,
}

impl Domain {
    pub fn new(name: impl Into<String>, edges: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            edges,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Edge indices of this domain.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// True if `name` designates this domain (case-insensitive).
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_nodes() -> NodeSet {
        NodeSet::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn test_mesh_creation() {
        let nodes = square_nodes();
        let mesh = Mesh::new(ElementShape::Triangle, vec![0, 1, 2, 0, 2, 3], nodes.len()).unwrap();
        assert_eq!(mesh.n_elements(), 2);
        assert_eq!(mesh.element(1), &[0, 2, 3]);
        assert_eq!(mesh.elements().count(), 2);
        assert_eq!(mesh.element_coords(&nodes, 1)[2], Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_invalid_element_node_count() {
        let result = Mesh::new(ElementShape::Quad, vec![0, 1, 2], 4);
        assert!(matches!(result, Err(Error::Mesh(_))));
    }

    #[test]
    fn test_invalid_node_index() {
        let result = Mesh::new(ElementShape::Edge, vec![0, 1, 1, 4], 4);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("references node 4"), "{err}");
    }

    #[test]
    fn test_from_xy_length_mismatch() {
        assert!(NodeSet::from_xy(&[0.0, 1.0], &[0.0]).is_err());
        let nodes = NodeSet::from_xy(&[0.0, 2.0], &[1.0, 3.0]).unwrap();
        assert_eq!(nodes.get(1), Some(&Point2::new(2.0, 3.0)));
    }

    #[test]
    fn test_displaced() {
        let nodes = square_nodes();
        let u = [0.1, 0.0, 0.0, -0.2, 0.0, 0.0, 0.0, 0.0];
        let moved = nodes.displaced(&u, 10.0).unwrap();
        assert_relative_eq!(moved.coords()[0].x, 1.0);
        assert_relative_eq!(moved.coords()[1].y, -2.0);
        assert_eq!(nodes.coords()[0], Point2::new(0.0, 0.0));
        assert!(nodes.displaced(&u[..4], 1.0).is_err());
    }

    #[test]
    fn test_bounds() {
        let nodes = NodeSet::new(vec![
            Point2::new(-1.0, 2.0),
            Point2::new(1.0, -2.0),
            Point2::new(0.0, 0.0),
        ]);
        let (min, max) = nodes.bounds().unwrap();
        assert_eq!(min, Point2::new(-1.0, -2.0));
        assert_eq!(max, Point2::new(1.0, 2.0));
        assert!(NodeSet::default().bounds().is_none());
    }

    #[test]
    fn test_domain_name_is_case_insensitive() {
        let domain = Domain::new("Top Contact Surface", vec![0, 1]);
        assert!(domain.is_named("top contact surface"));
        assert!(!domain.is_named("Top"));
    }
}
