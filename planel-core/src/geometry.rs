//! Finalized geometry handed over by the meshing collaborator.
//!
//! A geometry bundles the node set, the boundary edge mesh, the bulk mesh and
//! the named boundary domains. Every cross reference is validated once here,
//! so assembly can index freely afterwards.

use crate::element::ElementShape;
use crate::error::{Error, Result};
use crate::mesh::{Domain, Mesh, NodeSet};
use tracing::debug;

/// Nodes, edges, bulk elements and boundary domains of one part.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    nodes: NodeSet,
    edges: Mesh,
    elements: Mesh,
    domains: Vec<Domain>,
}

impl Geometry {
    /// Assemble and validate a geometry.
    ///
    /// # Errors
    ///
    /// - the edge mesh is not made of edges, or the bulk mesh of triangles
    ///   or quads
    /// - a mesh references a node outside the node set
    /// - a domain references an edge outside the edge mesh
    /// - two domains share a name (case-insensitive)
    pub fn new(nodes: NodeSet, edges: Mesh, elements: Mesh, domains: Vec<Domain>) -> Result<Self> {
        if edges.shape() != ElementShape::Edge {
            return Err(Error::Mesh(format!(
                "boundary mesh must be made of edges, got {}",
                edges.shape()
            )));
        }
        if elements.shape() == ElementShape::Edge {
            return Err(Error::Mesh(
                "bulk mesh must be made of triangles or quads".into(),
            ));
        }
        for mesh in [&edges, &elements] {
            if let Some(&node) = mesh.connectivity().iter().find(|&&n| n >= nodes.len()) {
                return Err(Error::Mesh(format!(
                    "{} mesh references node {node} (geometry has {} nodes)",
                    mesh.shape(),
                    nodes.len()
                )));
            }
        }
        for (i, domain) in domains.iter().enumerate() {
            if let Some(&edge) = domain.edges().iter().find(|&&e| e >= edges.n_elements()) {
                return Err(Error::Mesh(format!(
                    "domain {i} ({:?}) references edge {edge} (edge mesh has {} edges)",
                    domain.name(),
                    edges.n_elements()
                )));
            }
            if domains[..i].iter().any(|d| d.is_named(domain.name())) {
                return Err(Error::DuplicateDomain(domain.name().to_string()));
            }
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.n_elements(),
            elements = elements.n_elements(),
            shape = %elements.shape(),
            domains = domains.len(),
            "geometry validated"
        );

        Ok(Self {
            nodes,
            edges,
            elements,
            domains,
        })
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    /// Boundary edge mesh.
    pub fn edges(&self) -> &Mesh {
        &self.edges
    }

    /// Bulk (triangle or quad) mesh.
    pub fn elements(&self) -> &Mesh {
        &self.elements
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, idx: usize) -> Option<&Domain> {
        self.domains.get(idx)
    }

    /// Index of the domain with this name (case-insensitive).
    pub fn domain_index(&self, name: &str) -> Option<usize> {
        self.domains.iter().rposition(|d| d.is_named(name))
    }

    /// Rename a domain.
    ///
    /// # Errors
    ///
    /// Fails on an illegal domain index or if another domain already uses
    /// the name.
    pub fn set_domain_name(&mut self, idx: usize, name: &str) -> Result<()> {
        if idx >= self.domains.len() {
            return Err(Error::Configuration(format!(
                "illegal domain number {idx} (geometry has {} domains)",
                self.domains.len()
            )));
        }
        if let Some(existing) = self.domain_index(name) {
            if existing != idx {
                return Err(Error::DuplicateDomain(name.to_string()));
            }
        }
        self.domains[idx].set_name(name.to_string());
        Ok(())
    }

    /// Consume the geometry, returning its parts.
    pub fn into_parts(self) -> (NodeSet, Mesh, Mesh, Vec<Domain>) {
        (self.nodes, self.edges, self.elements, self.domains)
    }
}
