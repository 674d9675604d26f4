//! Boundary conditions on named domains.
//!
//! Dirichlet conditions fix one displacement component on every node of a
//! domain; Neumann conditions apply a force density along its edges. Fixed
//! dofs are tracked in a [`ConstraintMap`] recording which condition owns
//! each of them.

use crate::error::{Error, Result};
use crate::types::Component;
use std::fmt;
use std::str::FromStr;

/// Kind of boundary condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// Prescribed horizontal displacement.
    DirichletX,
    /// Prescribed vertical displacement.
    DirichletY,
    /// Horizontal force per unit length.
    NeumannX,
    /// Vertical force per unit length.
    NeumannY,
}

impl BoundaryKind {
    pub const ALL: [BoundaryKind; 4] = [
        BoundaryKind::DirichletX,
        BoundaryKind::DirichletY,
        BoundaryKind::NeumannX,
        BoundaryKind::NeumannY,
    ];

    /// Displacement component the condition acts on.
    pub fn component(self) -> Component {
        match self {
            BoundaryKind::DirichletX | BoundaryKind::NeumannX => Component::X,
            BoundaryKind::DirichletY | BoundaryKind::NeumannY => Component::Y,
        }
    }

    pub fn is_dirichlet(self) -> bool {
        matches!(self, BoundaryKind::DirichletX | BoundaryKind::DirichletY)
    }

    /// Label used in problem files, e.g. `Dirichlet-X`.
    pub fn label(self) -> &'static str {
        match self {
            BoundaryKind::DirichletX => "Dirichlet-X",
            BoundaryKind::DirichletY => "Dirichlet-Y",
            BoundaryKind::NeumannX => "Neumann-X",
            BoundaryKind::NeumannY => "Neumann-Y",
        }
    }

    /// What the value of the condition imposes.
    pub fn description(self) -> &'static str {
        match self {
            BoundaryKind::DirichletX => "horizontal displacement",
            BoundaryKind::DirichletY => "vertical displacement",
            BoundaryKind::NeumannX => "horizontal force density",
            BoundaryKind::NeumannY => "vertical force density",
        }
    }
}

impl FromStr for BoundaryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        BoundaryKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| Error::Configuration(format!("unknown boundary condition type: {s:?}")))
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A condition applied to one domain of the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCondition {
    /// Index into the geometry's domain list.
    pub domain: usize,
    pub kind: BoundaryKind,
    pub value: f64,
}

/// For every dof, the index of the Dirichlet condition that fixes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMap {
    owners: Vec<Option<usize>>,
}

impl ConstraintMap {
    /// Map with every dof free.
    pub fn new(n_dofs: usize) -> Self {
        Self {
            owners: vec![None; n_dofs],
        }
    }

    pub fn n_dofs(&self) -> usize {
        self.owners.len()
    }

    /// Index of the condition fixing `dof`, if any.
    pub fn owner(&self, dof: usize) -> Option<usize> {
        self.owners.get(dof).copied().flatten()
    }

    pub fn is_constrained(&self, dof: usize) -> bool {
        self.owner(dof).is_some()
    }

    /// Number of fixed dofs.
    pub fn n_constrained(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }

    /// Fixed dofs in ascending order, with their owning condition.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter_map(|(dof, owner)| owner.map(|c| (dof, c)))
    }

    /// Assign `dofs` to condition `owner`, whose value is `conditions[owner]`.
    ///
    /// A dof already fixed to the same value keeps its earlier owner. A dof
    /// fixed to a different value is a conflict, and nothing is marked.
    pub(crate) fn mark(
        &mut self,
        dofs: &[usize],
        owner: usize,
        conditions: &[BoundaryCondition],
    ) -> Result<()> {
        let requested = conditions[owner].value;
        for &dof in dofs {
            if dof >= self.owners.len() {
                return Err(Error::Configuration(format!(
                    "dof {dof} outside a system of {} dofs",
                    self.owners.len()
                )));
            }
            if let Some(existing) = self.owners[dof].map(|c| conditions[c].value) {
                if existing != requested {
                    return Err(Error::ConflictingConstraint {
                        dof,
                        existing,
                        requested,
                    });
                }
            }
        }
        for &dof in dofs {
            if self.owners[dof].is_none() {
                self.owners[dof] = Some(owner);
            }
        }
        Ok(())
    }
}
