//! Linear elasticity problem: assembly, constraints, solve and residual.
//!
//! An [`ElasticityProblem`] owns its geometry, material law, boundary
//! conditions and the dense system they produce. Each call to
//! [`solve`](ElasticityProblem::solve) or
//! [`compute_residual`](ElasticityProblem::compute_residual) rebuilds the
//! system from scratch; the solution and residual buffers are overwritten in
//! place.
//!
//! # Example
//!
//! ```
//! use planel_core::boundary::BoundaryKind;
//! use planel_core::element::ElementShape;
//! use planel_core::geometry::Geometry;
//! use planel_core::material::{ElasticCase, Material};
//! use planel_core::mesh::{Domain, Mesh, NodeSet};
//! use planel_core::problem::ElasticityProblem;
//!
//! let nodes = NodeSet::from_xy(&[0.0, 1.0, 1.0, 0.0], &[0.0, 0.0, 1.0, 1.0]).unwrap();
//! let edges = Mesh::new(ElementShape::Edge, vec![0, 1, 1, 2, 2, 3, 3, 0], 4).unwrap();
//! let quads = Mesh::new(ElementShape::Quad, vec![0, 1, 2, 3], 4).unwrap();
//! let domains = vec![Domain::new("Bottom", vec![0]), Domain::new("Top", vec![2])];
//! let geometry = Geometry::new(nodes, edges, quads, domains).unwrap();
//!
//! let mut problem =
//!     ElasticityProblem::new(geometry, Material::aluminum(), 0.0, ElasticCase::PlaneStress)
//!         .unwrap();
//! problem.add_boundary_condition("Bottom", BoundaryKind::DirichletX, 0.0).unwrap();
//! problem.add_boundary_condition("Bottom", BoundaryKind::DirichletY, 0.0).unwrap();
//! problem.add_boundary_condition("Top", BoundaryKind::NeumannY, -1e6).unwrap();
//!
//! let u = problem.solve().unwrap();
//! assert!(u[5] < 0.0);
//! ```

use crate::assembly;
use crate::boundary::{BoundaryCondition, BoundaryKind, ConstraintMap};
use crate::cfmt;
use crate::element::{ElementShape, QuadratureRule, ReferenceSpace};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::material::{ElasticCase, ElasticCoefficients, Material};
use crate::system::DenseSystem;
use crate::types::DofMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Where a problem stands in its assemble/solve cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Material, geometry and spaces are set; conditions may be added.
    Configured,
    /// Bulk and Neumann contributions are in the system.
    Assembled,
    /// Dirichlet rows and columns have been folded in.
    Constrained,
    /// Elimination succeeded and the solution is current.
    Eliminated,
    /// The residual of the last solution is current.
    ResidualComputed,
}

/// 2D linear elasticity problem on a triangle or quad mesh.
#[derive(Debug, Clone)]
pub struct ElasticityProblem {
    material: Material,
    case: ElasticCase,
    coefficients: ElasticCoefficients,
    gravity: f64,
    geometry: Geometry,
    space: ReferenceSpace,
    rule: QuadratureRule,
    edge_space: ReferenceSpace,
    edge_rule: QuadratureRule,
    system: DenseSystem,
    conditions: Vec<BoundaryCondition>,
    constraints: ConstraintMap,
    solution: Vec<f64>,
    residual: Vec<f64>,
    stage: Stage,
}

impl ElasticityProblem {
    /// Set up a problem. Gravity acts along y; a positive `gravity` pulls
    /// towards −y.
    ///
    /// # Errors
    ///
    /// Fails if the bulk mesh has no matching reference space or quadrature
    /// rule, or if `gravity` is not finite.
    pub fn new(
        geometry: Geometry,
        material: Material,
        gravity: f64,
        case: ElasticCase,
    ) -> Result<Self> {
        if !gravity.is_finite() {
            return Err(Error::Configuration(format!(
                "gravity must be finite, got {gravity}"
            )));
        }
        let shape = geometry.elements().shape();
        let space = ReferenceSpace::new(shape, geometry.elements().n_local())?;
        let rule = QuadratureRule::new(shape, shape.n_nodes())?;
        let edge_space = ReferenceSpace::new(ElementShape::Edge, 2)?;
        let edge_rule = QuadratureRule::new(ElementShape::Edge, 2)?;

        let n_dofs = DofMap::n_dofs(geometry.nodes().len());
        let coefficients = material.coefficients(case);

        info!(
            nodes = geometry.nodes().len(),
            elements = geometry.elements().n_elements(),
            %shape,
            %case,
            dofs = n_dofs,
            "elasticity problem created"
        );

        Ok(Self {
            material,
            case,
            coefficients,
            gravity,
            geometry,
            space,
            rule,
            edge_space,
            edge_rule,
            system: DenseSystem::new(n_dofs),
            conditions: Vec::new(),
            constraints: ConstraintMap::new(n_dofs),
            solution: vec![0.0; n_dofs],
            residual: vec![0.0; n_dofs],
            stage: Stage::Configured,
        })
    }

    /// Apply a condition to the domain called `domain_name`.
    ///
    /// Dirichlet conditions fix the matching component on both end nodes of
    /// every edge in the domain. A node already fixed to the same value by an
    /// earlier condition stays with that condition.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownDomain`] if no domain has that name
    /// - [`Error::ConflictingConstraint`] if a node is already fixed to a
    ///   different value; the problem is left unchanged
    pub fn add_boundary_condition(
        &mut self,
        domain_name: &str,
        kind: BoundaryKind,
        value: f64,
    ) -> Result<()> {
        let domain = self
            .geometry
            .domain_index(domain_name)
            .ok_or_else(|| Error::UnknownDomain(domain_name.to_string()))?;
        if !value.is_finite() {
            return Err(Error::Configuration(format!(
                "{kind} value on {domain_name:?} must be finite, got {value}"
            )));
        }
        let edges = self.geometry.domains()[domain].edges();
        if edges.is_empty() {
            warn!(domain = domain_name, %kind, "boundary condition on an empty domain");
        }

        self.conditions.push(BoundaryCondition {
            domain,
            kind,
            value,
        });
        let owner = self.conditions.len() - 1;

        if kind.is_dirichlet() {
            let component = kind.component();
            let dofs: Vec<usize> = edges
                .iter()
                .flat_map(|&edge| self.geometry.edges().element(edge))
                .map(|&node| DofMap::dof(node, component))
                .collect();
            if let Err(err) = self.constraints.mark(&dofs, owner, &self.conditions) {
                self.conditions.pop();
                return Err(err);
            }
        }

        debug!(domain = domain_name, %kind, value, "boundary condition added");
        Ok(())
    }

    /// Zero the system and add bulk and Neumann contributions.
    fn assemble(&mut self) -> Result<()> {
        self.system.zero();
        assembly::assemble_elements(
            &mut self.system,
            &self.geometry,
            self.space,
            &self.rule,
            &self.coefficients,
            self.material.density,
            self.gravity,
        )?;
        assembly::assemble_neumann(
            &mut self.system,
            &self.geometry,
            self.edge_space,
            &self.edge_rule,
            &self.conditions,
        )?;
        self.stage = Stage::Assembled;
        Ok(())
    }

    /// Assemble, constrain and eliminate.
    ///
    /// Returns the displacements as `[u0, v0, u1, v1, ...]`.
    ///
    /// # Errors
    ///
    /// [`Error::Mesh`] for a degenerate element and
    /// [`Error::SingularMatrix`] when the problem is not sufficiently
    /// constrained. The previous solution is kept on failure.
    pub fn solve(&mut self) -> Result<&[f64]> {
        self.assemble()?;

        for (dof, owner) in self.constraints.iter() {
            self.system.constrain(dof, self.conditions[owner].value)?;
        }
        self.stage = Stage::Constrained;
        debug!(constrained = self.constraints.n_constrained(), "dirichlet conditions applied");

        self.system.eliminate()?;
        self.solution.copy_from_slice(self.system.rhs());
        self.stage = Stage::Eliminated;

        info!(dofs = self.system.size(), "system solved");
        Ok(&self.solution)
    }

    /// Forces A·u − B of the unconstrained system for the current solution.
    ///
    /// Zero (to round-off) at free dofs; the reaction forces at fixed dofs.
    pub fn compute_residual(&mut self) -> Result<&[f64]> {
        self.assemble()?;
        let internal = self.system.multiply(&self.solution)?;
        for ((r, ku), b) in self.residual.iter_mut().zip(internal).zip(self.system.rhs()) {
            *r = ku - b;
        }
        self.stage = Stage::ResidualComputed;
        Ok(&self.residual)
    }

    /// Integrate `f(x, y)` over the bulk mesh; `f ≡ 1` gives the area.
    pub fn integrate<F>(&self, f: F) -> Result<f64>
    where
        F: FnMut(f64, f64) -> f64,
    {
        assembly::integrate(&self.geometry, self.space, &self.rule, f)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn case(&self) -> ElasticCase {
        self.case
    }

    /// (A, B, C) coefficients of the planar law.
    pub fn coefficients(&self) -> &ElasticCoefficients {
        &self.coefficients
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Bulk reference space.
    pub fn space(&self) -> ReferenceSpace {
        self.space
    }

    pub fn conditions(&self) -> &[BoundaryCondition] {
        &self.conditions
    }

    pub fn constraints(&self) -> &ConstraintMap {
        &self.constraints
    }

    /// Displacements of the last successful solve (zero before that).
    pub fn solution(&self) -> &[f64] {
        &self.solution
    }

    pub fn residual(&self) -> &[f64] {
        &self.residual
    }

    /// The global system in its most recent state.
    pub fn system(&self) -> &DenseSystem {
        &self.system
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}

const RULE: &str =
    " ======================================================================================= ";

impl fmt::Display for ElasticityProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n\n{RULE}\n")?;
        writeln!(f, " Linear elasticity problem ")?;
        let e14 = |value: f64| cfmt::exp_width(value, 14, 7);
        writeln!(f, "   Young modulus   E   = {} [N/m2]", e14(self.material.youngs_modulus))?;
        writeln!(f, "   Poisson's ratio nu  = {} [-]", e14(self.material.poissons_ratio))?;
        writeln!(f, "   Density         rho = {} [kg/m3]", e14(self.material.density))?;
        writeln!(f, "   Gravity         g   = {} [m/s2]", e14(self.gravity))?;
        let formulation = match self.case {
            ElasticCase::PlaneStrain => "Planar strains",
            ElasticCase::PlaneStress => "Planar stresses",
            ElasticCase::Axisymmetric => "Axisymmetric",
        };
        writeln!(f, "   {formulation} formulation ")?;
        writeln!(f, "   Boundary conditions : ")?;
        for condition in &self.conditions {
            let name = self
                .geometry
                .domain(condition.domain)
                .map_or("?", |d| d.name());
            writeln!(
                f,
                "  {name:>20} : imposing {} as the {} ",
                cfmt::exp_width(condition.value, 9, 2),
                condition.kind.description()
            )?;
        }
        writeln!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::unit_square_triangles;
    use crate::mesh::{Domain, Mesh, NodeSet};
    use crate::types::{Component, Point2};
    use approx::assert_relative_eq;

    fn unit_quad() -> Geometry {
        let nodes = NodeSet::from_xy(&[0.0, 1.0, 1.0, 0.0], &[0.0, 0.0, 1.0, 1.0]).unwrap();
        let edges = Mesh::new(ElementShape::Edge, vec![0, 1, 1, 2, 2, 3, 3, 0], 4).unwrap();
        let quads = Mesh::new(ElementShape::Quad, vec![0, 1, 2, 3], 4).unwrap();
        let domains = vec![
            Domain::new("Bottom", vec![0]),
            Domain::new("Right", vec![1]),
            Domain::new("Top", vec![2]),
            Domain::new("Left", vec![3]),
        ];
        Geometry::new(nodes, edges, quads, domains).unwrap()
    }

    /// 2×2 quads on the unit square with a displaced interior node (4).
    ///
    /// ```text
    /// 6 - 7 - 8
    /// |   |   |
    /// 3 - 4 - 5
    /// |   |   |
    /// 0 - 1 - 2
    /// ```
    fn distorted_patch() -> Geometry {
        let mut coords = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                coords.push(Point2::new(0.5 * i as f64, 0.5 * j as f64));
            }
        }
        coords[4] = Point2::new(0.42, 0.61);
        let nodes = NodeSet::new(coords);
        let edges = Mesh::new(
            ElementShape::Edge,
            vec![0, 1, 1, 2, 2, 5, 5, 8, 8, 7, 7, 6, 6, 3, 3, 0],
            9,
        )
        .unwrap();
        let quads = Mesh::new(
            ElementShape::Quad,
            vec![0, 1, 4, 3, 1, 2, 5, 4, 3, 4, 7, 6, 4, 5, 8, 7],
            9,
        )
        .unwrap();
        let domains = vec![
            Domain::new("Bottom", vec![0, 1]),
            Domain::new("Right", vec![2, 3]),
            Domain::new("Top", vec![4, 5]),
            Domain::new("Left", vec![6, 7]),
        ];
        Geometry::new(nodes, edges, quads, domains).unwrap()
    }

    /// Uniaxial tension p along x: u = p·x/E, v = -ν·p·y/E in plane stress.
    fn check_uniaxial_patch(geometry: Geometry) {
        let material = Material::new(1000.0, 0.25).unwrap();
        let p = 10.0;
        let mut problem =
            ElasticityProblem::new(geometry, material, 0.0, ElasticCase::PlaneStress).unwrap();
        problem.add_boundary_condition("Left", BoundaryKind::DirichletX, 0.0).unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletY, 0.0).unwrap();
        problem.add_boundary_condition("Right", BoundaryKind::NeumannX, p).unwrap();
        let u = problem.solve().unwrap().to_vec();

        for (node, xy) in problem.geometry().nodes().coords().iter().enumerate() {
            let dofs = DofMap::node(node);
            assert_relative_eq!(u[dofs.x], p * xy.x / 1000.0, epsilon = 1e-12);
            assert_relative_eq!(u[dofs.y], -0.25 * p * xy.y / 1000.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_patch_single_quad() {
        check_uniaxial_patch(unit_quad());
    }

    #[test]
    fn test_patch_distorted_quads() {
        check_uniaxial_patch(distorted_patch());
    }

    #[test]
    fn test_patch_triangles() {
        check_uniaxial_patch(unit_square_triangles());
    }

    #[test]
    fn test_area() {
        let problem = ElasticityProblem::new(
            distorted_patch(),
            Material::steel(),
            -9.81,
            ElasticCase::PlaneStrain,
        )
        .unwrap();
        assert_relative_eq!(problem.integrate(|_, _| 1.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_residual_balances_applied_loads() {
        let material = Material::steel();
        let (gravity, traction) = (-9.81, -1000.0);
        let mut problem = ElasticityProblem::new(
            unit_square_triangles(),
            material.clone(),
            gravity,
            ElasticCase::PlaneStrain,
        )
        .unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletX, 0.0).unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletY, 0.0).unwrap();
        problem.add_boundary_condition("Top", BoundaryKind::NeumannY, traction).unwrap();
        problem.solve().unwrap();
        let residual = problem.compute_residual().unwrap().to_vec();
        assert_eq!(problem.stage(), Stage::ResidualComputed);

        for (dof, r) in residual.iter().enumerate() {
            if !problem.constraints().is_constrained(dof) {
                assert_relative_eq!(*r, 0.0, epsilon = 1e-6);
            }
        }
        // Reactions carry the weight of the unit square and the top load
        let reaction_y: f64 = (0..4).map(|n| residual[DofMap::dof(n, Component::Y)]).sum();
        let reaction_x: f64 = (0..4).map(|n| residual[DofMap::dof(n, Component::X)]).sum();
        assert_relative_eq!(
            reaction_y,
            material.density * gravity * 1.0 - traction * 1.0,
            max_relative = 1e-9
        );
        assert_relative_eq!(reaction_x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let mut problem = ElasticityProblem::new(
            unit_quad(),
            Material::titanium(),
            -9.81,
            ElasticCase::Axisymmetric,
        )
        .unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletX, 0.0).unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletY, 0.0).unwrap();
        let first = problem.solve().unwrap().to_vec();
        let second = problem.solve().unwrap().to_vec();
        assert_eq!(first, second);
        // Negative gravity lifts the free top nodes
        assert!(first[DofMap::dof(2, Component::Y)] > 0.0);
        assert_eq!(first[DofMap::dof(0, Component::Y)], 0.0);
    }

    #[test]
    fn test_unknown_domain() {
        let mut problem = ElasticityProblem::new(
            unit_quad(),
            Material::steel(),
            0.0,
            ElasticCase::PlaneStress,
        )
        .unwrap();
        let err = problem
            .add_boundary_condition("Hole", BoundaryKind::DirichletX, 0.0)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDomain(ref name) if name == "Hole"));
        assert!(problem.conditions().is_empty());
    }

    #[test]
    fn test_conflicting_dirichlet_rejected() {
        let mut problem = ElasticityProblem::new(
            unit_quad(),
            Material::steel(),
            0.0,
            ElasticCase::PlaneStress,
        )
        .unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletX, 0.0).unwrap();
        // Shares node 0 with Bottom, same value: accepted
        problem.add_boundary_condition("left", BoundaryKind::DirichletX, 0.0).unwrap();
        let before = problem.constraints().clone();
        // Shares node 1 with Bottom, different value: rejected
        let err = problem
            .add_boundary_condition("Right", BoundaryKind::DirichletX, 1e-3)
            .unwrap_err();
        assert!(matches!(err, Error::ConflictingConstraint { dof: 2, .. }));
        assert_eq!(problem.conditions().len(), 2);
        assert_eq!(problem.constraints(), &before);
        assert_eq!(problem.constraints().owner(0), Some(0));
        // Same domain, other component: no conflict
        problem.add_boundary_condition("Right", BoundaryKind::DirichletY, 1e-3).unwrap();
    }

    #[test]
    fn test_orphan_node_is_singular() {
        let (_, edges, quads, domains) = unit_quad().into_parts();
        let x = [0.0, 1.0, 1.0, 0.0, 2.0];
        let y = [0.0, 0.0, 1.0, 1.0, 2.0];
        let nodes = NodeSet::from_xy(&x, &y).unwrap();
        let geometry = Geometry::new(nodes, edges, quads, domains).unwrap();
        let mut problem =
            ElasticityProblem::new(geometry, Material::steel(), 0.0, ElasticCase::PlaneStress)
                .unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletX, 0.0).unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletY, 0.0).unwrap();
        // Node 4 belongs to no element, so its first dof has a zero pivot
        let err = problem.solve().unwrap_err();
        assert!(matches!(err, Error::SingularMatrix { index: 8, .. }));
        assert_eq!(problem.stage(), Stage::Constrained);
        assert!(problem.solution().iter().all(|&u| u == 0.0));
    }

    #[test]
    fn test_non_finite_gravity_rejected() {
        let result = ElasticityProblem::new(
            unit_quad(),
            Material::steel(),
            f64::NAN,
            ElasticCase::PlaneStress,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_banner() {
        let mut problem = ElasticityProblem::new(
            unit_quad(),
            Material::steel(),
            -9.81,
            ElasticCase::PlaneStress,
        )
        .unwrap();
        problem.add_boundary_condition("Top", BoundaryKind::NeumannY, -1e4).unwrap();
        let text = problem.to_string();
        assert!(text.contains("   Young modulus   E   =  2.0000000e+11 [N/m2]"), "{text}");
        assert!(text.contains("   Planar stresses formulation "));
        assert!(text.contains(
            "                   Top : imposing -1.00e+04 as the vertical force density "
        ));
    }
}
