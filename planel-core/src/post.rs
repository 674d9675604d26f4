//! Post-processing of a solved problem.
//!
//! Nodal quantities come straight from the interleaved solution and residual
//! vectors. Strains and stresses are recovered per element: the element's
//! nodal displacements are differentiated through the shape functions
//! (ε = B·u) and pushed through the planar law (σ = D·ε).

use crate::assembly::kinematics;
use crate::element::{ElementShape, QuadratureRule};
use crate::error::{Error, Result};
use crate::problem::ElasticityProblem;
use crate::types::{DofMap, StrainTensor, StressTensor};
use nalgebra::{Vector2, Vector3};

/// Euclidean norm of the displacement at every node.
pub fn displacement_norms(solution: &[f64]) -> Vec<f64> {
    solution
        .chunks_exact(DofMap::DOFS_PER_NODE)
        .map(|uv| uv[0].hypot(uv[1]))
        .collect()
}

/// Smallest and largest value, or `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values[1..]
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Resultant of a nodal force vector: (Σ x-components, Σ y-components).
pub fn global_force(forces: &[f64]) -> Vector2<f64> {
    forces
        .chunks_exact(DofMap::DOFS_PER_NODE)
        .fold(Vector2::zeros(), |sum, f| sum + Vector2::new(f[0], f[1]))
}

/// Reference coordinates of the element centre.
pub fn centroid(shape: ElementShape) -> (f64, f64) {
    match shape {
        ElementShape::Triangle => (1.0 / 3.0, 1.0 / 3.0),
        ElementShape::Quad | ElementShape::Edge => (0.0, 0.0),
    }
}

/// Strain [ε_xx, ε_yy, γ_xy] of the current solution at (ξ, η) in `element`.
pub fn strain_at(
    problem: &ElasticityProblem,
    element: usize,
    xi: f64,
    eta: f64,
) -> Result<StrainTensor> {
    let geometry = problem.geometry();
    let mesh = geometry.elements();
    if element >= mesh.n_elements() {
        return Err(Error::Configuration(format!(
            "element {element} out of range (mesh has {} elements)",
            mesh.n_elements()
        )));
    }
    let coords = mesh.element_coords(geometry.nodes(), element);
    let k = kinematics(problem.space(), &coords, xi, eta, element)?;
    let u = problem.solution();

    let mut strain = Vector3::zeros();
    for (i, &node) in mesh.element(element).iter().enumerate() {
        let dofs = DofMap::node(node);
        let (ux, uy) = (u[dofs.x], u[dofs.y]);
        strain[0] += k.dphidx[i] * ux;
        strain[1] += k.dphidy[i] * uy;
        strain[2] += k.dphidy[i] * ux + k.dphidx[i] * uy;
    }
    Ok(StrainTensor(strain))
}

/// Stress [σ_xx, σ_yy, τ_xy] of the current solution at (ξ, η) in `element`.
pub fn stress_at(
    problem: &ElasticityProblem,
    element: usize,
    xi: f64,
    eta: f64,
) -> Result<StressTensor> {
    let strain = strain_at(problem, element, xi, eta)?;
    Ok(StressTensor(problem.coefficients().constitutive() * strain.0))
}

/// Stress result for a single element.
#[derive(Debug, Clone)]
pub struct ElementStress {
    pub element_id: usize,
    /// Stress at each integration point of the bulk rule.
    pub integration_point_stresses: Vec<StressTensor>,
}

impl ElementStress {
    /// Average over the integration points.
    pub fn average_stress(&self) -> StressTensor {
        if self.integration_point_stresses.is_empty() {
            return StressTensor::zero();
        }
        let n = self.integration_point_stresses.len() as f64;
        let sum = self
            .integration_point_stresses
            .iter()
            .fold(Vector3::zeros(), |sum, s| sum + s.0);
        StressTensor(sum / n)
    }

    pub fn max_von_mises(&self) -> f64 {
        self.integration_point_stresses
            .iter()
            .map(|s| s.von_mises())
            .fold(0.0, f64::max)
    }
}

/// Stresses of every element of the mesh.
#[derive(Debug, Clone)]
pub struct StressField {
    pub element_stresses: Vec<ElementStress>,
}

impl StressField {
    pub fn element(&self, elem_id: usize) -> Option<&ElementStress> {
        self.element_stresses.get(elem_id)
    }

    /// Maximum von Mises stress across all elements.
    pub fn max_von_mises(&self) -> f64 {
        self.element_stresses
            .iter()
            .map(ElementStress::max_von_mises)
            .fold(0.0, f64::max)
    }

    pub fn n_elements(&self) -> usize {
        self.element_stresses.len()
    }
}

/// Recover stresses at the bulk integration points of every element.
pub fn recover_stresses(problem: &ElasticityProblem) -> Result<StressField> {
    let shape = problem.geometry().elements().shape();
    let rule = QuadratureRule::for_shape(shape);
    let element_stresses = (0..problem.geometry().elements().n_elements())
        .map(|element_id| {
            let integration_point_stresses = rule
                .points()
                .iter()
                .map(|gp| stress_at(problem, element_id, gp.xi(), gp.eta()))
                .collect::<Result<Vec<_>>>()?;
            Ok(ElementStress {
                element_id,
                integration_point_stresses,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(StressField { element_stresses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryKind;
    use crate::geometry::tests::unit_square_triangles;
    use crate::material::{ElasticCase, Material};
    use approx::assert_relative_eq;

    #[test]
    fn test_displacement_norms() {
        let norms = displacement_norms(&[3.0, 4.0, 0.0, -2.0]);
        assert_eq!(norms, vec![5.0, 2.0]);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[2.0, -1.0, 7.5, 0.0]), Some((-1.0, 7.5)));
        assert_eq!(min_max(&[]), None);
    }

    #[test]
    fn test_global_force() {
        let total = global_force(&[1.0, -2.0, 0.5, 3.0, -1.5, 0.0]);
        assert_eq!(total, Vector2::new(0.0, 1.0));
    }

    fn uniaxial(case: ElasticCase) -> ElasticityProblem {
        let material = Material::new(1000.0, 0.25).unwrap();
        let mut problem =
            ElasticityProblem::new(unit_square_triangles(), material, 0.0, case).unwrap();
        problem.add_boundary_condition("Left", BoundaryKind::DirichletX, 0.0).unwrap();
        problem.add_boundary_condition("Bottom", BoundaryKind::DirichletY, 0.0).unwrap();
        problem.add_boundary_condition("Right", BoundaryKind::NeumannX, 10.0).unwrap();
        problem.solve().unwrap();
        problem
    }

    #[test]
    fn test_uniaxial_strain_and_stress() {
        let problem = uniaxial(ElasticCase::PlaneStress);
        let (xi, eta) = centroid(ElementShape::Triangle);
        for element in 0..2 {
            let strain = strain_at(&problem, element, xi, eta).unwrap();
            assert_relative_eq!(strain.0[0], 0.01, epsilon = 1e-12);
            assert_relative_eq!(strain.0[1], -0.0025, epsilon = 1e-12);
            assert_relative_eq!(strain.0[2], 0.0, epsilon = 1e-12);

            let stress = stress_at(&problem, element, xi, eta).unwrap();
            assert_relative_eq!(stress.0[0], 10.0, epsilon = 1e-9);
            assert_relative_eq!(stress.0[1], 0.0, epsilon = 1e-9);
        }
        assert!(strain_at(&problem, 2, xi, eta).is_err());
    }

    #[test]
    fn test_recovered_field() {
        let problem = uniaxial(ElasticCase::PlaneStress);
        let field = recover_stresses(&problem).unwrap();
        assert_eq!(field.n_elements(), 2);
        assert_eq!(field.element(1).unwrap().integration_point_stresses.len(), 3);
        assert_relative_eq!(field.max_von_mises(), 10.0, epsilon = 1e-9);
        let average = field.element(0).unwrap().average_stress();
        assert_relative_eq!(average.0[0], 10.0, epsilon = 1e-9);
    }
}
