//! Finite element assembly into the dense global system.
//!
//! Every routine here adds into an already zeroed [`DenseSystem`]; resetting
//! the system between passes is the caller's job. Local-to-global dof
//! numbering goes through [`DofMap`].

use crate::boundary::BoundaryCondition;
use crate::element::space::ShapeValues;
use crate::element::{QuadratureRule, ReferenceSpace, MAX_LOCAL_NODES};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::material::ElasticCoefficients;
use crate::system::DenseSystem;
use crate::types::{DofMap, Point2};
use nalgebra::{Matrix2, Vector2};
use tracing::debug;

/// Jacobians at or below this magnitude mark a degenerate element.
pub const DEGENERATE_JACOBIAN: f64 = 1e-16;

/// Shape functions and physical gradients at one point of an element.
#[derive(Debug, Clone, Copy)]
pub struct Kinematics {
    /// Number of meaningful entries in the arrays below.
    pub n: usize,
    pub phi: ShapeValues,
    pub dphidx: ShapeValues,
    pub dphidy: ShapeValues,
    /// |det J|, the area scaling from reference to physical element.
    pub jacobian: f64,
}

/// Jacobian of the reference-to-physical map at (ξ, η).
///
/// ```text
/// J = [[∂x/∂ξ, ∂x/∂η],
///      [∂y/∂ξ, ∂y/∂η]]
/// ```
pub fn jacobian(space: ReferenceSpace, coords: &[Point2], xi: f64, eta: f64) -> Matrix2<f64> {
    let grad = space.dphi(xi, eta);
    let mut j = Matrix2::zeros();
    for (i, p) in coords.iter().enumerate().take(space.n()) {
        j[(0, 0)] += p.x * grad.dxi[i];
        j[(0, 1)] += p.x * grad.deta[i];
        j[(1, 0)] += p.y * grad.dxi[i];
        j[(1, 1)] += p.y * grad.deta[i];
    }
    j
}

/// Evaluate φ, ∂φ/∂x, ∂φ/∂y and |det J| on element `element` at (ξ, η).
///
/// # Errors
///
/// [`Error::Mesh`] if the element is degenerate at that point.
pub fn kinematics(
    space: ReferenceSpace,
    coords: &[Point2],
    xi: f64,
    eta: f64,
    element: usize,
) -> Result<Kinematics> {
    let j = jacobian(space, coords, xi, eta);
    let det = j.determinant();
    if det.abs() <= DEGENERATE_JACOBIAN {
        return Err(Error::Mesh(format!(
            "element {element} is degenerate (det J = {det:e})"
        )));
    }
    let j_inv = j.try_inverse().ok_or_else(|| {
        Error::Mesh(format!("element {element} has a singular Jacobian"))
    })?;

    // [∂φ/∂x, ∂φ/∂y] = J^-T · [∂φ/∂ξ, ∂φ/∂η]
    let j_inv_t = j_inv.transpose();
    let grad = space.dphi(xi, eta);
    let mut dphidx = [0.0; MAX_LOCAL_NODES];
    let mut dphidy = [0.0; MAX_LOCAL_NODES];
    for i in 0..space.n() {
        let physical = j_inv_t * Vector2::new(grad.dxi[i], grad.deta[i]);
        dphidx[i] = physical[0];
        dphidy[i] = physical[1];
    }

    Ok(Kinematics {
        n: space.n(),
        phi: space.phi(xi, eta),
        dphidx,
        dphidy,
        jacobian: det.abs(),
    })
}

/// Add the bulk stiffness and the gravity load to `system`.
///
/// The body load on each y dof is −∫ φ·g·ρ, so a positive `gravity` pulls
/// towards −y.
pub fn assemble_elements(
    system: &mut DenseSystem,
    geometry: &Geometry,
    space: ReferenceSpace,
    rule: &QuadratureRule,
    coefficients: &ElasticCoefficients,
    density: f64,
    gravity: f64,
) -> Result<()> {
    let mesh = geometry.elements();
    let ElasticCoefficients { a, b, c } = *coefficients;

    for (elem_idx, connectivity) in mesh.elements().enumerate() {
        let coords = mesh.element_coords(geometry.nodes(), elem_idx);
        let dofs: Vec<_> = connectivity.iter().map(|&node| DofMap::node(node)).collect();

        for gp in rule.points() {
            let k = kinematics(space, &coords, gp.xi(), gp.eta(), elem_idx)?;
            let scale = k.jacobian * gp.weight;

            for i in 0..k.n {
                let (dxi, dyi) = (k.dphidx[i], k.dphidy[i]);
                for j in 0..k.n {
                    let (dxj, dyj) = (k.dphidx[j], k.dphidy[j]);
                    system[(dofs[i].x, dofs[j].x)] += (dxi * a * dxj + dyi * c * dyj) * scale;
                    system[(dofs[i].x, dofs[j].y)] += (dxi * b * dyj + dyi * c * dxj) * scale;
                    system[(dofs[i].y, dofs[j].x)] += (dyi * b * dxj + dxi * c * dyj) * scale;
                    system[(dofs[i].y, dofs[j].y)] += (dyi * a * dyj + dxi * c * dxj) * scale;
                }
            }
            let rhs = system.rhs_mut();
            for i in 0..k.n {
                rhs[dofs[i].y] -= k.phi[i] * gravity * density * scale;
            }
        }
    }

    debug!(elements = mesh.n_elements(), shape = %mesh.shape(), "bulk assembly done");
    Ok(())
}

/// Add the edge loads of every Neumann condition to the right-hand side.
///
/// Dirichlet conditions are skipped.
pub fn assemble_neumann(
    system: &mut DenseSystem,
    geometry: &Geometry,
    space: ReferenceSpace,
    rule: &QuadratureRule,
    conditions: &[BoundaryCondition],
) -> Result<()> {
    let edges = geometry.edges();
    let nodes = geometry.nodes();
    let mut n_loaded = 0;

    for condition in conditions.iter().filter(|c| !c.kind.is_dirichlet()) {
        let domain = geometry.domain(condition.domain).ok_or_else(|| {
            Error::Configuration(format!("illegal domain number {}", condition.domain))
        })?;
        let component = condition.kind.component();

        for &edge in domain.edges() {
            let ends = edges.element(edge);
            let (p0, p1) = (nodes.coords()[ends[0]], nodes.coords()[ends[1]]);
            let jac = (p1 - p0).norm() / 2.0;
            let rhs = system.rhs_mut();
            for gp in rule.points() {
                let phi = space.phi(gp.xi(), gp.eta());
                for (i, &node) in ends.iter().enumerate() {
                    rhs[DofMap::dof(node, component)] += jac * gp.weight * phi[i] * condition.value;
                }
            }
            n_loaded += 1;
        }
    }

    debug!(edges = n_loaded, "neumann assembly done");
    Ok(())
}

/// Integrate a nodal field over the bulk mesh.
///
/// `f` is sampled at the element nodes and interpolated with the shape
/// functions, so `f ≡ 1` yields the area of the mesh.
pub fn integrate<F>(
    geometry: &Geometry,
    space: ReferenceSpace,
    rule: &QuadratureRule,
    mut f: F,
) -> Result<f64>
where
    F: FnMut(f64, f64) -> f64,
{
    let mesh = geometry.elements();
    let mut value = 0.0;
    for elem_idx in 0..mesh.n_elements() {
        let coords = mesh.element_coords(geometry.nodes(), elem_idx);
        let nodal: Vec<f64> = coords.iter().map(|p| f(p.x, p.y)).collect();
        for gp in rule.points() {
            let k = kinematics(space, &coords, gp.xi(), gp.eta(), elem_idx)?;
            for i in 0..k.n {
                value += k.phi[i] * nodal[i] * k.jacobian * gp.weight;
            }
        }
    }
    Ok(value)
}
