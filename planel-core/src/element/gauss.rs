//! Gauss quadrature rules for numerical integration.
//!
//! Only three rules exist, one per element shape:
//! - 3-point rule on the reference triangle (0,0), (1,0), (0,1)
//! - 2×2 Gauss-Legendre product rule on the reference quad [-1, 1]²
//! - 2-point Gauss-Legendre rule on the reference edge [-1, 1]
//!
//! # Usage
//!
//! ```
//! use planel_core::element::{ElementShape, QuadratureRule};
//!
//! let rule = QuadratureRule::new(ElementShape::Triangle, 3).unwrap();
//! let area: f64 = rule.points().iter().map(|gp| gp.weight).sum();
//! assert!((area - 0.5).abs() < 1e-12);
//! ```

use crate::element::ElementShape;
use crate::error::{Error, Result};

/// A Gauss quadrature point with natural coordinates and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussPoint {
    /// Natural coordinates [ξ, η]; η is 0 on edges.
    pub coords: [f64; 2],
    /// Integration weight.
    pub weight: f64,
}

impl GaussPoint {
    /// Create a new Gauss point.
    pub const fn new(xi: f64, eta: f64, weight: f64) -> Self {
        Self {
            coords: [xi, eta],
            weight,
        }
    }

    /// Get ξ (first natural coordinate).
    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    /// Get η (second natural coordinate).
    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }
}

const GAUSS_2: f64 = 0.577350269189626;
const SIXTH: f64 = 0.166666666666667;
const TWO_THIRDS: f64 = 0.666666666666667;

const TRIANGLE_3: [GaussPoint; 3] = [
    GaussPoint::new(SIXTH, SIXTH, SIXTH),
    GaussPoint::new(TWO_THIRDS, SIXTH, SIXTH),
    GaussPoint::new(SIXTH, TWO_THIRDS, SIXTH),
];

const QUAD_4: [GaussPoint; 4] = [
    GaussPoint::new(-GAUSS_2, GAUSS_2, 1.0),
    GaussPoint::new(-GAUSS_2, -GAUSS_2, 1.0),
    GaussPoint::new(GAUSS_2, -GAUSS_2, 1.0),
    GaussPoint::new(GAUSS_2, GAUSS_2, 1.0),
];

const EDGE_2: [GaussPoint; 2] = [
    GaussPoint::new(GAUSS_2, 0.0, 1.0),
    GaussPoint::new(-GAUSS_2, 0.0, 1.0),
];

/// Immutable table of integration points for one element shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureRule {
    shape: ElementShape,
    points: &'static [GaussPoint],
}

impl QuadratureRule {
    /// Look up the rule for a (shape, order) pair.
    ///
    /// # Errors
    ///
    /// Only triangle/3, quad/4 and edge/2 exist; anything else is a
    /// configuration error.
    pub fn new(shape: ElementShape, order: usize) -> Result<Self> {
        let points: &'static [GaussPoint] = match (shape, order) {
            (ElementShape::Triangle, 3) => &TRIANGLE_3,
            (ElementShape::Quad, 4) => &QUAD_4,
            (ElementShape::Edge, 2) => &EDGE_2,
            _ => {
                return Err(Error::Configuration(format!(
                    "cannot create an integration rule of order {order} for a {shape}"
                )))
            }
        };
        Ok(Self { shape, points })
    }

    /// Default rule for a shape (the only one it supports).
    pub fn for_shape(shape: ElementShape) -> Self {
        let points: &'static [GaussPoint] = match shape {
            ElementShape::Triangle => &TRIANGLE_3,
            ElementShape::Quad => &QUAD_4,
            ElementShape::Edge => &EDGE_2,
        };
        Self { shape, points }
    }

    /// Element shape this rule integrates over.
    pub fn shape(&self) -> ElementShape {
        self.shape
    }

    /// Number of integration points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; every rule has points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Integration points.
    pub fn points(&self) -> &'static [GaussPoint] {
        self.points
    }

    /// Apply the rule to a function of the natural coordinates.
    pub fn integrate<F>(&self, mut f: F) -> f64
    where
        F: FnMut(f64, f64) -> f64,
    {
        self.points
            .iter()
            .map(|gp| gp.weight * f(gp.xi(), gp.eta()))
            .sum()
    }
}
