//! The Riccati reformulation of a local solver.
//!
//! Some formulas are simpler to derive in terms of the Riccati variable `x`, a three-vector whose
//! length is the tangent of a quarter of the rotation angle, than directly in terms of the
//! orientation increment. The increment is recovered from `x` through the Cayley transform
//!
//! $$
//! \Lambda = \frac{1 - |x|^2 + 2x}{1 + |x|^2}
//! $$
//!
//! which maps any `x` to a unit quaternion. The result carries the accuracy of the formula that
//! produced `x` and is not re-normalized.
use nalgebra::{Quaternion, Vector3};

use crate::error::AttitudeResult;
use crate::iterative::{LocalSolution, Window};

/// A local solver expressed in the Riccati variable
pub trait RiccatiSolution {
    /// One input segment (an angular rate integrated over a sub-interval)
    type Segment: Copy + 'static;

    /// Human readable name of the method
    fn title(&self) -> String;
    /// Number of input segments consumed per output step
    fn steps_count(&self) -> usize {
        1
    }
    /// How the segments are collected
    fn window(&self) -> Window {
        Window::Subdivided
    }
    /// Riccati variable of the increment over the output interval ending at `t`
    fn local_riccati_solution(&self, t: f64, segments: &[Self::Segment]) -> AttitudeResult<Vector3<f64>>;
}

/// Cayley transform of a Riccati variable into an orientation increment
///
/// # Example
/// ```rust
/// use nalgebra::{Quaternion, Vector3};
/// use attitude::riccati::cayley;
/// assert_eq!(cayley(&Vector3::zeros()), Quaternion::identity());
/// ```
pub fn cayley(x: &Vector3<f64>) -> Quaternion<f64> {
    let norm = x.norm_squared();
    Quaternion::from_parts((1.0 - norm) / (1.0 + norm), x * (2.0 / (1.0 + norm)))
}

/// Riccati variable of a unit quaternion, `vec(q) / (1 + w)`.
///
/// Undefined for a half-turn (`w = -1`).
pub fn inverse_cayley(q: &Quaternion<f64>) -> Vector3<f64> {
    q.imag() / (1.0 + q.w)
}

/// Adapter turning a [`RiccatiSolution`] into a [`LocalSolution`] through [`cayley`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Riccati<R>(pub R);

impl<R: RiccatiSolution> LocalSolution for Riccati<R> {
    type Algebra = Quaternion<f64>;
    type Segment = R::Segment;

    fn title(&self) -> String {
        self.0.title()
    }
    fn steps_count(&self) -> usize {
        self.0.steps_count()
    }
    fn window(&self) -> Window {
        self.0.window()
    }
    fn local_solution(&self, t: f64, segments: &[R::Segment]) -> AttitudeResult<Quaternion<f64>> {
        let x = self.0.local_riccati_solution(t, segments)?;
        Ok(cayley(&x))
    }
}
