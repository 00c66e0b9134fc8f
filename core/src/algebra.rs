//! Orientation algebras and attitude-angle utilities.
//!
//! The integration algorithms are generic over the algebra an orientation lives in. Two algebras are
//! supported out of the box, both taken directly from [`nalgebra`]:
//! - [`Quaternion<f64>`]: a rotation of a rigid body. Orientation increments produced by the
//!   integration formulas are only unit-norm up to the formula's accuracy order, so the general
//!   (non-unit) quaternion type is used rather than `UnitQuaternion`.
//! - [`DualQuaternion<f64>`]: the biquaternion `a + s b` with `s² = 0`, describing combined
//!   orientation and position.
//!
//! This module also holds the "aircraft angles" triple (heading, pitch, roll) that the artificial
//! input generators use to describe a closed-form orientation law, together with the closed-form
//! conversions between the angles and a quaternion.

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use nalgebra::{DualQuaternion, Matrix3, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{AttitudeError, AttitudeResult};

/// An algebra in which orientations are represented and composed.
///
/// The product (`Mul`) is the composition of orientations and is generally non-commutative:
/// `a * b` applies `b` in the frame already rotated by `a`.
pub trait Algebra: Copy + Debug + Mul<Output = Self> + 'static {
    /// The identity orientation (`1` of the algebra)
    fn identity() -> Self;
    /// The algebra's norm in the classical sense: the sum of squared components
    fn norm_squared(&self) -> f64;
    /// Metric distance between two elements of the algebra
    fn distance(&self, other: &Self) -> f64;
}

impl Algebra for Quaternion<f64> {
    fn identity() -> Self {
        Quaternion::identity()
    }
    fn norm_squared(&self) -> f64 {
        self.coords.norm_squared()
    }
    /// Euclidean length of the component-wise difference
    fn distance(&self, other: &Self) -> f64 {
        (self.coords - other.coords).norm()
    }
}

impl Algebra for DualQuaternion<f64> {
    fn identity() -> Self {
        DualQuaternion::from_real_and_dual(Quaternion::identity(), Quaternion::new(0.0, 0.0, 0.0, 0.0))
    }
    fn norm_squared(&self) -> f64 {
        self.real.coords.norm_squared() + self.dual.coords.norm_squared()
    }
    /// The larger of the distances between the real parts and between the dual parts
    fn distance(&self, other: &Self) -> f64 {
        self.real.distance(&other.real).max(self.dual.distance(&other.dual))
    }
}

/// Embed a three-element vector as a pure quaternion `(0, v)`
pub fn pure_quaternion(v: &Vector3<f64>) -> Quaternion<f64> {
    Quaternion::from_imag(*v)
}

/// Convert a three-element vector to its skew-symmetric (cross product) matrix form
///
/// $$
/// x = \begin{bmatrix} a \\\\ b \\\\ c \end{bmatrix} \rightarrow X = \begin{bmatrix} 0 & -c & b \\\\ c & 0 & -a \\\\ -b & a & 0 \end{bmatrix}
/// $$
///
/// so that `skew_symmetric(a) * b == a.cross(&b)`.
///
/// # Example
/// ```rust
/// use nalgebra::Vector3;
/// use attitude::algebra::skew_symmetric;
/// let a = Vector3::new(1.0, 2.0, 3.0);
/// let b = Vector3::new(-2.0, 0.5, 4.0);
/// assert_eq!(skew_symmetric(&a) * b, a.cross(&b));
/// ```
pub fn skew_symmetric(v: &Vector3<f64>) -> Matrix3<f64> {
    let mut skew: Matrix3<f64> = Matrix3::zeros();
    skew[(0, 1)] = -v[2];
    skew[(0, 2)] = v[1];
    skew[(1, 0)] = v[2];
    skew[(1, 2)] = -v[0];
    skew[(2, 0)] = -v[1];
    skew[(2, 1)] = v[0];
    skew
}

/// Aircraft attitude angles: heading (ψ), pitch (θ) and roll (γ), in radians.
///
/// The angles follow the body-axis convention used by the artificial input generators: roll turns
/// the body about its x axis, heading about its y axis and pitch about its z axis. The same type
/// doubles as a three-component parameter set (amplitudes, frequencies, phase shifts) of an
/// orientation law, hence the component-wise arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftAngles {
    /// Heading (course) angle ψ
    pub heading: f64,
    /// Pitch angle θ
    pub pitch: f64,
    /// Roll angle γ
    pub roll: f64,
}

impl AircraftAngles {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        AircraftAngles { heading, pitch, roll }
    }
    /// Indexed component access in (heading, pitch, roll) order
    pub fn get(&self, index: usize) -> AttitudeResult<f64> {
        match index {
            0 => Ok(self.heading),
            1 => Ok(self.pitch),
            2 => Ok(self.roll),
            _ => Err(AttitudeError::InvalidIndex { index, len: 3 }),
        }
    }
    /// Component-wise sine
    pub fn sin(&self) -> Self {
        AircraftAngles::new(self.heading.sin(), self.pitch.sin(), self.roll.sin())
    }
    /// Component-wise cosine
    pub fn cos(&self) -> Self {
        AircraftAngles::new(self.heading.cos(), self.pitch.cos(), self.roll.cos())
    }
    /// Component-wise product
    pub fn component_mul(&self, other: &Self) -> Self {
        AircraftAngles::new(
            self.heading * other.heading,
            self.pitch * other.pitch,
            self.roll * other.roll,
        )
    }
    /// Closed-form conversion of the angle triple to an orientation quaternion
    pub fn to_quaternion(&self) -> Quaternion<f64> {
        let (sh, ch) = (self.heading / 2.0).sin_cos();
        let (sp, cp) = (self.pitch / 2.0).sin_cos();
        let (sr, cr) = (self.roll / 2.0).sin_cos();
        Quaternion::new(
            ch * cp * cr - sh * sp * sr,
            sh * sp * cr + ch * cp * sr,
            sh * cp * cr + ch * sp * sr,
            ch * sp * cr - sh * cp * sr,
        )
    }
    /// Recover the angle triple from a unit orientation quaternion.
    ///
    /// Heading and roll are recovered through `atan` and are therefore only valid within
    /// (-π/2, π/2), which covers the small-amplitude oscillations used for modelling.
    pub fn from_quaternion(q: &Quaternion<f64>) -> Self {
        let (w, x, y, z) = (q.w, q.i, q.j, q.k);
        AircraftAngles {
            heading: ((w * y - x * z) / (w * w + x * x - 0.5)).atan(),
            pitch: (2.0 * (x * y + w * z)).clamp(-1.0, 1.0).asin(),
            roll: ((w * x - y * z) / (w * w + y * y - 0.5)).atan(),
        }
    }
}

impl Add for AircraftAngles {
    type Output = AircraftAngles;
    fn add(self, rhs: Self) -> Self::Output {
        AircraftAngles::new(self.heading + rhs.heading, self.pitch + rhs.pitch, self.roll + rhs.roll)
    }
}
impl Sub for AircraftAngles {
    type Output = AircraftAngles;
    fn sub(self, rhs: Self) -> Self::Output {
        AircraftAngles::new(self.heading - rhs.heading, self.pitch - rhs.pitch, self.roll - rhs.roll)
    }
}
impl Mul<f64> for AircraftAngles {
    type Output = AircraftAngles;
    fn mul(self, rhs: f64) -> Self::Output {
        AircraftAngles::new(self.heading * rhs, self.pitch * rhs, self.roll * rhs)
    }
}

/// Body angular rate from the aircraft angles and their time derivatives.
///
/// This is the kinematic relation between attitude-angle rates and the angular velocity expressed
/// in body axes:
///
/// $$
/// \omega_x = \dot\gamma + \dot\psi \sin\theta, \quad
/// \omega_y = \dot\theta \sin\gamma + \dot\psi \cos\theta \cos\gamma, \quad
/// \omega_z = \dot\theta \cos\gamma - \dot\psi \cos\theta \sin\gamma
/// $$
pub fn body_rate(angles: &AircraftAngles, rates: &AircraftAngles) -> Vector3<f64> {
    let (sin_pitch, cos_pitch) = angles.pitch.sin_cos();
    let (sin_roll, cos_roll) = angles.roll.sin_cos();
    Vector3::new(
        rates.roll + rates.heading * sin_pitch,
        rates.pitch * sin_roll + rates.heading * cos_pitch * cos_roll,
        rates.pitch * cos_roll - rates.heading * cos_pitch * sin_roll,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::FRAC_1_SQRT_2;

    fn random_quaternion(rng: &mut StdRng) -> Quaternion<f64> {
        Quaternion::new(
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
        )
    }

    #[test]
    fn quaternion_product_is_hamilton() {
        let i = pure_quaternion(&Vector3::x());
        let j = pure_quaternion(&Vector3::y());
        assert_eq!(i * j, pure_quaternion(&Vector3::z()));
        assert_eq!(j * i, pure_quaternion(&-Vector3::z()));
        let a = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        let b = Quaternion::new(5.0, 6.0, 7.0, 8.0);
        assert_ne!(a * b, b * a);
        let v = pure_quaternion(&Vector3::new(1.0, 2.0, 3.0));
        let u = pure_quaternion(&Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(v * u, Quaternion::from_real(-28.0));
    }
    #[test]
    fn quaternion_norm_is_sum_of_squares() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Algebra::norm_squared(&q), 30.0);
        assert_eq!(<Quaternion<f64> as Algebra>::identity(), Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }
    #[test]
    fn quaternion_distance_is_a_metric() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let a = random_quaternion(&mut rng);
            let b = random_quaternion(&mut rng);
            let c = random_quaternion(&mut rng);
            assert_eq!(a.distance(&a), 0.0);
            assert_approx_eq!(a.distance(&b), b.distance(&a), 1e-15);
            assert!(a.distance(&c) <= a.distance(&b) + b.distance(&c) + 1e-12);
        }
        let a = Quaternion::new(1.0, 0.0, 0.0, 0.0);
        let b = Quaternion::new(1.0, 3.0, 0.0, 4.0);
        assert_approx_eq!(a.distance(&b), 5.0, 1e-15);
    }
    #[test]
    fn dual_quaternion_distance_takes_larger_part() {
        let a = DualQuaternion::from_real_and_dual(
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
            Quaternion::new(0.0, 1.0, 0.0, 0.0),
        );
        let b = DualQuaternion::from_real_and_dual(
            Quaternion::new(0.0, 0.0, 0.0, 0.0),
            Quaternion::new(0.0, 1.0, 3.0, 0.0),
        );
        assert_approx_eq!(a.distance(&b), 3.0, 1e-15);
        assert_approx_eq!(b.distance(&a), 3.0, 1e-15);
        assert_eq!(a.distance(&a), 0.0);
    }
    #[test]
    fn dual_quaternion_product_has_nilpotent_unit() {
        let s = DualQuaternion::from_real_and_dual(
            Quaternion::new(0.0, 0.0, 0.0, 0.0),
            Quaternion::identity(),
        );
        let product = s * s;
        assert_eq!(product.real, Quaternion::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(product.dual, Quaternion::new(0.0, 0.0, 0.0, 0.0));
        let one = <DualQuaternion<f64> as Algebra>::identity();
        let p = one * s;
        assert_eq!(p.dual, Quaternion::identity());
    }
    #[test]
    fn skew_symmetric_matches_cross_product() {
        let v: Vector3<f64> = Vector3::new(1.0, 2.0, 3.0);
        let skew: Matrix3<f64> = skew_symmetric(&v);
        assert_eq!(skew[(0, 1)], -v[2]);
        assert_eq!(skew[(0, 2)], v[1]);
        assert_eq!(skew[(1, 0)], v[2]);
        assert_eq!(skew[(1, 2)], -v[0]);
        assert_eq!(skew[(2, 0)], -v[1]);
        assert_eq!(skew[(2, 1)], v[0]);
        assert_eq!(skew + skew.transpose(), Matrix3::zeros());
    }
    #[test]
    fn angles_to_quaternion_single_axis() {
        let roll = AircraftAngles::new(0.0, 0.0, std::f64::consts::FRAC_PI_2).to_quaternion();
        assert_approx_eq!(roll.w, FRAC_1_SQRT_2, 1e-15);
        assert_approx_eq!(roll.i, FRAC_1_SQRT_2, 1e-15);
        assert_approx_eq!(roll.j, 0.0, 1e-15);
        assert_approx_eq!(roll.k, 0.0, 1e-15);
        assert_eq!(AircraftAngles::default().to_quaternion(), Quaternion::identity());
    }
    #[test]
    fn angles_round_trip_through_quaternion() {
        for angles in [
            AircraftAngles::new(0.1, 0.2, 0.3),
            AircraftAngles::new(-0.4, 0.3, 0.2),
            AircraftAngles::new(1.0, -0.5, 0.7),
        ] {
            let q = angles.to_quaternion();
            assert_approx_eq!(Algebra::norm_squared(&q), 1.0, 1e-12);
            let back = AircraftAngles::from_quaternion(&q);
            assert_approx_eq!(back.heading, angles.heading, 1e-12);
            assert_approx_eq!(back.pitch, angles.pitch, 1e-12);
            assert_approx_eq!(back.roll, angles.roll, 1e-12);
        }
    }
    #[test]
    fn angles_component_access() {
        let angles = AircraftAngles::new(1.0, 2.0, 3.0);
        assert_eq!(angles.get(0), Ok(1.0));
        assert_eq!(angles.get(2), Ok(3.0));
        assert_eq!(angles.get(3), Err(AttitudeError::InvalidIndex { index: 3, len: 3 }));
        let doubled = (angles + angles) * 0.5 - angles;
        assert_eq!(doubled, AircraftAngles::default());
        let product = angles.component_mul(&AircraftAngles::new(2.0, 0.5, -1.0));
        assert_eq!(product, AircraftAngles::new(2.0, 1.0, -3.0));
    }
    #[test]
    fn body_rate_pure_roll_and_heading() {
        let level = AircraftAngles::default();
        let omega = body_rate(&level, &AircraftAngles::new(0.0, 0.0, 0.5));
        assert_eq!(omega, Vector3::new(0.5, 0.0, 0.0));
        let omega = body_rate(&level, &AircraftAngles::new(0.5, 0.0, 0.0));
        assert_eq!(omega, Vector3::new(0.0, 0.5, 0.0));
        let omega = body_rate(&level, &AircraftAngles::new(0.0, 0.5, 0.0));
        assert_eq!(omega, Vector3::new(0.0, 0.0, 0.5));
    }
}
