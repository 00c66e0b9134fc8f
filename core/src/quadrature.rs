//! Definite-integral (quadrature) service.
//!
//! The artificial input generators produce integrated angular-rate data by numerically integrating
//! the instantaneous angular rate. The integrator is an explicit parameter of the generator rather
//! than a process-wide selection: [`Simpson::default`] is the conventional choice and any other
//! [`Quadrature`] implementation can be supplied in its place.

use std::ops::{Add, Mul};

use nalgebra::{Quaternion, Vector3};

/// Default sub-step of the composite Simpson rule
pub const DEFAULT_SIMPSON_STEP: f64 = 1e-4;
/// Minimum number of Simpson sub-intervals, regardless of the sub-step
pub const MIN_SIMPSON_INTERVALS: usize = 10;

/// Values that can be accumulated by a quadrature rule
pub trait Integrand: Copy + Add<Output = Self> + Mul<f64, Output = Self> {
    /// The additive identity
    fn zero() -> Self;
}
impl Integrand for f64 {
    fn zero() -> Self {
        0.0
    }
}
impl Integrand for Vector3<f64> {
    fn zero() -> Self {
        Vector3::zeros()
    }
}
impl Integrand for Quaternion<f64> {
    fn zero() -> Self {
        Quaternion::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// A numerical method for definite integrals of a scalar-argument function
pub trait Quadrature<T> {
    /// Human readable name of the method
    fn name(&self) -> String;
    /// Integrate `f` over `[x0, x1]`
    fn integrate(&self, f: &dyn Fn(f64) -> T, x0: f64, x1: f64) -> T;
}

/// Composite Simpson's rule with a fixed sub-step.
///
/// The interval is split into `N = max(⌊(x1 - x0) / step⌋, 10)` sub-intervals, rounded up to an
/// even number. The error is of order `O(step⁴)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Simpson {
    /// Nominal sub-step; smaller is more accurate
    pub step: f64,
}
impl Simpson {
    pub fn new(step: f64) -> Self {
        Simpson { step }
    }
    /// Number of (even) sub-intervals used for `[x0, x1]`
    pub fn intervals(&self, x0: f64, x1: f64) -> usize {
        let n = ((x1 - x0) / self.step) as usize;
        let n = n.max(MIN_SIMPSON_INTERVALS);
        if n % 2 == 1 { n + 1 } else { n }
    }
}
impl Default for Simpson {
    fn default() -> Self {
        Simpson::new(DEFAULT_SIMPSON_STEP)
    }
}
impl<T: Integrand> Quadrature<T> for Simpson {
    fn name(&self) -> String {
        format!("Simpson's rule (step = {})", self.step)
    }
    fn integrate(&self, f: &dyn Fn(f64) -> T, x0: f64, x1: f64) -> T {
        let n = self.intervals(x0, x1);
        let h = (x1 - x0) / n as f64;
        let mut sum = T::zero();
        for i in 0..=n {
            let weight = if i == 0 || i == n {
                1.0
            } else if i % 2 == 0 {
                2.0
            } else {
                4.0
            };
            sum = sum + f(x0 + h * i as f64) * weight;
        }
        sum * (h / 3.0)
    }
}
