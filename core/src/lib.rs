//! Orientation kinematics integration toolbox
//!
//! This crate numerically integrates rigid-body orientation kinematics expressed in quaternion (or
//! dual quaternion) algebra. Given either instantaneous angular-rate samples or the angular rate
//! integrated over time sub-intervals, an algorithm produces an orientation trajectory sampled at a
//! fixed time step. The crate is designed for studying and ranking the integration formulas
//! themselves: it produces one offline trajectory per run and compares it against a reference. It
//! is not a real-time attitude estimator and it does not read IMU hardware.
//!
//! Primarily built off of [`nalgebra`](https://crates.io/crates/nalgebra), which provides the
//! vector, matrix, quaternion and dual quaternion types the formulas are written in.
//!
//! ## Crate overview
//!
//! - [algebra]: The [`Algebra`](algebra::Algebra) contract for orientation types, skew-symmetric
//!   helpers and the aircraft angles used by the closed-form orientation laws.
//! - [quadrature]: Definite-integral service (composite Simpson rule).
//! - [algorithm]: The [`Algorithm`](algorithm::Algorithm) contract and its shared configuration.
//! - [iterative]: The multi-step engine composing locally computed increments.
//! - [riccati]: The Riccati (Cayley transform) reformulation of a local solver.
//! - [methods]: The concrete integration formulas of 2nd, 4th and 6th order.
//! - [artificial]: Artificial inputs: closed-form orientation laws with matching angular rates.
//! - [modelling]: The error-analysis harness comparing an algorithm against an artificial input.
//! - [config]: File-based scenario configuration.
//!
//! ## Orientation kinematics
//!
//! The orientation $\lambda(t)$ of a body rotating with body-frame angular rate $\omega(t)$ obeys
//!
//! $$
//! \dot\lambda = \frac{1}{2} \lambda \circ \omega
//! $$
//!
//! Every algorithm in this crate advances the solution one output step $h$ at a time by composing
//! the previous orientation with a locally computed increment:
//!
//! $$
//! \lambda_i = \lambda_{i-1} \circ \Lambda_i
//! $$
//!
//! The increment $\Lambda_i$ depends only on input data of the current interval (or the few most
//! recent intervals). Quaternion multiplication does not commute, so the increment is always
//! applied on the right.
//!
//! The input used by the formulas is the integrated angular rate (the "rotation vector
//! increment") over an interval:
//!
//! $$
//! \gamma = \int_{t_1}^{t_2} \omega(t) \\, dt
//! $$
pub mod algebra;
pub mod algorithm;
pub mod artificial;
pub mod config;
pub mod error;
pub mod iterative;
pub mod methods;
pub mod modelling;
pub mod quadrature;
pub mod riccati;

pub use crate::algebra::Algebra;
pub use crate::error::{AttitudeError, AttitudeResult, RateKind};

/// Tolerance guarding floating-point error at the end of the time grid
pub const EPSILON: f64 = 1e-9;

/// Result of querying an optional capability of an [`InputSource`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Capability<T> {
    /// The source provides this kind of data
    Supported(T),
    /// The source does not provide this kind of data
    Unsupported,
}
impl<T> Capability<T> {
    /// Convert into a result, failing with [`AttitudeError::Unsupported`] for unsupported data
    pub fn require(self, kind: RateKind) -> AttitudeResult<T> {
        match self {
            Capability::Supported(value) => Ok(value),
            Capability::Unsupported => Err(AttitudeError::Unsupported(kind)),
        }
    }
    pub fn is_supported(&self) -> bool {
        matches!(self, Capability::Supported(_))
    }
}

/// Source of input data for an algorithm.
///
/// A source always knows the orientation at time zero. Angular-rate data comes in two optional
/// flavours: instantaneous samples and rates integrated over an interval. Sources answer
/// [`Capability::Unsupported`] for flavours they do not provide, which is the default.
pub trait InputSource {
    /// The algebra orientations are expressed in
    type Algebra: Algebra;
    /// The input data type (angular rate, or its integral over an interval)
    type Input;

    /// Orientation at time zero
    fn initial_solution(&self) -> Self::Algebra;
    /// Angular rate at time `t`
    fn instantaneous(&self, _t: f64) -> Capability<Self::Input> {
        Capability::Unsupported
    }
    /// Angular rate integrated over `[t1, t2]`
    fn integrated(&self, _t1: f64, _t2: f64) -> Capability<Self::Input> {
        Capability::Unsupported
    }
}

/// Build the output time grid `0, step, 2 step, ...` up to `last_time` (inclusive within
/// [`EPSILON`]).
///
/// The grid has `⌊last_time / step⌋ + 1` points. When `step` exceeds `last_time` the grid would
/// collapse to the initial point alone; instead it becomes `[0, last_time]`, so a run always
/// contains at least one integration step.
///
/// Callers must pass positive values; see [`algorithm::AlgorithmConfig`] for the checked entry
/// point.
///
/// # Example
/// ```rust
/// use attitude::time_grid;
/// assert_eq!(time_grid(0.5, 2.0), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
/// assert_eq!(time_grid(3.0, 2.0), vec![0.0, 2.0]);
/// ```
pub fn time_grid(step: f64, last_time: f64) -> Vec<f64> {
    let count = ((last_time + EPSILON) / step).floor() as usize;
    let mut times: Vec<f64> = (0..=count).map(|i| i as f64 * step).collect();
    if times.len() == 1 {
        times.push(last_time);
    }
    times
}

/// An orientation trajectory: orientations sampled on a fixed time grid.
///
/// The time grid is fixed on construction and element 0 holds the initial orientation. The
/// remaining orientations are appended in time order by [`Trajectory::push`]; each index is
/// written exactly once and never overwritten.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory<A> {
    times: Vec<f64>,
    orientations: Vec<A>,
}

impl<A: Algebra> Trajectory<A> {
    /// Create a trajectory on the grid [`time_grid`]`(step, last_time)` seeded with `initial`
    pub fn new(step: f64, last_time: f64, initial: A) -> Self {
        Trajectory::on_grid(time_grid(step, last_time), initial)
    }
    /// Create a trajectory on an explicit time grid seeded with `initial`
    pub fn on_grid(times: Vec<f64>, initial: A) -> Self {
        let mut orientations = Vec::with_capacity(times.len());
        orientations.push(initial);
        Trajectory { times, orientations }
    }
    /// Build a complete trajectory by evaluating `f` at every point of the grid
    pub fn sampled(step: f64, last_time: f64, f: impl Fn(f64) -> A) -> Self {
        let times = time_grid(step, last_time);
        let orientations = times.iter().map(|&t| f(t)).collect();
        Trajectory { times, orientations }
    }
    /// Number of grid points
    pub fn len(&self) -> usize {
        self.times.len()
    }
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
    /// Whether every grid point has an orientation
    pub fn is_complete(&self) -> bool {
        self.orientations.len() == self.times.len()
    }
    /// The time grid
    pub fn times(&self) -> &[f64] {
        &self.times
    }
    /// The orientations computed so far
    pub fn orientations(&self) -> &[A] {
        &self.orientations
    }
    /// Time of grid point `index`
    pub fn time(&self, index: usize) -> AttitudeResult<f64> {
        self.times.get(index).copied().ok_or(AttitudeError::InvalidIndex {
            index,
            len: self.times.len(),
        })
    }
    /// Orientation at grid point `index`
    pub fn orientation(&self, index: usize) -> AttitudeResult<A> {
        self.orientations.get(index).copied().ok_or(AttitudeError::InvalidIndex {
            index,
            len: self.orientations.len(),
        })
    }
    /// Write the orientation of the next grid point
    pub fn push(&mut self, orientation: A) -> AttitudeResult<()> {
        let index = self.orientations.len();
        if index >= self.times.len() {
            return Err(AttitudeError::InvalidIndex {
                index,
                len: self.times.len(),
            });
        }
        self.orientations.push(orientation);
        Ok(())
    }
    /// Iterate over `(time, orientation)` pairs computed so far
    pub fn iter(&self) -> impl Iterator<Item = (f64, &A)> {
        self.times.iter().copied().zip(self.orientations.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Quaternion;

    #[test]
    fn time_grid_size_and_bounds() {
        for (step, last_time) in [(0.1, 10.0), (0.3, 1.0), (0.1, 0.3), (0.25, 1.0), (0.07, 2.5)] {
            let grid = time_grid(step, last_time);
            let expected = ((last_time + EPSILON) / step).floor() as usize + 1;
            assert_eq!(grid.len(), expected, "step {step}, last time {last_time}");
            assert_eq!(grid[0], 0.0);
            assert!(grid.windows(2).all(|w| w[1] > w[0]));
            assert!(*grid.last().unwrap() <= last_time + EPSILON);
        }
        assert_eq!(time_grid(0.1, 10.0).len(), 101);
        assert_eq!(time_grid(0.1, 0.3).len(), 4);
    }
    #[test]
    fn time_grid_points_are_not_accumulated() {
        let grid = time_grid(0.1, 10.0);
        assert_approx_eq!(grid[100], 10.0, 1e-12);
        assert_approx_eq!(grid[37], 3.7, 1e-12);
    }
    #[test]
    fn time_grid_with_step_beyond_last_time() {
        assert_eq!(time_grid(5.0, 2.0), vec![0.0, 2.0]);
        assert_eq!(time_grid(2.0, 2.0), vec![0.0, 2.0]);
    }
    #[test]
    fn capability_require() {
        assert_eq!(Capability::Supported(3).require(RateKind::Integrated), Ok(3));
        assert_eq!(
            Capability::<i32>::Unsupported.require(RateKind::Instantaneous),
            Err(AttitudeError::Unsupported(RateKind::Instantaneous))
        );
        assert!(Capability::Supported(1.0).is_supported());
        assert!(!Capability::<f64>::Unsupported.is_supported());
    }
    #[test]
    fn trajectory_is_seeded_and_write_once() {
        let initial = Quaternion::new(0.5, 0.5, 0.5, 0.5);
        let mut trajectory = Trajectory::new(0.5, 1.0, initial);
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.orientations().len(), 1);
        assert_eq!(trajectory.orientation(0), Ok(initial));
        assert!(!trajectory.is_complete());
        assert_eq!(
            trajectory.orientation(1),
            Err(AttitudeError::InvalidIndex { index: 1, len: 1 })
        );
        trajectory.push(Quaternion::identity()).unwrap();
        trajectory.push(Quaternion::identity()).unwrap();
        assert!(trajectory.is_complete());
        assert_eq!(
            trajectory.push(Quaternion::identity()),
            Err(AttitudeError::InvalidIndex { index: 3, len: 3 })
        );
        assert_eq!(trajectory.time(2), Ok(1.0));
        assert!(trajectory.time(3).is_err());
        assert_eq!(trajectory.iter().count(), 3);
    }
    #[test]
    fn sampled_trajectory_is_complete() {
        let trajectory = Trajectory::sampled(0.25, 1.0, |t| Quaternion::from_real(t));
        assert!(trajectory.is_complete());
        assert_eq!(trajectory.orientation(4), Ok(Quaternion::from_real(1.0)));
    }
}
