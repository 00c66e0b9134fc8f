//! The iterative multi-step engine.
//!
//! Every integration method in this crate follows the same recurrence: the orientation at grid point
//! `i` is the orientation at `i - 1` composed on the right with a locally computed increment,
//!
//! $$
//! \lambda_i = \lambda_{i-1} \circ \Lambda_i
//! $$
//!
//! A method only supplies the local solution ([`LocalSolution`]); [`Iterative`] drives the loop,
//! fetches the integrated angular-rate segments the method needs and performs the composition.
//!
//! Methods that consume more than one input segment per output step (`K > 1`) declare how their
//! segments are collected with a [`Window`].
use std::collections::VecDeque;
use std::fmt;

use log::{debug, trace};

use crate::algorithm::{Algorithm, AlgorithmConfig};
use crate::error::{AttitudeError, AttitudeResult, RateKind};
use crate::{Algebra, Trajectory};

/// How a multi-step method collects its `K` input segments for one output step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    /// `K` equal sub-intervals of the current output interval
    Subdivided,
    /// The integrated rates of the `K` most recent output intervals, oldest first
    History,
}
impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Subdivided => write!(f, "subdivided"),
            Window::History => write!(f, "history"),
        }
    }
}

/// A local solver: maps the input segments of one output step to an orientation increment.
pub trait LocalSolution {
    /// The algebra the increment is expressed in
    type Algebra: Algebra;
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
    /// Orientation increment for the output interval ending at `t`.
    ///
    /// `segments` are ordered oldest to newest and hold exactly [`LocalSolution::steps_count`]
    /// elements.
    fn local_solution(&self, t: f64, segments: &[Self::Segment]) -> AttitudeResult<Self::Algebra>;
    /// Increment used by a [`Window::History`] method while fewer than `K` segments are known.
    fn warm_up_solution(&self, _t: f64, segments: &[Self::Segment]) -> AttitudeResult<Self::Algebra> {
        Err(AttitudeError::configuration(format!(
            "{} has no warm-up formula for {} of {} segments",
            self.title(),
            segments.len(),
            self.steps_count()
        )))
    }
}

/// The last `N` segments of a window as an array, oldest first.
///
/// Fails with [`AttitudeError::InvalidIndex`] when fewer than `N` segments are available.
pub fn last_segments<T: Copy, const N: usize>(segments: &[T]) -> AttitudeResult<[T; N]> {
    let len = segments.len();
    if len < N {
        return Err(AttitudeError::InvalidIndex { index: len, len });
    }
    <[T; N]>::try_from(&segments[len - N..]).map_err(|_| AttitudeError::InvalidIndex { index: len, len })
}

/// Algorithm built from a [`LocalSolution`] by the step-by-step recurrence.
///
/// # Example
/// ```rust
/// use std::rc::Rc;
/// use nalgebra::{Quaternion, Vector3};
/// use attitude::algorithm::Algorithm;
/// use attitude::iterative::Iterative;
/// use attitude::methods::AverageSpeed;
/// use attitude::{Capability, InputSource};
///
/// struct Spin;
/// impl InputSource for Spin {
///     type Algebra = Quaternion<f64>;
///     type Input = Vector3<f64>;
///     fn initial_solution(&self) -> Quaternion<f64> {
///         Quaternion::identity()
///     }
///     fn integrated(&self, t1: f64, t2: f64) -> Capability<Vector3<f64>> {
///         Capability::Supported(Vector3::new(0.0, 0.0, t2 - t1))
///     }
/// }
///
/// let mut algorithm = Iterative::new(AverageSpeed);
/// algorithm.set_input_data(Rc::new(Spin));
/// algorithm.set_step(0.5);
/// algorithm.set_last_time(2.0);
/// let trajectory = algorithm.execute().unwrap();
/// let last = trajectory.orientation(4).unwrap();
/// assert!((last.w - 1.0_f64.cos()).abs() < 1e-12);
/// assert!((last.k - 1.0_f64.sin()).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct Iterative<F: LocalSolution> {
    config: AlgorithmConfig<F::Algebra, F::Segment>,
    formula: F,
}

impl<F: LocalSolution> Iterative<F> {
    pub fn new(formula: F) -> Self {
        Iterative {
            config: AlgorithmConfig::default(),
            formula,
        }
    }
    /// The local solver driving this algorithm
    pub fn formula(&self) -> &F {
        &self.formula
    }
}

impl<F: LocalSolution> Algorithm for Iterative<F> {
    type Algebra = F::Algebra;
    type Input = F::Segment;

    fn config(&self) -> &AlgorithmConfig<F::Algebra, F::Segment> {
        &self.config
    }
    fn config_mut(&mut self) -> &mut AlgorithmConfig<F::Algebra, F::Segment> {
        &mut self.config
    }
    fn title(&self) -> String {
        self.formula.title()
    }
    fn execute(&self) -> AttitudeResult<Trajectory<F::Algebra>> {
        let (mut trajectory, source) = self.config.initialize_trajectory()?;
        let steps_count = self.formula.steps_count().max(1);
        let window = self.formula.window();
        debug!(
            "Running {} (K = {}, {} window) over {} grid points",
            self.formula.title(),
            steps_count,
            window,
            trajectory.len()
        );
        let mut segments: Vec<F::Segment> = Vec::with_capacity(steps_count);
        let mut history: VecDeque<F::Segment> = VecDeque::with_capacity(steps_count);
        for i in 1..trajectory.len() {
            let start = trajectory.time(i - 1)?;
            let end = trajectory.time(i)?;
            let increment = match window {
                Window::Subdivided => {
                    segments.clear();
                    let width = (end - start) / steps_count as f64;
                    for j in 0..steps_count {
                        let lower = start + width * j as f64;
                        let upper = if j + 1 == steps_count {
                            end
                        } else {
                            start + width * (j + 1) as f64
                        };
                        segments.push(source.integrated(lower, upper).require(RateKind::Integrated)?);
                    }
                    self.formula.local_solution(end, &segments)?
                }
                Window::History => {
                    if history.len() == steps_count {
                        history.pop_front();
                    }
                    history.push_back(source.integrated(start, end).require(RateKind::Integrated)?);
                    let recent = history.make_contiguous();
                    if recent.len() < steps_count {
                        self.formula.warm_up_solution(end, recent)?
                    } else {
                        self.formula.local_solution(end, recent)?
                    }
                }
            };
            let previous = trajectory.orientation(i - 1)?;
            let current = previous * increment;
            trace!("t = {end}: increment {increment:?}, orientation {current:?}");
            trajectory.push(current)?;
        }
        Ok(trajectory)
    }
}
