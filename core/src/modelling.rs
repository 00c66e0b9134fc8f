//! Error-analysis harness.
//!
//! [`Modelling`] runs one configured algorithm against one artificial input and compares the
//! algorithm's trajectory against the exact solution sampled on the same time grid. The maximum
//! pointwise difference is the single number used to compare methods across step sizes; a
//! [`Modelling::convergence_study`] repeats the run for a list of steps and estimates the observed
//! accuracy order from consecutive errors.
use std::fmt;
use std::io;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};
use nalgebra::Quaternion;
use serde::{Deserialize, Serialize};

use crate::algebra::AircraftAngles;
use crate::algorithm::Algorithm;
use crate::artificial::{ArtificialInput, input_source};
use crate::error::{AttitudeError, AttitudeResult};
use crate::{Algebra, Trajectory};

/// Outcome of one modelling run
#[derive(Clone, Debug, PartialEq)]
pub struct ModellingResult<A> {
    algorithm_title: String,
    step: f64,
    algorithm_output: Trajectory<A>,
    exact_solution: Trajectory<A>,
    differences: Vec<f64>,
    max_difference: f64,
}

impl<A: Algebra> ModellingResult<A> {
    /// Compare an algorithm trajectory against the exact solution on the same grid.
    ///
    /// Both trajectories must be complete and of equal length.
    pub fn new(
        algorithm_title: String,
        step: f64,
        algorithm_output: Trajectory<A>,
        exact_solution: Trajectory<A>,
    ) -> AttitudeResult<Self> {
        let len = exact_solution.len();
        if !exact_solution.is_complete() {
            return Err(AttitudeError::InvalidIndex {
                index: exact_solution.orientations().len(),
                len,
            });
        }
        if algorithm_output.len() != len || !algorithm_output.is_complete() {
            return Err(AttitudeError::InvalidIndex {
                index: algorithm_output.orientations().len(),
                len,
            });
        }
        let differences: Vec<f64> = algorithm_output
            .orientations()
            .iter()
            .zip(exact_solution.orientations())
            .map(|(computed, exact)| computed.distance(exact))
            .collect();
        let max_difference = differences.iter().copied().fold(0.0, f64::max);
        Ok(ModellingResult {
            algorithm_title,
            step,
            algorithm_output,
            exact_solution,
            differences,
            max_difference,
        })
    }
    pub fn algorithm_title(&self) -> &str {
        &self.algorithm_title
    }
    /// Output step of the run
    pub fn step(&self) -> f64 {
        self.step
    }
    pub fn algorithm_output(&self) -> &Trajectory<A> {
        &self.algorithm_output
    }
    pub fn exact_solution(&self) -> &Trajectory<A> {
        &self.exact_solution
    }
    /// Distance between the computed and the exact orientation at every grid point
    pub fn differences(&self) -> &[f64] {
        &self.differences
    }
    pub fn max_difference(&self) -> f64 {
        self.max_difference
    }
    pub fn len(&self) -> usize {
        self.differences.len()
    }
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }
}

impl<A> fmt::Display for ModellingResult<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: step {}, max difference {:.6e}",
            self.algorithm_title, self.step, self.max_difference
        )
    }
}

/// One row of a convergence study
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub step: f64,
    pub max_difference: f64,
    /// `ln(e_prev / e) / ln(h_prev / h)` against the previous row; absent for the first row
    pub observed_order: Option<f64>,
}

/// Runs algorithms against an artificial input
#[derive(Debug)]
pub struct Modelling<G> {
    data: Option<Rc<G>>,
}

impl<G> Default for Modelling<G> {
    fn default() -> Self {
        Modelling { data: None }
    }
}

impl<G: ArtificialInput + 'static> Modelling<G> {
    pub fn new() -> Self {
        Modelling::default()
    }
    /// Harness already bound to an artificial input
    pub fn with_data(generator: G) -> Self {
        Modelling {
            data: Some(Rc::new(generator)),
        }
    }
    /// Assign the artificial input. Mandatory before [`Modelling::run`].
    pub fn set_data(&mut self, generator: Rc<G>) {
        self.data = Some(generator);
    }
    pub fn data(&self) -> Option<&Rc<G>> {
        self.data.as_ref()
    }

    /// Run `algorithm` on the artificial input and compare it against the exact solution.
    ///
    /// The algorithm's step and last time must already be set; its input source is replaced by
    /// the artificial input.
    pub fn run<A>(&self, algorithm: &mut A) -> AttitudeResult<ModellingResult<G::Algebra>>
    where
        A: Algorithm<Algebra = G::Algebra, Input = G::Input> + ?Sized,
    {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| AttitudeError::configuration("artificial input is not set"))?;
        algorithm.set_input_data(input_source(data));
        let (step, last_time) = algorithm.config().validate()?;
        debug!("Modelling {} with step {} up to {}", algorithm.title(), step, last_time);
        let output = algorithm.execute()?;
        let exact = data.exact_trajectory(step, last_time)?;
        let result = ModellingResult::new(algorithm.title(), step, output, exact)?;
        info!("{result}");
        Ok(result)
    }

    /// Run `algorithm` once per step and estimate the observed accuracy order.
    ///
    /// The algorithm's last time must already be set; its step is overwritten.
    pub fn convergence_study<A>(&self, algorithm: &mut A, steps: &[f64]) -> AttitudeResult<Vec<ConvergencePoint>>
    where
        A: Algorithm<Algebra = G::Algebra, Input = G::Input> + ?Sized,
    {
        let mut points: Vec<ConvergencePoint> = Vec::with_capacity(steps.len());
        for &step in steps {
            algorithm.set_step(step);
            let max_difference = self.run(&mut *algorithm)?.max_difference();
            let observed_order = points
                .last()
                .map(|previous| (previous.max_difference / max_difference).ln() / (previous.step / step).ln());
            points.push(ConvergencePoint {
                step,
                max_difference,
                observed_order,
            });
        }
        Ok(points)
    }
}

#[derive(Debug, Serialize)]
struct TrajectoryRecord {
    time: f64,
    w: f64,
    x: f64,
    y: f64,
    z: f64,
    heading: f64,
    pitch: f64,
    roll: f64,
}
impl TrajectoryRecord {
    fn new(time: f64, q: &Quaternion<f64>) -> Self {
        let angles = AircraftAngles::from_quaternion(q);
        TrajectoryRecord {
            time,
            w: q.w,
            x: q.i,
            y: q.j,
            z: q.k,
            heading: angles.heading,
            pitch: angles.pitch,
            roll: angles.roll,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultRecord {
    time: f64,
    w: f64,
    x: f64,
    y: f64,
    z: f64,
    exact_w: f64,
    exact_x: f64,
    exact_y: f64,
    exact_z: f64,
    difference: f64,
}

impl Trajectory<Quaternion<f64>> {
    /// Write the trajectory to a CSV file.
    ///
    /// One row per computed grid point: time, quaternion components `w, x, y, z` and the
    /// corresponding aircraft angles in radians.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (time, q) in self.iter() {
            writer.serialize(TrajectoryRecord::new(time, q))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ModellingResult<Quaternion<f64>> {
    /// Write the computed and exact solutions with their pointwise difference to a CSV file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let rows = self
            .algorithm_output
            .iter()
            .zip(self.exact_solution.orientations())
            .zip(&self.differences);
        for (((time, q), exact), &difference) in rows {
            writer.serialize(ResultRecord {
                time,
                w: q.w,
                x: q.i,
                y: q.j,
                z: q.k,
                exact_w: exact.w,
                exact_x: exact.i,
                exact_y: exact.j,
                exact_z: exact.k,
                difference,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capability;
    use crate::artificial::{HarmonicAngles, LinearAngles, PlaneAnglesInput};
    use crate::error::RateKind;
    use crate::iterative::Iterative;
    use crate::methods::{AverageSpeed, Method};
    use nalgebra::Vector3;

    /// Exact solution only; cannot feed an algorithm
    struct Still;
    impl ArtificialInput for Still {
        type Algebra = Quaternion<f64>;
        type Input = Vector3<f64>;
        fn exact_solution(&self, _t: f64) -> Quaternion<f64> {
            Quaternion::identity()
        }
    }

    fn configured(step: f64, last_time: f64) -> Iterative<AverageSpeed> {
        let mut algorithm = Iterative::new(AverageSpeed);
        algorithm.set_step(step);
        algorithm.set_last_time(last_time);
        algorithm
    }

    #[test]
    fn run_without_data_is_a_configuration_error() {
        let modelling: Modelling<PlaneAnglesInput<HarmonicAngles>> = Modelling::new();
        let result = modelling.run(&mut configured(0.1, 1.0));
        assert!(matches!(result, Err(AttitudeError::Configuration(_))));
    }
    #[test]
    fn run_with_unsupported_input_fails() {
        let modelling = Modelling::with_data(Still);
        let result = modelling.run(&mut configured(0.1, 1.0));
        assert_eq!(result, Err(AttitudeError::Unsupported(RateKind::Integrated)));
        assert_eq!(Still.integrated(0.0, 1.0), Capability::Unsupported);
    }
    #[test]
    fn result_bundle_is_consistent() {
        let modelling = Modelling::with_data(PlaneAnglesInput::new(HarmonicAngles::default()));
        let result = modelling.run(&mut configured(0.1, 2.0)).unwrap();
        assert_eq!(result.len(), 21);
        assert_eq!(result.algorithm_output().len(), result.exact_solution().len());
        assert_eq!(result.algorithm_output().times(), result.exact_solution().times());
        assert_eq!(result.differences()[0], 0.0);
        let max = result.differences().iter().copied().fold(f64::MIN, f64::max);
        assert_eq!(result.max_difference(), max);
        assert!(result.max_difference() > 0.0 && result.max_difference() < 1e-2);
        assert_eq!(result.algorithm_title(), Method::AverageSpeed.title());
        assert!(result.to_string().starts_with("Average speed method"));
    }
    #[test]
    fn mismatched_trajectories_are_rejected() {
        let short = Trajectory::sampled(0.5, 1.0, |_| Quaternion::identity());
        let long = Trajectory::sampled(0.25, 1.0, |_| Quaternion::identity());
        let result = ModellingResult::new("mismatch".to_string(), 0.25, short, long);
        assert_eq!(result, Err(AttitudeError::InvalidIndex { index: 3, len: 5 }));
    }
    #[test]
    fn single_axis_rotation_is_integrated_exactly() {
        let law = LinearAngles::new(AircraftAngles::default(), AircraftAngles::new(0.0, 0.0, 0.8));
        let modelling = Modelling::with_data(PlaneAnglesInput::new(law));
        let points = modelling
            .convergence_study(&mut configured(0.5, 4.0), &[0.5, 0.25])
            .unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].observed_order.is_none());
        for point in points {
            assert!(point.max_difference < 1e-12, "{point:?}");
        }
    }
    #[test]
    fn boxed_algorithms_can_be_modelled() {
        let mut modelling = Modelling::new();
        modelling.set_data(Rc::new(PlaneAnglesInput::new(HarmonicAngles::default())));
        let mut algorithm = Method::Panov.algorithm();
        algorithm.set_step(0.25);
        algorithm.set_last_time(1.0);
        let result = modelling.run(algorithm.as_mut()).unwrap();
        assert_eq!(result.len(), 5);
        assert!(result.max_difference() < 1e-6);
    }
    #[test]
    fn results_are_written_to_csv() {
        let modelling = Modelling::with_data(PlaneAnglesInput::new(HarmonicAngles::default()));
        let result = modelling.run(&mut configured(0.25, 1.0)).unwrap();

        let result_path = std::env::temp_dir().join("attitude_result_test.csv");
        result.to_csv(&result_path).expect("Failed to write CSV");
        let contents = std::fs::read_to_string(&result_path).expect("Failed to read CSV");
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("time,w,x,y,z,exact_w,exact_x,exact_y,exact_z,difference")
        );
        assert_eq!(lines.count(), 5);
        let _ = std::fs::remove_file(&result_path);

        let trajectory_path = std::env::temp_dir().join("attitude_trajectory_test.csv");
        result
            .exact_solution()
            .to_csv(&trajectory_path)
            .expect("Failed to write CSV");
        let contents = std::fs::read_to_string(&trajectory_path).expect("Failed to read CSV");
        assert!(contents.starts_with("time,w,x,y,z,heading,pitch,roll\n"));
        assert_eq!(contents.lines().count(), 6);
        let _ = std::fs::remove_file(&trajectory_path);
    }
}
