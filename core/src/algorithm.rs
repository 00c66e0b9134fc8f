//! The algorithm contract.
//!
//! An algorithm turns input data into an orientation trajectory. Before [`Algorithm::execute`] may be
//! called, three settings are mandatory: the input source, the output step and the last time. The
//! algorithm then produces solutions at `0, step, 2 step, ..., last_time`.

use std::fmt;
use std::rc::Rc;

use crate::error::{AttitudeError, AttitudeResult};
use crate::{Algebra, InputSource, Trajectory};

/// Shared handle to an input source with the given algebra and input types
pub type SourceRef<A, I> = Rc<dyn InputSource<Algebra = A, Input = I>>;

/// Settings every algorithm needs before it can run
pub struct AlgorithmConfig<A, I> {
    source: Option<SourceRef<A, I>>,
    step: Option<f64>,
    last_time: Option<f64>,
}

impl<A, I> Default for AlgorithmConfig<A, I> {
    fn default() -> Self {
        AlgorithmConfig {
            source: None,
            step: None,
            last_time: None,
        }
    }
}

impl<A, I> fmt::Debug for AlgorithmConfig<A, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmConfig")
            .field("source", &self.source.as_ref().map(|_| "<input source>"))
            .field("step", &self.step)
            .field("last_time", &self.last_time)
            .finish()
    }
}

impl<A: Algebra, I> AlgorithmConfig<A, I> {
    pub fn set_source(&mut self, source: SourceRef<A, I>) {
        self.source = Some(source);
    }
    pub fn set_step(&mut self, step: f64) {
        self.step = Some(step);
    }
    pub fn set_last_time(&mut self, last_time: f64) {
        self.last_time = Some(last_time);
    }
    pub fn step(&self) -> Option<f64> {
        self.step
    }
    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }
    pub fn source(&self) -> Option<&SourceRef<A, I>> {
        self.source.as_ref()
    }
    /// Check the mandatory settings and return `(step, last_time)`
    pub fn validate(&self) -> AttitudeResult<(f64, f64)> {
        let step = match self.step {
            Some(step) if step > 0.0 => step,
            Some(step) => {
                return Err(AttitudeError::configuration(format!(
                    "step must be positive, got {step}"
                )));
            }
            None => return Err(AttitudeError::configuration("step is not set")),
        };
        let last_time = match self.last_time {
            Some(last_time) if last_time > 0.0 => last_time,
            Some(last_time) => {
                return Err(AttitudeError::configuration(format!(
                    "last time must be positive, got {last_time}"
                )));
            }
            None => return Err(AttitudeError::configuration("last time is not set")),
        };
        Ok((step, last_time))
    }
    /// Build the output trajectory for a run: the time grid for the configured step and last time,
    /// seeded with the input source's initial solution.
    ///
    /// Every algorithm calls this before filling in the remaining grid points. The source is
    /// returned alongside so the caller can query it for input data.
    pub fn initialize_trajectory(&self) -> AttitudeResult<(Trajectory<A>, SourceRef<A, I>)> {
        let (step, last_time) = self.validate()?;
        let source = self
            .source
            .clone()
            .ok_or_else(|| AttitudeError::configuration("input source is not set"))?;
        let trajectory = Trajectory::new(step, last_time, source.initial_solution());
        Ok((trajectory, source))
    }
}

/// An orientation integration method.
///
/// Implementors only provide access to their [`AlgorithmConfig`], a title and
/// [`Algorithm::execute`]; the configuration setters are shared.
pub trait Algorithm {
    /// The algebra orientations are expressed in
    type Algebra: Algebra;
    /// The input data type consumed by the method
    type Input;

    fn config(&self) -> &AlgorithmConfig<Self::Algebra, Self::Input>;
    fn config_mut(&mut self) -> &mut AlgorithmConfig<Self::Algebra, Self::Input>;

    /// Human readable name of the method (used for reporting only)
    fn title(&self) -> String;

    /// Run the algorithm over the configured time grid
    fn execute(&self) -> AttitudeResult<Trajectory<Self::Algebra>>;

    /// Assign the input source. Mandatory before [`Algorithm::execute`].
    fn set_input_data(&mut self, source: SourceRef<Self::Algebra, Self::Input>) {
        self.config_mut().set_source(source);
    }
    /// Assign the output step. Mandatory before [`Algorithm::execute`].
    fn set_step(&mut self, step: f64) {
        self.config_mut().set_step(step);
    }
    /// Assign the last output time. Mandatory before [`Algorithm::execute`].
    fn set_last_time(&mut self, last_time: f64) {
        self.config_mut().set_last_time(last_time);
    }
    fn step(&self) -> Option<f64> {
        self.config().step()
    }
    fn last_time(&self) -> Option<f64> {
        self.config().last_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Quaternion, Vector3};

    struct Fixed(Quaternion<f64>);
    impl InputSource for Fixed {
        type Algebra = Quaternion<f64>;
        type Input = Vector3<f64>;
        fn initial_solution(&self) -> Quaternion<f64> {
            self.0
        }
    }

    fn configured(step: Option<f64>, last_time: Option<f64>) -> AlgorithmConfig<Quaternion<f64>, Vector3<f64>> {
        let mut config = AlgorithmConfig::default();
        config.set_source(Rc::new(Fixed(Quaternion::new(0.0, 1.0, 0.0, 0.0))));
        if let Some(step) = step {
            config.set_step(step);
        }
        if let Some(last_time) = last_time {
            config.set_last_time(last_time);
        }
        config
    }

    #[test]
    fn missing_or_invalid_settings_are_configuration_errors() {
        for (step, last_time) in [
            (None, Some(1.0)),
            (Some(0.1), None),
            (Some(0.0), Some(1.0)),
            (Some(-0.1), Some(1.0)),
            (Some(0.1), Some(0.0)),
            (Some(f64::NAN), Some(1.0)),
        ] {
            let config = configured(step, last_time);
            match config.initialize_trajectory() {
                Err(AttitudeError::Configuration(_)) => {}
                other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
            }
        }
    }
    #[test]
    fn missing_source_is_a_configuration_error() {
        let mut config: AlgorithmConfig<Quaternion<f64>, Vector3<f64>> = AlgorithmConfig::default();
        config.set_step(0.1);
        config.set_last_time(1.0);
        assert!(matches!(
            config.initialize_trajectory(),
            Err(AttitudeError::Configuration(_))
        ));
    }
    #[test]
    fn trajectory_is_seeded_with_initial_solution() {
        let config = configured(Some(0.25), Some(1.0));
        let (trajectory, _) = config.initialize_trajectory().unwrap();
        assert_eq!(trajectory.len(), 5);
        assert_eq!(trajectory.orientations(), &[Quaternion::new(0.0, 1.0, 0.0, 0.0)]);
        assert_eq!(config.validate(), Ok((0.25, 1.0)));
    }
}
