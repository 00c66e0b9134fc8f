//! Artificial inputs.
//!
//! An artificial input is a closed-form orientation law from which both the algorithm input and the
//! ground truth are derived: the exact orientation at any time, the body angular rate at any time and
//! the angular rate integrated over any interval. Running an algorithm on such an input and
//! comparing against the exact solution is how the integration formulas are validated and ranked.
//!
//! The laws here describe the aircraft angles (heading, pitch, roll) as functions of time
//! ([`OrientationLaw`]); [`PlaneAnglesInput`] turns any such law into an [`ArtificialInput`]:
//! - the exact solution is the closed-form angle to quaternion conversion,
//! - the instantaneous rate follows from the kinematic relation [`body_rate`],
//! - the integrated rate is the instantaneous rate integrated by a [`Quadrature`] rule.
use std::rc::Rc;

use nalgebra::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::algebra::{AircraftAngles, body_rate};
use crate::algorithm::SourceRef;
use crate::error::{AttitudeError, AttitudeResult};
use crate::quadrature::{Quadrature, Simpson};
use crate::{Algebra, Capability, InputSource, Trajectory};

/// A synthetic input with a known exact solution
pub trait ArtificialInput {
    /// The algebra orientations are expressed in
    type Algebra: Algebra;
    /// The input data type produced for the algorithms
    type Input;

    /// Exact orientation at time `t`
    fn exact_solution(&self, t: f64) -> Self::Algebra;
    /// Angular rate at time `t`
    fn instantaneous(&self, _t: f64) -> Capability<Self::Input> {
        Capability::Unsupported
    }
    /// Angular rate integrated over `[t1, t2]`
    fn integrated(&self, _t1: f64, _t2: f64) -> Capability<Self::Input> {
        Capability::Unsupported
    }
    /// The exact solution sampled on the grid [`time_grid`](crate::time_grid)`(step, last_time)`
    fn exact_trajectory(&self, step: f64, last_time: f64) -> AttitudeResult<Trajectory<Self::Algebra>> {
        if !(step > 0.0 && last_time > 0.0) {
            return Err(AttitudeError::configuration(format!(
                "exact solution needs a positive step and last time, got {step} and {last_time}"
            )));
        }
        Ok(Trajectory::sampled(step, last_time, |t| self.exact_solution(t)))
    }
}

/// Adapter exposing an [`ArtificialInput`] as an algorithm [`InputSource`]
#[derive(Debug)]
pub struct ArtificialSource<G>(pub Rc<G>);

impl<G: ArtificialInput> InputSource for ArtificialSource<G> {
    type Algebra = G::Algebra;
    type Input = G::Input;

    fn initial_solution(&self) -> G::Algebra {
        self.0.exact_solution(0.0)
    }
    fn instantaneous(&self, t: f64) -> Capability<G::Input> {
        self.0.instantaneous(t)
    }
    fn integrated(&self, t1: f64, t2: f64) -> Capability<G::Input> {
        self.0.integrated(t1, t2)
    }
}

/// Share an artificial input with an algorithm
pub fn input_source<G: ArtificialInput + 'static>(generator: &Rc<G>) -> SourceRef<G::Algebra, G::Input> {
    Rc::new(ArtificialSource(Rc::clone(generator)))
}

/// Aircraft angles as a function of time
pub trait OrientationLaw {
    /// The angles at time `t`
    fn angles(&self, t: f64) -> AircraftAngles;
    /// Time derivative of the angles at time `t`
    fn angle_rates(&self, t: f64) -> AircraftAngles;
}

/// Independent harmonic oscillation of each angle: `amplitude * sin(frequency * t + shift)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonicAngles {
    pub amplitude: AircraftAngles,
    pub frequency: AircraftAngles,
    pub shift: AircraftAngles,
}
impl HarmonicAngles {
    pub fn new(amplitude: AircraftAngles, frequency: AircraftAngles, shift: AircraftAngles) -> Self {
        HarmonicAngles {
            amplitude,
            frequency,
            shift,
        }
    }
    fn phase(&self, t: f64) -> AircraftAngles {
        self.frequency * t + self.shift
    }
}
impl Default for HarmonicAngles {
    fn default() -> Self {
        HarmonicAngles::new(
            AircraftAngles::new(0.1, 0.2, 0.3),
            AircraftAngles::new(1.0, 2.0, 3.0),
            AircraftAngles::default(),
        )
    }
}
impl OrientationLaw for HarmonicAngles {
    fn angles(&self, t: f64) -> AircraftAngles {
        self.amplitude.component_mul(&self.phase(t).sin())
    }
    fn angle_rates(&self, t: f64) -> AircraftAngles {
        self.amplitude
            .component_mul(&self.frequency)
            .component_mul(&self.phase(t).cos())
    }
}

/// Angles changing at constant rates: `initial + rate * t`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearAngles {
    pub initial: AircraftAngles,
    pub rate: AircraftAngles,
}
impl LinearAngles {
    pub fn new(initial: AircraftAngles, rate: AircraftAngles) -> Self {
        LinearAngles { initial, rate }
    }
}
impl OrientationLaw for LinearAngles {
    fn angles(&self, t: f64) -> AircraftAngles {
        self.initial + self.rate * t
    }
    fn angle_rates(&self, _t: f64) -> AircraftAngles {
        self.rate
    }
}

/// Artificial quaternion input driven by an aircraft-angle law.
///
/// # Example
/// ```rust
/// use attitude::artificial::{ArtificialInput, HarmonicAngles, PlaneAnglesInput};
/// let input = PlaneAnglesInput::new(HarmonicAngles::default());
/// let exact = input.exact_trajectory(0.5, 2.0).unwrap();
/// assert_eq!(exact.len(), 5);
/// assert!(input.integrated(0.0, 0.5).is_supported());
/// ```
#[derive(Clone, Debug)]
pub struct PlaneAnglesInput<L, Q = Simpson> {
    law: L,
    integrator: Q,
}

impl<L: OrientationLaw> PlaneAnglesInput<L> {
    /// Integrate the angular rate with [`Simpson::default`]
    pub fn new(law: L) -> Self {
        PlaneAnglesInput::with_integrator(law, Simpson::default())
    }
}

impl<L: OrientationLaw, Q: Quadrature<Vector3<f64>>> PlaneAnglesInput<L, Q> {
    pub fn with_integrator(law: L, integrator: Q) -> Self {
        PlaneAnglesInput { law, integrator }
    }
    pub fn law(&self) -> &L {
        &self.law
    }
    pub fn integrator(&self) -> &Q {
        &self.integrator
    }
    /// Body angular rate at time `t`
    pub fn angular_rate(&self, t: f64) -> Vector3<f64> {
        body_rate(&self.law.angles(t), &self.law.angle_rates(t))
    }
}

impl<L: OrientationLaw, Q: Quadrature<Vector3<f64>>> ArtificialInput for PlaneAnglesInput<L, Q> {
    type Algebra = Quaternion<f64>;
    type Input = Vector3<f64>;

    fn exact_solution(&self, t: f64) -> Quaternion<f64> {
        self.law.angles(t).to_quaternion()
    }
    fn instantaneous(&self, t: f64) -> Capability<Vector3<f64>> {
        Capability::Supported(self.angular_rate(t))
    }
    fn integrated(&self, t1: f64, t2: f64) -> Capability<Vector3<f64>> {
        Capability::Supported(self.integrator.integrate(&|t| self.angular_rate(t), t1, t2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::pure_quaternion;
    use crate::error::RateKind;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn exact_solution_obeys_the_kinematic_equation() {
        // dλ/dt = λ ∘ ω / 2
        let input = PlaneAnglesInput::new(HarmonicAngles::default());
        let h = 1e-5;
        for t in [0.0, 0.37, 1.2, 4.9] {
            let derivative = (input.exact_solution(t + h) - input.exact_solution(t - h)) * (0.5 / h);
            let expected = input.exact_solution(t) * pure_quaternion(&input.angular_rate(t)) * 0.5;
            for (a, b) in derivative.coords.iter().zip(expected.coords.iter()) {
                assert_approx_eq!(*a, *b, 1e-8);
            }
        }
    }
    #[test]
    fn harmonic_law_starts_level() {
        let law = HarmonicAngles::default();
        assert_eq!(law.angles(0.0), AircraftAngles::default());
        let rates = law.angle_rates(0.0);
        assert_approx_eq!(rates.heading, 0.1, 1e-15);
        assert_approx_eq!(rates.pitch, 0.4, 1e-15);
        assert_approx_eq!(rates.roll, 0.9, 1e-15);
        let shifted = HarmonicAngles::new(
            AircraftAngles::new(1.0, 1.0, 1.0),
            AircraftAngles::new(1.0, 1.0, 1.0),
            AircraftAngles::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0),
        );
        assert_approx_eq!(shifted.angles(0.0).heading, 1.0, 1e-15);
    }
    #[test]
    fn integrated_rate_of_a_single_axis_law() {
        let law = LinearAngles::new(AircraftAngles::default(), AircraftAngles::new(0.0, 0.0, 0.3));
        let input = PlaneAnglesInput::new(law);
        match input.integrated(0.5, 2.5) {
            Capability::Supported(gamma) => {
                assert_approx_eq!(gamma[0], 0.6, 1e-12);
                assert_approx_eq!(gamma[1], 0.0, 1e-15);
                assert_approx_eq!(gamma[2], 0.0, 1e-15);
            }
            Capability::Unsupported => panic!("integrated rate must be supported"),
        }
    }
    #[test]
    fn integrated_rate_matches_quadrature_of_instantaneous_rate() {
        let input = PlaneAnglesInput::with_integrator(HarmonicAngles::default(), Simpson::new(1e-3));
        let coarse = input.integrated(1.0, 1.1).require(RateKind::Integrated).unwrap();
        let fine = PlaneAnglesInput::new(HarmonicAngles::default())
            .integrated(1.0, 1.1)
            .require(RateKind::Integrated)
            .unwrap();
        assert!((coarse - fine).norm() < 1e-12);
        let rate = input.instantaneous(1.05).require(RateKind::Instantaneous).unwrap();
        assert!((fine / 0.1 - rate).norm() < 1e-2);
    }
    #[test]
    fn source_adapter_forwards_the_generator() {
        let generator = Rc::new(PlaneAnglesInput::new(HarmonicAngles::default()));
        let source = input_source(&generator);
        assert_eq!(source.initial_solution(), Quaternion::identity());
        assert_eq!(source.integrated(0.0, 0.1), generator.integrated(0.0, 0.1));
        assert_eq!(source.instantaneous(0.3), generator.instantaneous(0.3));
    }
    #[test]
    fn exact_trajectory_needs_positive_grid() {
        let input = PlaneAnglesInput::new(LinearAngles::default());
        assert!(matches!(
            input.exact_trajectory(0.0, 1.0),
            Err(AttitudeError::Configuration(_))
        ));
        assert!(matches!(
            input.exact_trajectory(0.1, -1.0),
            Err(AttitudeError::Configuration(_))
        ));
        let trajectory = input.exact_trajectory(0.1, 1.0).unwrap();
        assert!(trajectory.is_complete());
        assert_eq!(trajectory.len(), 11);
    }
}
