//! Concrete integration formulas.
//!
//! Each formula maps the integrated angular rates `γ` of one output step to an orientation increment,
//! either directly ([`LocalSolution`]) or through the Riccati variable ([`RiccatiSolution`]). All
//! formulas consume [`Vector3<f64>`] segments and produce [`Quaternion<f64>`] increments.
//!
//! | Formula | K | Window | Order |
//! |---|---|---|---|
//! | [`AverageSpeed`] | 1 | subdivided | 2 |
//! | [`AverageSpeedRiccati`] | 1 | subdivided | 2 |
//! | [`AutoGeneratedTwoStep`] | 2 | history | 2 (observed) |
//! | [`TwoStepFourthDegree`] | 2 | subdivided | 4 |
//! | [`TwoStepFourthDegreeRiccati`] | 2 | subdivided | 4 |
//! | [`TwoStepFourthDegreeRiccatiAlt`] | 2 | subdivided | 4 |
//! | [`Panov`] | 4 | subdivided | 6 |
//! | [`PanovFourthDegree`] | 4 | subdivided | 4 |
//! | [`PanovRiccati`] | 4 | subdivided | 6 |
//!
//! The [`Method`] enumeration catalogues them for the command line and configuration files.
use nalgebra::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::algebra::{pure_quaternion, skew_symmetric};
use crate::algorithm::Algorithm;
use crate::error::AttitudeResult;
use crate::iterative::{Iterative, LocalSolution, Window, last_segments};
use crate::riccati::{Riccati, RiccatiSolution};

/// Threshold below which a rotation vector is treated as zero
const SMALL_ANGLE: f64 = 1e-12;

/// Rotation about the axis of `φ` by the angle `|φ|`: `(cos(|φ|/2), φ/|φ| sin(|φ|/2))`
pub fn rotation_increment(phi: &Vector3<f64>) -> Quaternion<f64> {
    let angle = phi.norm();
    if angle < SMALL_ANGLE {
        return Quaternion::from_parts(1.0, phi * 0.5);
    }
    let (sin, cos) = (angle / 2.0).sin_cos();
    Quaternion::from_parts(cos, phi * (sin / angle))
}

/// Riccati variable of the rotation about the axis of `φ` by `|φ|`: `φ/|φ| tan(|φ|/4)`
pub fn rotation_riccati(phi: &Vector3<f64>) -> Vector3<f64> {
    let angle = phi.norm();
    if angle < SMALL_ANGLE {
        return phi / 4.0;
    }
    phi * ((angle / 4.0).tan() / angle)
}

/// The average-speed method: the whole step is a rotation about the mean angular rate
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AverageSpeed;
impl LocalSolution for AverageSpeed {
    type Algebra = Quaternion<f64>;
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Average speed method (1-step, 2nd order, integrated input)".to_string()
    }
    fn local_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Quaternion<f64>> {
        let [phi] = last_segments::<_, 1>(segments)?;
        Ok(rotation_increment(&phi))
    }
}

/// The average-speed method expressed in the Riccati variable
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AverageSpeedRiccati;
impl RiccatiSolution for AverageSpeedRiccati {
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Average speed method, Riccati form (1-step, 2nd order, integrated input)".to_string()
    }
    fn local_riccati_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Vector3<f64>> {
        let [phi] = last_segments::<_, 1>(segments)?;
        Ok(rotation_riccati(&phi))
    }
}

/// Two-step method built from the full-step rates of the current (`ω₁`) and previous (`ω₂`)
/// output intervals:
///
/// $$
/// \Lambda = 1 + \frac{1}{2}\omega_1 + \frac{17}{192}\omega_1^2 + \frac{1}{64}\omega_1\omega_2
///     + \frac{1}{64}\omega_2\omega_1 + \frac{1}{192}\omega_2^2
/// $$
///
/// with the rates embedded as pure quaternions. The first step has no previous interval and uses
/// the average-speed formula.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AutoGeneratedTwoStep;
impl LocalSolution for AutoGeneratedTwoStep {
    type Algebra = Quaternion<f64>;
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Auto-generated method (2-step, integrated input)".to_string()
    }
    fn steps_count(&self) -> usize {
        2
    }
    fn window(&self) -> Window {
        Window::History
    }
    fn local_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Quaternion<f64>> {
        let [previous, current] = last_segments::<_, 2>(segments)?;
        let w1 = pure_quaternion(&current);
        let w2 = pure_quaternion(&previous);
        Ok(Quaternion::identity()
            + w1 * 0.5
            + w1 * w1 * (17.0 / 192.0)
            + w1 * w2 * (1.0 / 64.0)
            + w2 * w1 * (1.0 / 64.0)
            + w2 * w2 * (1.0 / 192.0))
    }
    fn warm_up_solution(&self, t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Quaternion<f64>> {
        AverageSpeed.local_solution(t, segments)
    }
}

/// Sum and cross product of the two half-step segments, and the segments themselves
fn two_step_terms(segments: &[Vector3<f64>]) -> AttitudeResult<(Vector3<f64>, Vector3<f64>, [Vector3<f64>; 2])> {
    let [g0, g1] = last_segments::<_, 2>(segments)?;
    Ok((g0 + g1, g0.cross(&g1), [g0, g1]))
}

/// Fourth-order method on two half-step segments `γ₀, γ₁`: scalar part `1 - |γ₀+γ₁|²/8`,
/// vector part `(1/2 - |γ₀+γ₁|²/48)(γ₀ + γ₁ + 2/3 γ₀ × γ₁)`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TwoStepFourthDegree;
impl LocalSolution for TwoStepFourthDegree {
    type Algebra = Quaternion<f64>;
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Two-step method of the 4th degree (2-step, 4th order, integrated input)".to_string()
    }
    fn steps_count(&self) -> usize {
        2
    }
    fn local_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Quaternion<f64>> {
        let (sum, cross, _) = two_step_terms(segments)?;
        let norm = sum.norm_squared();
        Ok(Quaternion::from_parts(
            1.0 - norm / 8.0,
            (sum + cross * (2.0 / 3.0)) * (0.5 - norm / 48.0),
        ))
    }
}

/// Riccati form of [`TwoStepFourthDegree`]:
/// `x = (γ₀+γ₁)/4 + γ₀×γ₁/6 - vec(γ₀³ + γ₁³)/48`, cubes taken in the quaternion algebra
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TwoStepFourthDegreeRiccati;
impl RiccatiSolution for TwoStepFourthDegreeRiccati {
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Two-step method of the 4th degree, Riccati form (2-step, 4th order, integrated input)".to_string()
    }
    fn steps_count(&self) -> usize {
        2
    }
    fn local_riccati_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Vector3<f64>> {
        let (sum, cross, [g0, g1]) = two_step_terms(segments)?;
        let cube = |g: &Vector3<f64>| {
            let q = pure_quaternion(g);
            (q * q * q).imag()
        };
        Ok(sum / 4.0 + cross / 6.0 - (cube(&g0) + cube(&g1)) / 48.0)
    }
}

/// Second Riccati derivation of [`TwoStepFourthDegree`]:
/// `x = (γ₀+γ₁)/4 + γ₀×γ₁/6 + (γ₀+γ₁)|γ₀+γ₁|²/192`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TwoStepFourthDegreeRiccatiAlt;
impl RiccatiSolution for TwoStepFourthDegreeRiccatiAlt {
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Two-step method of the 4th degree, Riccati form, second derivation (2-step, 4th order, integrated input)"
            .to_string()
    }
    fn steps_count(&self) -> usize {
        2
    }
    fn local_riccati_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Vector3<f64>> {
        let (sum, cross, _) = two_step_terms(segments)?;
        Ok(sum / 4.0 + cross / 6.0 + sum * (sum.norm_squared() / 192.0))
    }
}

/// Rotation vector of Panov's four-segment formulas.
///
/// $$
/// \phi = \sum_k \gamma_k + \frac{22}{45}(\Gamma_0 + \Gamma_1)(\gamma_2 + \gamma_3)
///     + \frac{32}{45}(\Gamma_0\gamma_1 + \Gamma_2\gamma_3) + \Delta
/// $$
///
/// where `Γ` is the skew-symmetric matrix of `γ` and the sixth-order correction is
///
/// $$
/// \Delta = \frac{32}{45}(\Gamma_0\Gamma_1\gamma_3 - \Gamma_3\Gamma_0\gamma_2)
///     + \frac{64}{45}(\gamma_1 \cdot \gamma_2)\Gamma_1\gamma_2
/// $$
fn panov_rotation_vector(segments: &[Vector3<f64>], sixth_order: bool) -> AttitudeResult<Vector3<f64>> {
    let [g0, g1, g2, g3] = last_segments::<_, 4>(segments)?;
    let [s0, s1, s2, s3] = [g0, g1, g2, g3].map(|g| skew_symmetric(&g));
    let mut phi = g0 + g1 + g2 + g3
        + (s0 + s1) * (g2 + g3) * (22.0 / 45.0)
        + (s0 * g1 + s2 * g3) * (32.0 / 45.0);
    if sixth_order {
        phi += (s0 * s1 * g3 - s3 * s0 * g2) * (32.0 / 45.0) + s1 * g2 * (64.0 / 45.0 * g1.dot(&g2));
    }
    Ok(phi)
}

/// Panov's sixth-order method on four quarter-step segments
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Panov;
impl LocalSolution for Panov {
    type Algebra = Quaternion<f64>;
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Panov's method (4-step, 6th order, integrated input)".to_string()
    }
    fn steps_count(&self) -> usize {
        4
    }
    fn local_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Quaternion<f64>> {
        Ok(rotation_increment(&panov_rotation_vector(segments, true)?))
    }
}

/// Panov's method without the sixth-order correction
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanovFourthDegree;
impl LocalSolution for PanovFourthDegree {
    type Algebra = Quaternion<f64>;
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Panov's method of the 4th degree (4-step, 4th order, integrated input)".to_string()
    }
    fn steps_count(&self) -> usize {
        4
    }
    fn local_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Quaternion<f64>> {
        Ok(rotation_increment(&panov_rotation_vector(segments, false)?))
    }
}

/// Panov's sixth-order method expressed in the Riccati variable
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanovRiccati;
impl RiccatiSolution for PanovRiccati {
    type Segment = Vector3<f64>;
    fn title(&self) -> String {
        "Panov's method, Riccati form (4-step, 6th order, integrated input)".to_string()
    }
    fn steps_count(&self) -> usize {
        4
    }
    fn local_riccati_solution(&self, _t: f64, segments: &[Vector3<f64>]) -> AttitudeResult<Vector3<f64>> {
        Ok(rotation_riccati(&panov_rotation_vector(segments, true)?))
    }
}

/// A quaternion integration algorithm driven by integrated angular rates
pub type QuaternionAlgorithm = Box<dyn Algorithm<Algebra = Quaternion<f64>, Input = Vector3<f64>>>;

/// Catalogue of the available integration formulas
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    AverageSpeed,
    AverageSpeedRiccati,
    AutoGeneratedTwoStep,
    TwoStepFourthDegree,
    TwoStepFourthDegreeRiccati,
    TwoStepFourthDegreeRiccatiAlt,
    Panov,
    PanovFourthDegree,
    PanovRiccati,
}

impl Method {
    /// Every formula, from the lowest to the highest order
    pub fn all() -> Vec<Method> {
        vec![
            Method::AverageSpeed,
            Method::AverageSpeedRiccati,
            Method::AutoGeneratedTwoStep,
            Method::TwoStepFourthDegree,
            Method::TwoStepFourthDegreeRiccati,
            Method::TwoStepFourthDegreeRiccatiAlt,
            Method::Panov,
            Method::PanovFourthDegree,
            Method::PanovRiccati,
        ]
    }
    /// Nominal accuracy order of the formula
    pub fn order(&self) -> u32 {
        match self {
            Method::AverageSpeed | Method::AverageSpeedRiccati | Method::AutoGeneratedTwoStep => 2,
            Method::TwoStepFourthDegree
            | Method::TwoStepFourthDegreeRiccati
            | Method::TwoStepFourthDegreeRiccatiAlt
            | Method::PanovFourthDegree => 4,
            Method::Panov | Method::PanovRiccati => 6,
        }
    }
    /// Build a fresh, unconfigured algorithm for the formula
    pub fn algorithm(&self) -> QuaternionAlgorithm {
        match self {
            Method::AverageSpeed => Box::new(Iterative::new(AverageSpeed)),
            Method::AverageSpeedRiccati => Box::new(Iterative::new(Riccati(AverageSpeedRiccati))),
            Method::AutoGeneratedTwoStep => Box::new(Iterative::new(AutoGeneratedTwoStep)),
            Method::TwoStepFourthDegree => Box::new(Iterative::new(TwoStepFourthDegree)),
            Method::TwoStepFourthDegreeRiccati => Box::new(Iterative::new(Riccati(TwoStepFourthDegreeRiccati))),
            Method::TwoStepFourthDegreeRiccatiAlt => {
                Box::new(Iterative::new(Riccati(TwoStepFourthDegreeRiccatiAlt)))
            }
            Method::Panov => Box::new(Iterative::new(Panov)),
            Method::PanovFourthDegree => Box::new(Iterative::new(PanovFourthDegree)),
            Method::PanovRiccati => Box::new(Iterative::new(Riccati(PanovRiccati))),
        }
    }
    /// Human readable name of the formula
    pub fn title(&self) -> String {
        self.algorithm().title()
    }
    /// Number of input segments consumed per output step
    pub fn steps_count(&self) -> usize {
        self.local().0
    }
    /// How the input segments are collected
    pub fn window(&self) -> Window {
        self.local().1
    }
    fn local(&self) -> (usize, Window) {
        match self {
            Method::AverageSpeed => (AverageSpeed.steps_count(), AverageSpeed.window()),
            Method::AverageSpeedRiccati => (AverageSpeedRiccati.steps_count(), AverageSpeedRiccati.window()),
            Method::AutoGeneratedTwoStep => (AutoGeneratedTwoStep.steps_count(), AutoGeneratedTwoStep.window()),
            Method::TwoStepFourthDegree => (TwoStepFourthDegree.steps_count(), TwoStepFourthDegree.window()),
            Method::TwoStepFourthDegreeRiccati => (
                TwoStepFourthDegreeRiccati.steps_count(),
                TwoStepFourthDegreeRiccati.window(),
            ),
            Method::TwoStepFourthDegreeRiccatiAlt => (
                TwoStepFourthDegreeRiccatiAlt.steps_count(),
                TwoStepFourthDegreeRiccatiAlt.window(),
            ),
            Method::Panov => (Panov.steps_count(), Panov.window()),
            Method::PanovFourthDegree => (PanovFourthDegree.steps_count(), PanovFourthDegree.window()),
            Method::PanovRiccati => (PanovRiccati.steps_count(), PanovRiccati.window()),
        }
    }
}
