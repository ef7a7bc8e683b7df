//! Equations of motion for the planar double pendulum.
//!
//! Both angles are measured from the downward vertical, counter-clockwise
//! positive. Rod 1 hangs from a fixed pivot at the origin and rod 2 hangs from
//! bob 1. The rods are massless and all mass is concentrated in the bobs.

use nalgebra::Vector4;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use super::error::SimulationError;

/// Physical constants of one run. Every field is strictly positive and finite,
/// which is checked on construction and on deserialization. With a positive
/// `bob1_mass` the denominators of the equations of motion never vanish.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "UncheckedPhysicalParameters")]
pub struct PhysicalParameters {
    gravity: f64,
    rod1_length: f64,
    rod2_length: f64,
    bob1_mass: f64,
    bob2_mass: f64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
struct UncheckedPhysicalParameters {
    gravity: f64,
    rod1_length: f64,
    rod2_length: f64,
    bob1_mass: f64,
    bob2_mass: f64,
}

impl Default for UncheckedPhysicalParameters {
    fn default() -> Self {
        let p = PhysicalParameters::default();
        UncheckedPhysicalParameters {
            gravity: p.gravity,
            rod1_length: p.rod1_length,
            rod2_length: p.rod2_length,
            bob1_mass: p.bob1_mass,
            bob2_mass: p.bob2_mass,
        }
    }
}

impl TryFrom<UncheckedPhysicalParameters> for PhysicalParameters {
    type Error = SimulationError;

    fn try_from(raw: UncheckedPhysicalParameters) -> Result<Self, Self::Error> {
        PhysicalParameters::new(
            raw.gravity,
            raw.rod1_length,
            raw.rod2_length,
            raw.bob1_mass,
            raw.bob2_mass,
        )
    }
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        PhysicalParameters {
            gravity: 9.81,
            rod1_length: 1.0,
            rod2_length: 1.0,
            bob1_mass: 1.0,
            bob2_mass: 1.0,
        }
    }
}

impl PhysicalParameters {
    pub fn new(
        gravity: f64,
        rod1_length: f64,
        rod2_length: f64,
        bob1_mass: f64,
        bob2_mass: f64,
    ) -> Result<PhysicalParameters, SimulationError> {
        for (name, value) in [
            ("gravity", gravity),
            ("rod1_length", rod1_length),
            ("rod2_length", rod2_length),
            ("bob1_mass", bob1_mass),
            ("bob2_mass", bob2_mass),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidParameters(format!(
                    "`{}` must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(PhysicalParameters {
            gravity,
            rod1_length,
            rod2_length,
            bob1_mass,
            bob2_mass,
        })
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }
    pub fn rod1_length(&self) -> f64 {
        self.rod1_length
    }
    pub fn rod2_length(&self) -> f64 {
        self.rod2_length
    }
    pub fn bob1_mass(&self) -> f64 {
        self.bob1_mass
    }
    pub fn bob2_mass(&self) -> f64 {
        self.bob2_mass
    }

    /// Potential energy released going from pivot height to hanging straight
    /// down. Used as the yardstick for energy errors.
    pub fn energy_scale(&self) -> f64 {
        let g = self.gravity;
        (self.bob1_mass + self.bob2_mass) * g * self.rod1_length
            + self.bob2_mass * g * self.rod2_length
    }

    /// Right-hand side of the ODE in the form expected by the solvers. The
    /// system is autonomous, so time is ignored.
    pub fn dynamics(&self) -> impl Fn(f64, Vector4<f64>) -> Vector4<f64> + '_ {
        move |_, x| derivatives(self, &x)
    }
}

/// Generalized coordinates: angle and angular rate of each rod.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PendulumState {
    pub theta1: f64,
    pub omega1: f64,
    pub theta2: f64,
    pub omega2: f64,
}

impl Default for PendulumState {
    /// Both rods horizontal, released from rest.
    fn default() -> Self {
        PendulumState {
            theta1: std::f64::consts::FRAC_PI_2,
            omega1: 0.0,
            theta2: std::f64::consts::FRAC_PI_2,
            omega2: 0.0,
        }
    }
}

impl PendulumState {
    pub fn new(theta1: f64, omega1: f64, theta2: f64, omega2: f64) -> PendulumState {
        PendulumState {
            theta1,
            omega1,
            theta2,
            omega2,
        }
    }

    pub fn as_vector(&self) -> Vector4<f64> {
        Vector4::new(self.theta1, self.omega1, self.theta2, self.omega2)
    }

    pub fn from_vector(x: &Vector4<f64>) -> PendulumState {
        PendulumState::new(x[0], x[1], x[2], x[3])
    }

    pub fn is_finite(&self) -> bool {
        self.as_vector().iter().all(|v| v.is_finite())
    }
}

/// Time derivative of `[theta1, omega1, theta2, omega2]`, from the Lagrangian
/// equations of motion. A vanishing denominator is not guarded here: it shows
/// up as a non-finite value that the solver reports as a numerical fault.
pub fn derivatives(params: &PhysicalParameters, x: &Vector4<f64>) -> Vector4<f64> {
    let (theta1, omega1, theta2, omega2) = (x[0], x[1], x[2], x[3]);
    let g = params.gravity;
    let l1 = params.rod1_length;
    let l2 = params.rod2_length;
    let m1 = params.bob1_mass;
    let m2 = params.bob2_mass;
    let total_mass = m1 + m2;

    let delta = theta2 - theta1;
    let (sin_delta, cos_delta) = delta.sin_cos();
    let den1 = total_mass * l1 - m2 * l1 * cos_delta * cos_delta;
    let den2 = (l2 / l1) * den1;

    let omega1_dot = (m2 * l1 * omega1 * omega1 * sin_delta * cos_delta
        + m2 * g * theta2.sin() * cos_delta
        + m2 * l2 * omega2 * omega2 * sin_delta
        - total_mass * g * theta1.sin())
        / den1;

    let omega2_dot = (-m2 * l2 * omega2 * omega2 * sin_delta * cos_delta
        + total_mass * g * theta1.sin() * cos_delta
        - total_mass * l1 * omega1 * omega1 * sin_delta
        - total_mass * g * theta2.sin())
        / den2;

    Vector4::new(omega1, omega1_dot, omega2, omega2_dot)
}

/// Kinetic plus potential energy, with zero potential at the pivot height.
pub fn total_energy(params: &PhysicalParameters, state: &PendulumState) -> f64 {
    let g = params.gravity;
    let (l1, l2) = (params.rod1_length, params.rod2_length);
    let (m1, m2) = (params.bob1_mass, params.bob2_mass);
    let (w1, w2) = (state.omega1, state.omega2);

    let kinetic = 0.5 * m1 * l1 * l1 * w1 * w1
        + 0.5
            * m2
            * (l1 * l1 * w1 * w1
                + l2 * l2 * w2 * w2
                + 2.0 * l1 * l2 * w1 * w2 * (state.theta1 - state.theta2).cos());
    let potential = -(m1 + m2) * g * l1 * state.theta1.cos() - m2 * g * l2 * state.theta2.cos();
    kinetic + potential
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hanging_at_rest_is_an_equilibrium() {
        let params = PhysicalParameters::default();
        let rest = PendulumState::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(derivatives(&params, &rest.as_vector()), Vector4::zeros());
    }

    #[test]
    fn test_horizontal_release_accelerations() {
        // delta = 0  -->  den1 = (m1 + m2) L1 - m2 L1 = 1
        // omega1_dot = m2 g - (m1 + m2) g = -g,   omega2_dot = (m1 + m2) g - (m1 + m2) g = 0
        let params = PhysicalParameters::default();
        let x_dot = derivatives(&params, &PendulumState::default().as_vector());
        assert_relative_eq!(x_dot, Vector4::new(0.0, -9.81, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_derivatives_match_single_pendulum_limit() {
        // With a negligible second bob, rod 1 behaves like a simple pendulum.
        let params = PhysicalParameters::new(9.81, 2.0, 1.0, 1.0, 1e-12).unwrap();
        let theta1 = 0.3;
        let x_dot = derivatives(&params, &Vector4::new(theta1, 0.0, 1.1, 0.0));
        assert_relative_eq!(x_dot[1], -9.81 / 2.0 * theta1.sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(PhysicalParameters::new(9.81, 1.0, 1.0, 1.0, 1.0).is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(PhysicalParameters::new(bad, 1.0, 1.0, 1.0, 1.0).is_err());
            assert!(PhysicalParameters::new(9.81, bad, 1.0, 1.0, 1.0).is_err());
            assert!(PhysicalParameters::new(9.81, 1.0, bad, 1.0, 1.0).is_err());
            assert!(PhysicalParameters::new(9.81, 1.0, 1.0, bad, 1.0).is_err());
            assert!(PhysicalParameters::new(9.81, 1.0, 1.0, 1.0, bad).is_err());
        }
    }

    #[test]
    fn test_deserialization_validates_and_fills_defaults() {
        let params: PhysicalParameters = serde_json::from_str(r#"{"rod2_length": 0.5}"#).unwrap();
        assert_eq!(params.rod2_length(), 0.5);
        assert_eq!(params.gravity(), 9.81);

        let result = serde_json::from_str::<PhysicalParameters>(r#"{"bob1_mass": -2.0}"#);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("bob1_mass"), "{}", message);
    }

    #[test]
    fn test_energy_of_reference_configurations() {
        let params = PhysicalParameters::default();
        // Both rods horizontal and at rest: at the pivot height.
        assert_relative_eq!(total_energy(&params, &PendulumState::default()), 0.0, epsilon = 1e-12);
        // Hanging straight down: -(m1 + m2) g L1 - m2 g L2.
        let down = PendulumState::new(0.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(
            total_energy(&params, &down),
            -params.energy_scale(),
            epsilon = 1e-12
        );
        // Rigid rotation about the pivot: 0.5 * I * w^2 with I = m1 L1^2 + m2 (L1 + L2)^2.
        let spinning = PendulumState::new(0.0, 2.0, 0.0, 2.0);
        assert_relative_eq!(
            total_energy(&params, &spinning) - total_energy(&params, &down),
            0.5 * 5.0 * 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_state_vector_conversion() {
        let state = PendulumState::new(0.1, -0.2, 7.3, 12.0);
        assert_eq!(PendulumState::from_vector(&state.as_vector()), state);
        assert!(state.is_finite());
        assert!(!PendulumState::new(f64::NAN, 0.0, 0.0, 0.0).is_finite());
    }
}
