//! Simple dynamical systems with closed-form solutions, used to check the solvers.

use nalgebra::Vector2;

/// Second-order linear system driven toward a constant reference:
///
/// acc = Kp * (x_ref - x) + Kd * (v_ref - v),   Kp = omega^2,   Kd = 2 xi omega
pub struct SimpleLinearControl {
    pub xi: f64,    // damping ratio
    pub omega: f64, // natural frequency
}

impl SimpleLinearControl {
    /// Position x(t) for a unit step response starting from rest at the origin.
    pub fn evaluate_solution(&self, t: f64) -> f64 {
        let xi = self.xi;
        let w = self.omega;
        if xi == 1.0 {
            (-1.0 - w * t) * (-w * t).exp() + 1.0
        } else if xi > 1.0 {
            let root = (xi * xi - 1.0).sqrt();
            let alpha1 = -xi + root;
            let alpha2 = -xi - root;
            let a = -alpha2 / (alpha2 - alpha1);
            let b = alpha1 / (alpha2 - alpha1);
            a * (alpha1 * w * t).exp() + b * (alpha2 * w * t).exp() + 1.0
        } else {
            let root = (1.0 - xi * xi).sqrt();
            let omega_d = w * root;
            let decay = (-xi * w * t).exp();
            decay * (-(omega_d * t).cos() - (xi / root) * (omega_d * t).sin()) + 1.0
        }
    }

    pub fn system_dynamics(
        &self,
        reference: &Vector2<f64>,
    ) -> impl Fn(f64, Vector2<f64>) -> Vector2<f64> {
        let k_p = self.omega * self.omega;
        let k_d = 2.0 * self.xi * self.omega;
        let x_ref = reference[0];
        let v_ref = reference[1];

        move |_, state: Vector2<f64>| {
            let x = state[0];
            let v = state[1];
            Vector2::new(v, k_p * (x_ref - x) + k_d * (v_ref - v))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_response_starts_at_rest() {
        for &xi in &[0.5, 1.0, 2.0] {
            let system = SimpleLinearControl { xi, omega: 1.5 };
            assert_relative_eq!(system.evaluate_solution(0.0), 0.0, epsilon = 1e-12);
            assert_relative_eq!(system.evaluate_solution(50.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_critically_damped_rise_time() {
        // Rise time from 10% to 90% with omega == 1, computed offline by a root solve.
        let system = SimpleLinearControl { xi: 1.0, omega: 1.0 };
        assert_relative_eq!(system.evaluate_solution(0.5318116083896343), 0.1, epsilon = 1e-6);
        assert_relative_eq!(system.evaluate_solution(3.88972016986743), 0.9, epsilon = 1e-6);
    }
}
