//! Explicit ODE solvers
//!
//! The main entry point is the adaptive Dormand-Prince 5(4) method, which
//! reports the solution at a caller-supplied set of sample times while taking
//! as many internal sub-steps as its error control requires.

use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OdeSolverError {
    #[error("sample times must be finite and strictly increasing")]
    InvalidSampleTimes,
    #[error("non-finite derivative at t = {time}")]
    NonFiniteDerivative { time: f64 },
    #[error("step size underflow at t = {time} (h = {step:e})")]
    StepSizeUnderflow { time: f64, step: f64 },
    #[error("step budget of {max_steps} exhausted at t = {time}")]
    StepBudgetExceeded { time: f64, max_steps: usize },
}

impl OdeSolverError {
    /// Simulation time at which the solver gave up, if it got that far.
    pub fn time(&self) -> Option<f64> {
        match self {
            OdeSolverError::InvalidSampleTimes => None,
            OdeSolverError::NonFiniteDerivative { time }
            | OdeSolverError::StepSizeUnderflow { time, .. }
            | OdeSolverError::StepBudgetExceeded { time, .. } => Some(*time),
        }
    }
}

/// Mixed relative / absolute error tolerance, applied per state component.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerances {
    /// sqrt(machine epsilon) for both, roughly 1.49e-8.
    fn default() -> Self {
        let tol = f64::EPSILON.sqrt();
        Tolerances {
            relative: tol,
            absolute: tol,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub function_evaluations: usize,
}

#[derive(Debug, Clone)]
pub struct OdeSolution<const N: usize> {
    /// One state per requested sample time.
    pub states: Vec<SVector<f64, N>>,
    pub stats: SolverStats,
}

/// Contract shared by all solvers: given the dynamics, an initial state, and the
/// sample times, return the state at every sample time. The first returned state
/// is always `x0`, untouched.
pub trait Integrator {
    fn integrate<const N: usize, F>(
        &self,
        dynamics: &F,
        x0: SVector<f64, N>,
        times: &[f64],
    ) -> Result<OdeSolution<N>, OdeSolverError>
    where
        F: Fn(f64, SVector<f64, N>) -> SVector<f64, N>;
}

/// Dormand-Prince 5(4) embedded Runge-Kutta method with step-size control.
///
/// The solution is propagated with the fifth order weights, and the fourth
/// order embedded solution is used only to estimate the local error. The final
/// stage is evaluated at the new state, so it is reused as the first stage of
/// the next step (first-same-as-last).
///
/// This is an explicit method and is not stiff-capable: on stiff inputs, such
/// as a first bob that is orders of magnitude lighter than the second, the
/// step size collapses until `max_step_count` is exhausted, which surfaces as
/// `OdeSolverError::StepBudgetExceeded`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DormandPrince {
    pub tolerances: Tolerances,
    /// Upper bound on the number of attempted steps over the whole integration.
    pub max_step_count: usize,
    pub max_step_size: f64,
}

impl Default for DormandPrince {
    fn default() -> Self {
        DormandPrince {
            tolerances: Tolerances::default(),
            max_step_count: 1_000_000,
            max_step_size: f64::INFINITY,
        }
    }
}

// Butcher tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth order weights (also the last row of the tableau)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between the fifth and fourth order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// Step size controller
const SAFETY_FACTOR: f64 = 0.9;
const MIN_SCALE_FACTOR: f64 = 0.2;
const MAX_SCALE_FACTOR: f64 = 5.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

struct StepResult<const N: usize> {
    x_next: SVector<f64, N>,
    dx_next: SVector<f64, N>,
    error: SVector<f64, N>,
}

fn evaluate<const N: usize, F>(
    dynamics: &F,
    t: f64,
    x: SVector<f64, N>,
    stats: &mut SolverStats,
) -> Result<SVector<f64, N>, OdeSolverError>
where
    F: Fn(f64, SVector<f64, N>) -> SVector<f64, N>,
{
    stats.function_evaluations += 1;
    let dx = dynamics(t, x);
    if dx.iter().all(|v| v.is_finite()) {
        Ok(dx)
    } else {
        Err(OdeSolverError::NonFiniteDerivative { time: t })
    }
}

impl DormandPrince {
    pub fn new(tolerances: Tolerances) -> DormandPrince {
        DormandPrince {
            tolerances,
            ..DormandPrince::default()
        }
    }

    fn scaled_rms<const N: usize>(
        &self,
        reference_a: &SVector<f64, N>,
        reference_b: &SVector<f64, N>,
        value: &SVector<f64, N>,
    ) -> f64 {
        let sum: f64 = (0..N)
            .map(|i| {
                let scale = self.tolerances.absolute
                    + self.tolerances.relative * reference_a[i].abs().max(reference_b[i].abs());
                let ratio = value[i] / scale;
                ratio * ratio
            })
            .sum();
        (sum / (N as f64)).sqrt()
    }

    /// Simplified version of the starting step heuristic from Hairer, Norsett & Wanner.
    fn initial_step_size<const N: usize>(
        &self,
        x0: &SVector<f64, N>,
        dx0: &SVector<f64, N>,
        span: f64,
    ) -> f64 {
        let d0 = self.scaled_rms(x0, x0, x0);
        let d1 = self.scaled_rms(x0, x0, dx0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        h0.min(span).min(self.max_step_size)
    }

    fn attempt_step<const N: usize, F>(
        &self,
        dynamics: &F,
        t: f64,
        x: SVector<f64, N>,
        k1: SVector<f64, N>,
        h: f64,
        stats: &mut SolverStats,
    ) -> Result<StepResult<N>, OdeSolverError>
    where
        F: Fn(f64, SVector<f64, N>) -> SVector<f64, N>,
    {
        let k2 = evaluate(dynamics, t + C2 * h, x + h * (A21 * k1), stats)?;
        let k3 = evaluate(dynamics, t + C3 * h, x + h * (A31 * k1 + A32 * k2), stats)?;
        let k4 = evaluate(
            dynamics,
            t + C4 * h,
            x + h * (A41 * k1 + A42 * k2 + A43 * k3),
            stats,
        )?;
        let k5 = evaluate(
            dynamics,
            t + C5 * h,
            x + h * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4),
            stats,
        )?;
        let k6 = evaluate(
            dynamics,
            t + h,
            x + h * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5),
            stats,
        )?;
        let x_next = x + h * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6);
        let k7 = evaluate(dynamics, t + h, x_next, stats)?;
        let error = h * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
        Ok(StepResult {
            x_next,
            dx_next: k7,
            error,
        })
    }
}

fn validate_sample_times(times: &[f64]) -> Result<(), OdeSolverError> {
    let all_finite = times.iter().all(|t| t.is_finite());
    let increasing = times.windows(2).all(|pair| pair[0] < pair[1]);
    if all_finite && increasing {
        Ok(())
    } else {
        Err(OdeSolverError::InvalidSampleTimes)
    }
}

impl Integrator for DormandPrince {
    fn integrate<const N: usize, F>(
        &self,
        dynamics: &F,
        x0: SVector<f64, N>,
        times: &[f64],
    ) -> Result<OdeSolution<N>, OdeSolverError>
    where
        F: Fn(f64, SVector<f64, N>) -> SVector<f64, N>,
    {
        validate_sample_times(times)?;
        let mut stats = SolverStats::default();
        let mut states = Vec::with_capacity(times.len());
        if times.is_empty() {
            return Ok(OdeSolution { states, stats });
        }
        states.push(x0);
        if times.len() == 1 {
            return Ok(OdeSolution { states, stats });
        }

        let mut t = times[0];
        let mut x = x0;
        let mut dx = evaluate(dynamics, t, x, &mut stats)?;
        let mut h = self.initial_step_size(&x, &dx, times[times.len() - 1] - t);

        for &t_sample in &times[1..] {
            while t < t_sample {
                if stats.accepted_steps + stats.rejected_steps >= self.max_step_count {
                    return Err(OdeSolverError::StepBudgetExceeded {
                        time: t,
                        max_steps: self.max_step_count,
                    });
                }

                // Shorten the final sub-step so that we land exactly on the sample.
                let remaining = t_sample - t;
                let lands_on_sample = h >= remaining;
                let h_step = if lands_on_sample { remaining } else { h };

                let step = self.attempt_step(dynamics, t, x, dx, h_step, &mut stats)?;
                let error_norm = self.scaled_rms(&x, &step.x_next, &step.error);
                let scale_factor = if error_norm == 0.0 {
                    MAX_SCALE_FACTOR
                } else {
                    (SAFETY_FACTOR * error_norm.powf(ERROR_EXPONENT))
                        .clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
                };

                if error_norm <= 1.0 {
                    stats.accepted_steps += 1;
                    t = if lands_on_sample { t_sample } else { t + h_step };
                    x = step.x_next;
                    dx = step.dx_next;
                    let proposed = h_step * scale_factor;
                    // A shortened step says little about how large the next one may be.
                    h = if lands_on_sample {
                        h.max(proposed)
                    } else {
                        proposed
                    };
                } else {
                    stats.rejected_steps += 1;
                    h = h_step * scale_factor.min(1.0);
                    let min_step = 16.0 * f64::EPSILON * t.abs().max(1.0);
                    if h < min_step {
                        return Err(OdeSolverError::StepSizeUnderflow { time: t, step: h });
                    }
                }
                h = h.min(self.max_step_size);
            }
            states.push(x);
        }

        Ok(OdeSolution { states, stats })
    }
}
