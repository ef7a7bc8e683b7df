use serde::Serialize;

use crate::core::ode_solvers::{Integrator, SolverStats};

use super::{
    error::SimulationError,
    physics::{total_energy, PendulumState, PhysicalParameters},
    time_grid::TimeGrid,
};

/// Pendulum state at each sample time of a `TimeGrid`. Built once by
/// `solve_trajectory` and read-only afterwards.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<PendulumState>,
    stats: SolverStats,
}

impl Trajectory {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[PendulumState] {
        &self.states
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Integrates the equations of motion from `initial`, reporting the state at
/// every time in `grid`. The first state is `initial`, bit for bit. Any solver
/// failure aborts the whole run; there are no partial trajectories.
pub fn solve_trajectory<I: Integrator>(
    params: &PhysicalParameters,
    initial: &PendulumState,
    grid: &TimeGrid,
    integrator: &I,
) -> Result<Trajectory, SimulationError> {
    if !initial.is_finite() {
        return Err(SimulationError::InvalidParameters(format!(
            "initial state must be finite, got {:?}",
            initial
        )));
    }

    let solution = integrator.integrate(&params.dynamics(), initial.as_vector(), grid.times())?;
    let states: Vec<PendulumState> = solution
        .states
        .iter()
        .map(PendulumState::from_vector)
        .collect();
    more_asserts::assert_ge!(states.len(), 1);

    log::debug!(
        "Integrated {} samples over [0, {}]: {} accepted steps, {} rejected steps, {} derivative evaluations",
        states.len(),
        grid.horizon(),
        solution.stats.accepted_steps,
        solution.stats.rejected_steps,
        solution.stats.function_evaluations
    );

    Ok(Trajectory {
        times: grid.times().to_vec(),
        states,
        stats: solution.stats,
    })
}

/// How far the total mechanical energy wandered from its initial value. The
/// model is frictionless, so any drift is integration error.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct EnergyReport {
    pub initial_energy: f64,
    pub max_abs_drift: f64,
    /// `max_abs_drift` divided by `PhysicalParameters::energy_scale`.
    pub max_relative_drift: f64,
    pub time_of_max_drift: f64,
}

impl EnergyReport {
    pub fn new(params: &PhysicalParameters, trajectory: &Trajectory) -> EnergyReport {
        let initial_energy = total_energy(params, &trajectory.states()[0]);
        let (time_of_max_drift, max_abs_drift) = trajectory
            .times()
            .iter()
            .zip(trajectory.states())
            .map(|(&t, state)| (t, (total_energy(params, state) - initial_energy).abs()))
            .fold((0.0, 0.0), |best, next| if next.1 > best.1 { next } else { best });

        EnergyReport {
            initial_energy,
            max_abs_drift,
            max_relative_drift: max_abs_drift / params.energy_scale(),
            time_of_max_drift,
        }
    }
}
