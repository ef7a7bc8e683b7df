#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;
    use double_pendulum::{
        core::ode_solvers::DormandPrince,
        pendulum::{
            error::SimulationError,
            geometry::map_trajectory,
            params::{DoublePendulumParams, SimulationConfig},
            physics::{total_energy, PendulumState, PhysicalParameters},
            solver::{solve_trajectory, EnergyReport},
            time_grid::TimeGrid,
        },
    };
    use sha2::{Digest, Sha256};

    fn hash_json<T: serde::Serialize>(value: &T) -> String {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(value).unwrap());
        format!("{:x}", hasher.finalize())
    }

    #[test]
    fn test_inline_preset_concrete_scenario() {
        let params = DoublePendulumParams::inline_preset();
        let result = params.simulation.run().unwrap();

        assert_eq!(result.trajectory.len(), 500);
        assert_eq!(
            result.trajectory.states()[0],
            PendulumState::new(FRAC_PI_2, 0.0, FRAC_PI_2, 0.0)
        );
        assert_eq!(result.trajectory.times()[0], 0.0);
        assert_relative_eq!(result.trajectory.times()[499], 20.0, epsilon = 1e-12);

        let first = result.geometry.frames()[0];
        assert_relative_eq!(first.bob1[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(first.bob1[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(first.bob2[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(first.bob2[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_energy_is_conserved_over_the_export_run() {
        let config = DoublePendulumParams::export_preset().simulation;
        let result = config.run().unwrap();
        let report = EnergyReport::new(&config.physics, &result.trajectory);

        more_asserts::assert_lt!(report.max_relative_drift, 0.01);
        for state in result.trajectory.states() {
            let drift = (total_energy(&config.physics, state) - report.initial_energy).abs();
            more_asserts::assert_le!(drift, report.max_abs_drift);
        }
    }

    #[test]
    fn test_energy_is_conserved_for_asymmetric_parameters() {
        let params = PhysicalParameters::new(3.7, 0.6, 1.4, 2.5, 0.3).unwrap();
        let trajectory = solve_trajectory(
            &params,
            &PendulumState::new(2.5, -0.4, -1.0, 1.5),
            &TimeGrid::new(15.0, 300).unwrap(),
            &DormandPrince::default(),
        )
        .unwrap();
        let report = EnergyReport::new(&params, &trajectory);
        more_asserts::assert_lt!(report.max_relative_drift, 0.01);
    }

    #[test]
    fn test_identical_inputs_give_identical_outputs() {
        let config = SimulationConfig {
            sample_count: 250,
            ..SimulationConfig::default()
        };
        let first = config.run().unwrap();
        let second = config.run().unwrap();

        assert_eq!(hash_json(&first.trajectory), hash_json(&second.trajectory));
        assert_eq!(hash_json(&first.geometry), hash_json(&second.geometry));
        assert_eq!(first.geometry, second.geometry);
    }

    #[test]
    fn test_single_sample_has_only_the_initial_state() {
        let params = PhysicalParameters::default();
        let initial = PendulumState::new(0.1, 0.2, 0.3, 0.4);
        let trajectory = solve_trajectory(
            &params,
            &initial,
            &TimeGrid::new(20.0, 1).unwrap(),
            &DormandPrince::default(),
        )
        .unwrap();

        assert_eq!(trajectory.times(), &[0.0]);
        assert_eq!(trajectory.states(), &[initial]);
        assert_eq!(trajectory.stats().function_evaluations, 0);
        assert_eq!(map_trajectory(&params, &trajectory).len(), 1);
    }

    #[test]
    fn test_invalid_configuration_is_rejected_up_front() {
        assert!(matches!(
            PhysicalParameters::new(9.81, 1.0, 1.0, 0.0, 1.0),
            Err(SimulationError::InvalidParameters(_))
        ));

        let config = SimulationConfig {
            sample_count: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.run(),
            Err(SimulationError::InvalidTimeGrid(_))
        ));
    }

    #[test]
    fn test_sensitive_dependence_on_initial_conditions() {
        let config = SimulationConfig::default();
        let mut perturbed = config.clone();
        perturbed.initial_state.theta2 += 1e-9;

        let nominal = config.run().unwrap();
        let nudged = perturbed.run().unwrap();
        let final_gap = (nominal.geometry.frames()[599].bob2 - nudged.geometry.frames()[599].bob2)
            .norm();
        more_asserts::assert_gt!(final_gap, 1e-6);
    }
}
