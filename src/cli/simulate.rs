use std::{error::Error, io::Write};

use crate::{
    core::{
        file_io::{serialize_to_json, FilePrefix},
        stopwatch::Stopwatch,
    },
    pendulum::{
        error::SimulationError,
        geometry::map_trajectory,
        params::{DoublePendulumParams, SimulationConfig, SimulationResult},
        solver::{solve_trajectory, EnergyReport},
    },
};

/// Same as `SimulationConfig::run`, with a stopwatch split per phase.
pub fn run_simulation(
    config: &SimulationConfig,
    stopwatch: &mut Stopwatch,
) -> Result<SimulationResult, SimulationError> {
    let grid = config.time_grid()?;
    stopwatch.record_split("setup");

    let trajectory = solve_trajectory(
        &config.physics,
        &config.initial_state,
        &grid,
        &config.integrator(),
    )?;
    stopwatch.record_split("integration");

    let geometry = map_trajectory(&config.physics, &trajectory);
    stopwatch.record_split("coordinate mapping");

    Ok(SimulationResult {
        trajectory,
        geometry,
    })
}

/// Timing splits, solver statistics, and the energy drift of one run.
pub fn write_diagnostics(
    file_prefix: &FilePrefix,
    stopwatch: &Stopwatch,
    config: &SimulationConfig,
    result: &SimulationResult,
) -> std::io::Result<()> {
    let mut writer = file_prefix.create_file_with_suffix("_diagnostics.txt")?;
    stopwatch.display(&mut writer)?;

    let stats = result.trajectory.stats();
    writeln!(writer, "Solver:")?;
    writeln!(writer, "  samples: {}", result.trajectory.len())?;
    writeln!(writer, "  accepted steps: {}", stats.accepted_steps)?;
    writeln!(writer, "  rejected steps: {}", stats.rejected_steps)?;
    writeln!(writer, "  derivative evaluations: {}", stats.function_evaluations)?;

    let energy = EnergyReport::new(&config.physics, &result.trajectory);
    writeln!(writer, "Geometry:")?;
    writeln!(writer, "  max extent: {:.6}", result.geometry.max_extent())?;

    writeln!(writer, "Energy:")?;
    writeln!(writer, "  initial: {:.12}", energy.initial_energy)?;
    writeln!(
        writer,
        "  max drift: {:.3e} ({:.3e} of scale) at t = {:.4}",
        energy.max_abs_drift, energy.max_relative_drift, energy.time_of_max_drift
    )?;
    writer.flush()
}

/// Simulate only: writes the resolved parameters, the trajectory, the frame
/// geometry, and a diagnostics file under `file_prefix`.
pub fn simulate_pendulum(
    params: &DoublePendulumParams,
    file_prefix: &FilePrefix,
) -> Result<SimulationResult, Box<dyn Error>> {
    let mut stopwatch = Stopwatch::new("Double Pendulum Simulation");
    serialize_to_json(&file_prefix.with_suffix(".json"), params)?;

    let result = run_simulation(&params.simulation, &mut stopwatch)?;
    serialize_to_json(&file_prefix.with_suffix("_trajectory.json"), &result.trajectory)?;
    serialize_to_json(&file_prefix.with_suffix("_geometry.json"), &result.geometry)?;
    stopwatch.record_split("write output");

    write_diagnostics(file_prefix, &stopwatch, &params.simulation, &result)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_simulate_writes_all_outputs() {
        let directory_path: PathBuf = std::env::temp_dir()
            .join("double_pendulum_cli_tests")
            .join("simulate");
        std::fs::create_dir_all(&directory_path).unwrap();
        let file_prefix = FilePrefix {
            directory_path,
            file_base: "tiny".to_owned(),
        };

        let mut params = DoublePendulumParams::export_preset();
        params.simulation.sample_count = 20;
        params.simulation.horizon = 1.0;
        let result = simulate_pendulum(&params, &file_prefix).unwrap();
        assert_eq!(result.geometry.len(), 20);

        for suffix in [".json", "_trajectory.json", "_geometry.json", "_diagnostics.txt"] {
            assert!(file_prefix.with_suffix(suffix).exists(), "missing {}", suffix);
        }
        let diagnostics =
            std::fs::read_to_string(file_prefix.with_suffix("_diagnostics.txt")).unwrap();
        assert!(diagnostics.contains("  integration: "));
        assert!(diagnostics.contains("  samples: 20"));
        assert!(diagnostics.contains("max drift:"));
        assert!(diagnostics.contains("  max extent: "));
    }
}
