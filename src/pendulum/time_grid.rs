use iter_num_tools::lin_space;
use serde::Serialize;

use super::error::SimulationError;

/// Uniformly spaced sample times on `[0, horizon]`. Sets both the output
/// resolution of the solver and the number of animation frames.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    pub fn new(horizon: f64, sample_count: usize) -> Result<TimeGrid, SimulationError> {
        if sample_count == 0 {
            return Err(SimulationError::InvalidTimeGrid(
                "`sample_count` must be at least one".to_owned(),
            ));
        }
        if !(horizon.is_finite() && horizon > 0.0) {
            return Err(SimulationError::InvalidTimeGrid(format!(
                "`horizon` must be positive and finite, got {}",
                horizon
            )));
        }
        let times = if sample_count == 1 {
            vec![0.0]
        } else {
            lin_space(0.0..=horizon, sample_count).collect()
        };
        Ok(TimeGrid { times })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn horizon(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_grid() {
        let grid = TimeGrid::new(20.0, 500).unwrap();
        assert_eq!(grid.len(), 500);
        assert_eq!(grid.times()[0], 0.0);
        assert_relative_eq!(grid.horizon(), 20.0, epsilon = 1e-12);
        assert!(grid.times().windows(2).all(|pair| pair[0] < pair[1]));
        let dt = 20.0 / 499.0;
        assert_relative_eq!(grid.times()[1], dt, epsilon = 1e-12);
    }

    #[test]
    fn test_single_sample_grid() {
        let grid = TimeGrid::new(20.0, 1).unwrap();
        assert_eq!(grid.times(), &[0.0]);
    }

    #[test]
    fn test_invalid_grids() {
        assert!(TimeGrid::new(20.0, 0).is_err());
        assert!(TimeGrid::new(0.0, 10).is_err());
        assert!(TimeGrid::new(-1.0, 10).is_err());
        assert!(TimeGrid::new(f64::NAN, 10).is_err());
    }
}
