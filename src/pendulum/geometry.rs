use nalgebra::Vector2;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::{
    physics::{PendulumState, PhysicalParameters},
    solver::Trajectory,
};

/// Planar positions of both bobs, with the pivot at the origin and +y up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BobPositions {
    pub bob1: Vector2<f64>,
    pub bob2: Vector2<f64>,
}

impl BobPositions {
    pub fn from_state(params: &PhysicalParameters, state: &PendulumState) -> BobPositions {
        let (sin1, cos1) = state.theta1.sin_cos();
        let (sin2, cos2) = state.theta2.sin_cos();
        let bob1 = Vector2::new(params.rod1_length() * sin1, -params.rod1_length() * cos1);
        let bob2 = bob1 + Vector2::new(params.rod2_length() * sin2, -params.rod2_length() * cos2);
        BobPositions { bob1, bob2 }
    }
}

/// Cartesian geometry for every sample of a trajectory, in sample order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    times: Vec<f64>,
    frames: Vec<BobPositions>,
}

/// Converts every angular sample into bob positions. Each sample is
/// independent, so the work is spread over the rayon thread pool; the output
/// order always matches the trajectory.
pub fn map_trajectory(params: &PhysicalParameters, trajectory: &Trajectory) -> FrameGeometry {
    let frames = trajectory
        .states()
        .par_iter()
        .map(|state| BobPositions::from_state(params, state))
        .collect();
    FrameGeometry {
        times: trajectory.times().to_vec(),
        frames,
    }
}

/// Samples that make up the trail behind frame `index`: up to `window` samples
/// strictly before it. Early frames get whatever history exists.
pub fn trail_window(index: usize, window: usize) -> Range<usize> {
    index.saturating_sub(window)..index
}

impl FrameGeometry {
    pub fn frames(&self) -> &[BobPositions] {
        &self.frames
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Positions of bob 2 over the trail window of frame `index`, oldest first.
    pub fn trail(&self, index: usize, window: usize) -> &[BobPositions] {
        let range = trail_window(index.min(self.frames.len()), window);
        &self.frames[range]
    }

    /// Largest absolute coordinate reached by either bob.
    pub fn max_extent(&self) -> f64 {
        self.frames
            .iter()
            .flat_map(|f| [f.bob1.amax(), f.bob2.amax()])
            .fold(0.0, f64::max)
    }
}
