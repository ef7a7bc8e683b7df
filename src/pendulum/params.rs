//! Parameter files. Every field has a default, and the defaults reproduce the
//! video export configuration, so a parameter file only lists what it changes.

use serde::{Deserialize, Serialize};

use crate::core::ode_solvers::{DormandPrince, Tolerances};

use super::{
    error::SimulationError,
    geometry::{map_trajectory, FrameGeometry},
    physics::{PendulumState, PhysicalParameters},
    solver::{solve_trajectory, Trajectory},
    time_grid::TimeGrid,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicalParameters,
    pub initial_state: PendulumState,
    pub horizon: f64,
    pub sample_count: usize,
    pub tolerances: Tolerances,
    pub max_step_count: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            physics: PhysicalParameters::default(),
            initial_state: PendulumState::default(),
            horizon: 20.0,
            sample_count: 600,
            tolerances: Tolerances::default(),
            max_step_count: DormandPrince::default().max_step_count,
        }
    }
}

/// Output of a complete simulation: the angular trajectory and the matching
/// bob positions.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub trajectory: Trajectory,
    pub geometry: FrameGeometry,
}

impl SimulationConfig {
    pub fn time_grid(&self) -> Result<TimeGrid, SimulationError> {
        TimeGrid::new(self.horizon, self.sample_count)
    }

    pub fn integrator(&self) -> DormandPrince {
        DormandPrince {
            tolerances: self.tolerances,
            max_step_count: self.max_step_count,
            ..DormandPrince::default()
        }
    }

    pub fn run(&self) -> Result<SimulationResult, SimulationError> {
        let grid = self.time_grid()?;
        let trajectory = solve_trajectory(
            &self.physics,
            &self.initial_state,
            &grid,
            &self.integrator(),
        )?;
        let geometry = map_trajectory(&self.physics, &trajectory);
        Ok(SimulationResult {
            trajectory,
            geometry,
        })
    }
}

/// How the frame sequence is played back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlaybackParams {
    /// Number of preceding samples of bob 2 drawn as a trail.
    pub trail_length: usize,
    pub frame_interval_ms: u32,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        PlaybackParams {
            trail_length: 60,
            frame_interval_ms: 33,
        }
    }
}

/// Look of the rendered figure. Lengths are in pixels of the output image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnimationStyle {
    /// The figure is square.
    pub figure_size_px: u32,
    /// Both axes span [-axis_limit, axis_limit].
    pub axis_limit: f64,
    pub title: Option<String>,
    /// TrueType font used to draw `title` into video frames. Without one, video
    /// frames carry no title; the HTML player always shows it.
    pub title_font_path: Option<String>,
    pub title_size_px: f32,
    pub title_color: [u8; 3],
    pub background_color: [u8; 3],
    pub rod_color: [u8; 3],
    pub rod_width_px: f32,
    pub bob_radius_px: u32,
    pub trail_color: [u8; 3],
    /// Opacity of the newest trail segment; older segments fade toward zero.
    pub trail_alpha: f32,
    pub trail_width_px: f32,
    pub grid_color: [u8; 3],
    pub grid_alpha: f32,
}

impl Default for AnimationStyle {
    fn default() -> Self {
        AnimationStyle {
            figure_size_px: 600,
            axis_limit: 2.2,
            title: Some("Scientific Phenomenon: Double Pendulum (Chaos Theory)".to_owned()),
            title_font_path: None,
            title_size_px: 17.0,
            title_color: [0, 0, 0],
            background_color: [255, 255, 255],
            rod_color: [0x1f, 0x77, 0xb4],
            rod_width_px: 3.0,
            bob_radius_px: 7,
            trail_color: [0xd6, 0x27, 0x28],
            trail_alpha: 0.6,
            trail_width_px: 1.0,
            grid_color: [0xb0, 0xb0, 0xb0],
            grid_alpha: 0.5,
        }
    }
}

/// Self-contained HTML document with a canvas player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InlineHtmlParams {
    pub file_name: String,
}

impl Default for InlineHtmlParams {
    fn default() -> Self {
        InlineHtmlParams {
            file_name: "double_pendulum.html".to_owned(),
        }
    }
}

/// Video file produced by piping raw frames into an external encoder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VideoParams {
    pub file_name: String,
    pub fps: u32,
    pub bitrate_kbps: u32,
    /// Stored in the container metadata.
    pub artist: String,
    /// Executable of the encoder; looked up on `PATH` when not a path.
    pub encoder_program: String,
    pub codec: String,
}

impl Default for VideoParams {
    fn default() -> Self {
        VideoParams {
            file_name: "double_pendulum_chaos.mp4".to_owned(),
            fps: 30,
            bitrate_kbps: 2000,
            artist: "Scientific Sim".to_owned(),
            encoder_program: "ffmpeg".to_owned(),
            codec: "libx264".to_owned(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum OutputSpecification {
    InlineHtml(InlineHtmlParams),
    Video(VideoParams),
}

impl Default for OutputSpecification {
    fn default() -> Self {
        OutputSpecification::Video(VideoParams::default())
    }
}

/// Contents of a parameter file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct DoublePendulumParams {
    pub simulation: SimulationConfig,
    pub playback: PlaybackParams,
    pub style: AnimationStyle,
    pub output: OutputSpecification,
}

impl DoublePendulumParams {
    /// Interactive variant: 500 samples, 50 sample trail, 30 ms per frame, HTML output.
    pub fn inline_preset() -> DoublePendulumParams {
        DoublePendulumParams {
            simulation: SimulationConfig {
                sample_count: 500,
                ..SimulationConfig::default()
            },
            playback: PlaybackParams {
                trail_length: 50,
                frame_interval_ms: 30,
            },
            style: AnimationStyle {
                figure_size_px: 500,
                title: None,
                bob_radius_px: 5,
                trail_alpha: 0.4,
                ..AnimationStyle::default()
            },
            output: OutputSpecification::InlineHtml(InlineHtmlParams::default()),
        }
    }

    /// Export variant: 600 samples, 60 sample trail, 30 fps H.264 video.
    pub fn export_preset() -> DoublePendulumParams {
        DoublePendulumParams::default()
    }
}
