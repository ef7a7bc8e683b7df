//! Video export: frames are rasterized on the CPU and streamed as raw RGB into
//! an external encoder process. The encoder writes to a `.partial` file which
//! is renamed into place only once encoding succeeded.

use image::RgbImage;
use std::{
    ffi::OsString,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use super::{
    error::SimulationError,
    geometry::FrameGeometry,
    params::{AnimationStyle, PlaybackParams, VideoParams},
    raster::FrameRenderer,
};

pub trait VideoEncoder {
    /// Used in error messages.
    fn name(&self) -> String;

    /// Consumes every frame and writes the encoded video to `output`.
    /// Returns the number of frames written.
    fn encode<F>(
        &self,
        width: u32,
        height: u32,
        frames: F,
        output: &Path,
    ) -> Result<usize, SimulationError>
    where
        F: Iterator<Item = RgbImage>;
}

/// Encodes through `ffmpeg` (or any program with the same command line).
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    pub params: VideoParams,
}

impl FfmpegEncoder {
    pub fn new(params: &VideoParams) -> FfmpegEncoder {
        FfmpegEncoder {
            params: params.clone(),
        }
    }

    pub fn arguments(&self, width: u32, height: u32, output: &Path) -> Vec<OsString> {
        let params = &self.params;
        let mut args: Vec<OsString> = [
            "-y".to_owned(),
            "-loglevel".to_owned(),
            "error".to_owned(),
            "-f".to_owned(),
            "rawvideo".to_owned(),
            "-pix_fmt".to_owned(),
            "rgb24".to_owned(),
            "-s".to_owned(),
            format!("{}x{}", width, height),
            "-r".to_owned(),
            params.fps.to_string(),
            "-i".to_owned(),
            "-".to_owned(),
            "-c:v".to_owned(),
            params.codec.clone(),
            "-pix_fmt".to_owned(),
            "yuv420p".to_owned(),
            "-b:v".to_owned(),
            format!("{}k", params.bitrate_kbps),
            "-metadata".to_owned(),
            format!("artist={}", params.artist),
            "-f".to_owned(),
            "mp4".to_owned(),
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn name(&self) -> String {
        format!("`{}`", self.params.encoder_program)
    }

    fn encode<F>(
        &self,
        width: u32,
        height: u32,
        frames: F,
        output: &Path,
    ) -> Result<usize, SimulationError>
    where
        F: Iterator<Item = RgbImage>,
    {
        let program = &self.params.encoder_program;
        let mut child = Command::new(program)
            .args(self.arguments(width, height, output))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|err| {
                SimulationError::EncodingFault(format!("failed to start `{}`: {}", program, err))
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            SimulationError::EncodingFault(format!("no stdin pipe to `{}`", program))
        })?;

        let mut frame_count = 0;
        let mut write_error = None;
        {
            let mut writer = BufWriter::new(stdin);
            for frame in frames {
                if let Err(err) = writer.write_all(frame.as_raw()) {
                    write_error = Some(err);
                    break;
                }
                frame_count += 1;
            }
            if write_error.is_none() {
                write_error = writer.flush().err();
            }
            // Dropping the writer closes the pipe, which ends the encoder input.
        }

        let status = child.wait().map_err(|err| {
            SimulationError::EncodingFault(format!("failed to wait on `{}`: {}", program, err))
        })?;
        if !status.success() {
            return Err(SimulationError::EncodingFault(format!(
                "`{}` exited with {}",
                program, status
            )));
        }
        if let Some(err) = write_error {
            return Err(SimulationError::EncodingFault(format!(
                "failed to stream frames to `{}`: {}",
                program, err
            )));
        }
        Ok(frame_count)
    }
}

pub fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Renders every frame of `geometry` and encodes them to `output`. On failure
/// no file is left at `output` and the partial file is removed.
pub fn export_video<E: VideoEncoder>(
    geometry: &FrameGeometry,
    playback: &PlaybackParams,
    style: &AnimationStyle,
    encoder: &E,
    output: &Path,
) -> Result<usize, SimulationError> {
    let renderer = FrameRenderer::new(style)?;
    let partial = partial_path(output);
    let frames = geometry
        .animation_frames(playback.trail_length)
        .map(|frame| renderer.render(&frame));

    log::info!(
        "Encoding {} frames of {}x{} pixels...",
        geometry.len(),
        renderer.width(),
        renderer.height()
    );
    match encoder.encode(renderer.width(), renderer.height(), frames, &partial) {
        Ok(_) if !partial.exists() => Err(SimulationError::EncodingFault(format!(
            "{} produced no output at {}",
            encoder.name(),
            partial.display()
        ))),
        Ok(frame_count) => {
            std::fs::rename(&partial, output)?;
            log::info!("Wrote video file to: {}", output.display());
            Ok(frame_count)
        }
        Err(err) => {
            if partial.exists() {
                if let Err(remove_err) = std::fs::remove_file(&partial) {
                    log::warn!(
                        "Unable to remove partial output {}: {}",
                        partial.display(),
                        remove_err
                    );
                }
            }
            Err(err)
        }
    }
}
