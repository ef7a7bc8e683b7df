use std::{error::Error, path::PathBuf};

use crate::{
    core::{
        file_io::{serialize_to_json, FilePrefix},
        stopwatch::Stopwatch,
    },
    pendulum::{
        html::export_inline_html,
        params::{DoublePendulumParams, OutputSpecification},
        video::{export_video, FfmpegEncoder},
    },
};

use super::simulate::{run_simulation, write_diagnostics};

/// Simulates the pendulum and writes the configured output next to the
/// resolved parameters and a diagnostics file. Returns the output path.
pub fn render_pendulum(
    params: &DoublePendulumParams,
    file_prefix: &FilePrefix,
) -> Result<PathBuf, Box<dyn Error>> {
    let mut stopwatch = Stopwatch::new("Double Pendulum Render");
    serialize_to_json(&file_prefix.with_suffix(".json"), params)?;

    let result = run_simulation(&params.simulation, &mut stopwatch)?;
    let extent = result.geometry.max_extent();
    if extent > params.style.axis_limit {
        log::warn!(
            "The pendulum reaches {:.3}, beyond the axis limit of {}; frames will clip it",
            extent,
            params.style.axis_limit
        );
    }

    let output_path = match &params.output {
        OutputSpecification::InlineHtml(inner_params) => {
            let output_path = file_prefix.sibling(&inner_params.file_name);
            export_inline_html(&result.geometry, &params.playback, &params.style, &output_path)?;
            stopwatch.record_split("write html");
            output_path
        }
        OutputSpecification::Video(inner_params) => {
            let output_path = file_prefix.sibling(&inner_params.file_name);
            println!("Starting save process... this may take a moment.");
            export_video(
                &result.geometry,
                &params.playback,
                &params.style,
                &FfmpegEncoder::new(inner_params),
                &output_path,
            )?;
            stopwatch.record_split("encode video");
            println!("Success! File saved as '{}'", output_path.display());
            output_path
        }
    };

    write_diagnostics(file_prefix, &stopwatch, &params.simulation, &result)?;
    Ok(output_path)
}
