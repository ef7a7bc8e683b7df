pub mod args;
pub mod render;
pub mod simulate;

use std::error::Error;

use crate::{
    core::file_io::{
        build_output_path_with_date_time, extract_base_name, maybe_date_time_string, FilePrefix,
    },
    pendulum::params::DoublePendulumParams,
};

pub fn load_params(params_path: &str) -> Result<DoublePendulumParams, Box<dyn Error>> {
    let text = std::fs::read_to_string(params_path)
        .map_err(|err| format!("unable to read parameter file `{}`: {}", params_path, err))?;
    let params = serde_json::from_str(&text)
        .map_err(|err| format!("unable to parse parameter file `{}`: {}", params_path, err))?;
    Ok(params)
}

/// Output location for one command: `out/<command>/<params base name>[/<date_time>]`.
pub fn build_file_prefix(
    params_path: &str,
    command: &str,
    date_time_out: bool,
) -> std::io::Result<FilePrefix> {
    Ok(FilePrefix {
        directory_path: build_output_path_with_date_time(
            params_path,
            command,
            &maybe_date_time_string(date_time_out),
        )?,
        file_base: extract_base_name(params_path).to_owned(),
    })
}
