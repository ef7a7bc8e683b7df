use std::path::PathBuf;

use double_pendulum::{
    cli::{load_params, render::render_pendulum, simulate::simulate_pendulum},
    core::file_io::FilePrefix,
    pendulum::params::DoublePendulumParams,
};

pub fn build_output_path(project: &str) -> PathBuf {
    let directory_path: PathBuf = ["out", project].iter().collect();
    std::fs::create_dir_all(&directory_path).unwrap();
    directory_path
}

fn demo_params_and_prefix(demo_name: &str) -> (DoublePendulumParams, FilePrefix) {
    let params_name = String::from("demos/") + demo_name + "/params.json";
    let params = load_params(&params_name).unwrap();
    let file_prefix = FilePrefix {
        directory_path: build_output_path(demo_name),
        file_base: String::from("result"),
    };
    (params, file_prefix)
}

#[allow(dead_code)]
pub fn render_demo_from_string(demo_name: &str) {
    let (params, file_prefix) = demo_params_and_prefix(demo_name);
    render_pendulum(&params, &file_prefix).unwrap();
}

#[allow(dead_code)]
pub fn simulate_demo_from_string(demo_name: &str) {
    let (params, file_prefix) = demo_params_and_prefix(demo_name);
    simulate_pendulum(&params, &file_prefix).unwrap();
}
