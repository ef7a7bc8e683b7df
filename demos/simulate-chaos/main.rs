#[path = "../common/mod.rs"]
mod common;

/// Trajectory and frame geometry as JSON, with an energy drift report.
/// ```sh
/// cargo run --example simulate-chaos
/// ```
pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    common::simulate_demo_from_string("simulate-chaos")
}
