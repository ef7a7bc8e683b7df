#[path = "../common/mod.rs"]
mod common;

/// Export variant: `double_pendulum_chaos.mp4`. Requires `ffmpeg` on the `PATH`.
/// ```sh
/// cargo run --release --example render-chaos-video
/// ```
pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    common::render_demo_from_string("render-chaos-video")
}
