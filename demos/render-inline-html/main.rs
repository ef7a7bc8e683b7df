#[path = "../common/mod.rs"]
mod common;

/// Interactive variant: a self-contained HTML player.
/// ```sh
/// cargo run --example render-inline-html
/// ```
pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    common::render_demo_from_string("render-inline-html")
}
