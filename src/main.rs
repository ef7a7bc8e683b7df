use std::error::Error;

use clap::Parser;
use double_pendulum::cli::{
    args::{CommandsEnum, DoublePendulumArgs},
    build_file_prefix, load_params,
    render::render_pendulum,
    simulate::simulate_pendulum,
};

fn run(args: &DoublePendulumArgs) -> Result<(), Box<dyn Error>> {
    match &args.command {
        Some(CommandsEnum::Render(params)) => {
            let pendulum_params = load_params(&params.params_path)?;
            let file_prefix =
                build_file_prefix(&params.params_path, "render", params.date_time_out)?;
            render_pendulum(&pendulum_params, &file_prefix)?;
        }

        Some(CommandsEnum::Simulate(params)) => {
            let pendulum_params = load_params(&params.params_path)?;
            let file_prefix =
                build_file_prefix(&params.params_path, "simulate", params.date_time_out)?;
            simulate_pendulum(&pendulum_params, &file_prefix)?;
        }

        None => {
            println!("Default command (nothing specified!)");
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = DoublePendulumArgs::parse();
    if let Err(err) = run(&args) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
