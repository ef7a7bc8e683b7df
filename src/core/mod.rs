#[cfg(test)]
pub mod dynamical_systems;
pub mod file_io;
pub mod image_utils;
pub mod ode_solvers;
pub mod stopwatch;
