pub mod animation;
pub mod error;
pub mod geometry;
pub mod html;
pub mod params;
pub mod physics;
pub mod raster;
pub mod solver;
pub mod time_grid;
pub mod video;
