//! CPU rasterization of animation frames, used by the video export.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size};
use nalgebra::Vector2;
use rusttype::{Font, Scale};

use crate::core::image_utils::{ImageSpecification, PixelMapper};

use super::{animation::AnimationFrame, error::SimulationError, params::AnimationStyle};

const DASH_LENGTH_PX: f32 = 6.0;
const GAP_LENGTH_PX: f32 = 4.0;

/// Linear blend from `background` (alpha = 0) to `foreground` (alpha = 1).
pub fn blend(background: Rgb<u8>, foreground: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, f: u8| ((b as f32) * (1.0 - alpha) + (f as f32) * alpha).round() as u8;
    Rgb([
        mix(background[0], foreground[0]),
        mix(background[1], foreground[1]),
        mix(background[2], foreground[2]),
    ])
}

/// Draws a thick segment as a bundle of parallel one pixel lines.
fn draw_thick_line_segment(
    img: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness_px: f32,
    color: Rgb<u8>,
) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-3 {
        return;
    }

    // Unit normal, used for the parallel offsets.
    let nx = -dy / len;
    let ny = dx / len;

    let half = ((thickness_px.max(1.0) - 1.0) * 0.5).round() as i32;
    for k in -half..=half {
        let off = k as f32;
        draw_line_segment_mut(
            img,
            (start.0 + nx * off, start.1 + ny * off),
            (end.0 + nx * off, end.1 + ny * off),
            color,
        );
    }
}

fn draw_dashed_line_segment(img: &mut RgbImage, start: (f32, f32), end: (f32, f32), color: Rgb<u8>) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-3 {
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let mut s = 0.0;
    while s < len {
        let e = (s + DASH_LENGTH_PX).min(len);
        draw_line_segment_mut(
            img,
            (start.0 + ux * s, start.1 + uy * s),
            (start.0 + ux * e, start.1 + uy * e),
            color,
        );
        s = e + GAP_LENGTH_PX;
    }
}

fn load_font(font_path: &str) -> Result<Font<'static>, SimulationError> {
    let bytes = std::fs::read(font_path).map_err(|err| {
        SimulationError::InvalidParameters(format!(
            "unable to read title font `{}`: {}",
            font_path, err
        ))
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| {
        SimulationError::InvalidParameters(format!("`{}` is not a TrueType font", font_path))
    })
}

/// Centered along the top edge.
fn draw_title(img: &mut RgbImage, font: &Font, title: &str, size_px: f32, color: Rgb<u8>) {
    let scale = Scale::uniform(size_px);
    let (text_width, _) = text_size(scale, font, title);
    let x = ((img.width() as i32 - text_width) / 2).max(0);
    let y = (0.5 * size_px) as i32;
    draw_text_mut(img, color, x, y, scale, font, title);
}

/// Renders `AnimationFrame`s into RGB images of a fixed size. The static
/// background (grid) is drawn once and copied for every frame.
pub struct FrameRenderer {
    style: AnimationStyle,
    pixel_mapper: PixelMapper,
    background: RgbImage,
}

impl FrameRenderer {
    pub fn new(style: &AnimationStyle) -> Result<FrameRenderer, SimulationError> {
        if style.figure_size_px < 2 {
            return Err(SimulationError::InvalidParameters(format!(
                "`figure_size_px` must be at least 2, got {}",
                style.figure_size_px
            )));
        }
        if !(style.axis_limit.is_finite() && style.axis_limit > 0.0) {
            return Err(SimulationError::InvalidParameters(format!(
                "`axis_limit` must be positive and finite, got {}",
                style.axis_limit
            )));
        }

        let size = style.figure_size_px;
        let image_specification = ImageSpecification {
            resolution: nalgebra::Vector2::new(size, size),
            center: nalgebra::Vector2::new(0.0, 0.0),
            width: 2.0 * style.axis_limit,
        };
        let pixel_mapper = PixelMapper::new(&image_specification);

        let background_color = Rgb(style.background_color);
        let mut background = RgbImage::from_pixel(size, size, background_color);
        let grid_color = blend(background_color, Rgb(style.grid_color), style.grid_alpha);
        let limit = style.axis_limit;
        let first_tick = (-limit).ceil() as i64;
        let last_tick = limit.floor() as i64;
        for tick in first_tick..=last_tick {
            let tick = tick as f64;
            let vertical = (
                pixel_mapper.inverse_map(&Vector2::new(tick, -limit)),
                pixel_mapper.inverse_map(&Vector2::new(tick, limit)),
            );
            let horizontal = (
                pixel_mapper.inverse_map(&Vector2::new(-limit, tick)),
                pixel_mapper.inverse_map(&Vector2::new(limit, tick)),
            );
            draw_dashed_line_segment(&mut background, vertical.0, vertical.1, grid_color);
            draw_dashed_line_segment(&mut background, horizontal.0, horizontal.1, grid_color);
        }

        if let Some(title) = &style.title {
            match &style.title_font_path {
                Some(font_path) => {
                    let font = load_font(font_path)?;
                    draw_title(
                        &mut background,
                        &font,
                        title,
                        style.title_size_px,
                        Rgb(style.title_color),
                    );
                }
                None => log::debug!("No `title_font_path` set; video frames omit the title"),
            }
        }

        Ok(FrameRenderer {
            style: style.clone(),
            pixel_mapper,
            background,
        })
    }

    pub fn width(&self) -> u32 {
        self.background.width()
    }

    pub fn height(&self) -> u32 {
        self.background.height()
    }

    pub fn to_pixel(&self, point: &Vector2<f64>) -> (f32, f32) {
        self.pixel_mapper.inverse_map(point)
    }

    pub fn render(&self, frame: &AnimationFrame) -> RgbImage {
        let mut img = self.background.clone();
        let background_color = Rgb(self.style.background_color);

        // Trail: oldest segment nearly transparent, newest at `trail_alpha`.
        let trail: Vec<(f32, f32)> = frame.trail_points().map(|p| self.to_pixel(&p)).collect();
        let segment_count = trail.len().saturating_sub(1);
        for (k, pair) in trail.windows(2).enumerate() {
            let fade = ((k + 1) as f32) / (segment_count as f32);
            let color = blend(
                background_color,
                Rgb(self.style.trail_color),
                self.style.trail_alpha * fade,
            );
            draw_thick_line_segment(&mut img, pair[0], pair[1], self.style.trail_width_px, color);
        }

        let rod_color = Rgb(self.style.rod_color);
        let joints: Vec<(f32, f32)> = frame.linkage.iter().map(|p| self.to_pixel(p)).collect();
        for pair in joints.windows(2) {
            draw_thick_line_segment(&mut img, pair[0], pair[1], self.style.rod_width_px, rod_color);
        }
        for joint in &joints {
            draw_filled_circle_mut(
                &mut img,
                (joint.0.round() as i32, joint.1.round() as i32),
                self.style.bob_radius_px as i32,
                rod_color,
            );
        }

        img
    }
}
