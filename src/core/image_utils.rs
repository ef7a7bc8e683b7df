/// Image resolution plus the window of "real" space it shows. The height of
/// that window follows from the aspect ratio of the image and `width`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpecification {
    pub resolution: nalgebra::Vector2<u32>,
    pub center: nalgebra::Vector2<f64>,
    pub width: f64,
}

impl ImageSpecification {
    pub fn height(&self) -> f64 {
        self.width * (self.resolution[1] as f64) / (self.resolution[0] as f64)
    }
}

/// Affine map from a coordinate in "real" space to a fractional pixel index.
#[derive(Clone, Debug)]
pub struct LinearPixelMap {
    offset: f64,
    slope: f64,
}

impl LinearPixelMap {
    /// `x0` lands on pixel 0 and `x1` on pixel `n - 1`.
    pub fn new(n: u32, x0: f64, x1: f64) -> LinearPixelMap {
        more_asserts::assert_gt!(n, 1);
        let offset = x0;
        let slope = (x1 - x0) / ((n - 1) as f64);
        LinearPixelMap { offset, slope }
    }

    pub fn new_from_center_and_width(n: u32, center: f64, width: f64) -> LinearPixelMap {
        LinearPixelMap::new(n, center - 0.5 * width, center + 0.5 * width)
    }

    /// Map from point to a fractional pixel coordinate. Not clamped to the image.
    pub fn inverse_map(&self, point: f64) -> f64 {
        (point - self.offset) / self.slope
    }
}

#[derive(Clone, Debug)]
pub struct PixelMapper {
    width: LinearPixelMap,
    height: LinearPixelMap,
}

impl PixelMapper {
    pub fn new(image_specification: &ImageSpecification) -> PixelMapper {
        PixelMapper {
            width: LinearPixelMap::new_from_center_and_width(
                image_specification.resolution[0],
                image_specification.center[0],
                image_specification.width,
            ),
            height: LinearPixelMap::new_from_center_and_width(
                image_specification.resolution[1],
                image_specification.center[1],
                -image_specification.height(), // Image coordinates are upside down.
            ),
        }
    }

    /// Point in "real" space to (column, row) in image space, as used by the drawing routines.
    pub fn inverse_map(&self, point: &nalgebra::Vector2<f64>) -> (f32, f32) {
        (
            self.width.inverse_map(point[0]) as f32,
            self.height.inverse_map(point[1]) as f32,
        )
    }
}
