//! Frame sequence consumed by the renderers. The renderer pulls one frame per
//! tick; restarting playback is just asking the geometry for a new sequence.

use nalgebra::Vector2;

use super::geometry::{BobPositions, FrameGeometry};

/// Everything needed to draw one animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame<'a> {
    pub index: usize,
    pub time: f64,
    /// Polyline pivot -> bob 1 -> bob 2.
    pub linkage: [Vector2<f64>; 3],
    /// Recent history, oldest first. Only `bob2` is drawn.
    pub trail: &'a [BobPositions],
}

impl<'a> AnimationFrame<'a> {
    pub fn trail_points(&self) -> impl Iterator<Item = Vector2<f64>> + 'a {
        let trail: &'a [BobPositions] = self.trail;
        trail.iter().map(|positions| positions.bob2)
    }
}

#[derive(Debug, Clone)]
pub struct FrameSequence<'a> {
    geometry: &'a FrameGeometry,
    trail_length: usize,
    next_index: usize,
}

impl FrameGeometry {
    pub fn animation_frames(&self, trail_length: usize) -> FrameSequence<'_> {
        FrameSequence {
            geometry: self,
            trail_length,
            next_index: 0,
        }
    }
}

impl<'a> FrameSequence<'a> {
    pub fn frame(&self, index: usize) -> Option<AnimationFrame<'a>> {
        let positions = self.geometry.frames().get(index)?;
        let geometry: &'a FrameGeometry = self.geometry;
        Some(AnimationFrame {
            index,
            time: geometry.times()[index],
            linkage: [Vector2::zeros(), positions.bob1, positions.bob2],
            trail: geometry.trail(index, self.trail_length),
        })
    }
}

impl<'a> Iterator for FrameSequence<'a> {
    type Item = AnimationFrame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frame(self.next_index)?;
        self.next_index += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.geometry.len().saturating_sub(self.next_index);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for FrameSequence<'a> {}
