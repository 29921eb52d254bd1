use kurbo::{Point, Rect};

/// Layout snapshot for one frame.
///
/// `rendered` is where the character element sits on screen and `container` is
/// the element attachments are positioned in; both are read once per frame so
/// every item of that frame shares them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    /// Composition bounds in composition units (origin + size).
    pub composition: Rect,
    pub rendered: Rect,
    pub container: Rect,
}

impl FrameGeometry {
    pub fn new(composition: Rect, rendered: Rect, container: Rect) -> Self {
        Self {
            composition,
            rendered,
            container,
        }
    }

    /// Pixels per composition unit, or `None` while either side has no width.
    pub fn scale(&self) -> Option<f64> {
        let comp_width = self.composition.width();
        let rendered_width = self.rendered.width();
        if comp_width > 0.0 && rendered_width > 0.0 && rendered_width.is_finite() {
            Some(rendered_width / comp_width)
        } else {
            None
        }
    }

    /// Maps a composition-space point to pixels relative to the container's
    /// top-left corner.
    pub fn to_container(&self, point: Point) -> Option<Point> {
        let scale = self.scale()?;
        let left = self.rendered.x0 - self.container.x0;
        let top = self.rendered.y0 - self.container.y0;
        Some(Point::new(
            left + (point.x - self.composition.x0) * scale,
            top + (point.y - self.composition.y0) * scale,
        ))
    }
}
