/// An axis-aligned pixel rectangle in image coordinates.
///
/// `x`/`y` may be negative for rectangles that hang off the top-left of an
/// image; use [`PixelRect::intersect`] to obtain the visible part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full extent of a `width x height` image.
    pub fn image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Square bounding box of a circle, grown by `pad` pixels on each side.
    pub fn around_circle(cx: i32, cy: i32, radius: i32, pad: i32) -> Self {
        let r = radius.max(0) + pad.max(0);
        Self::new(cx - r, cy - r, 2 * r + 1, 2 * r + 1)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles, or `None` when they do not overlap.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x1 >= x2 || y1 >= y2 {
            return None;
        }
        Some(PixelRect::new(x1, y1, x2 - x1, y2 - y1))
    }
}

/// Where an overlay lands on a target image after clipping.
///
/// `target` is the visible rectangle in image coordinates; `source_x` and
/// `source_y` give the overlay pixel that maps onto `target`'s top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub target: PixelRect,
    pub source_x: i32,
    pub source_y: i32,
}

impl Placement {
    /// Places an `overlay_w x overlay_h` overlay so that its `anchor` pixel
    /// sits on `center`, clipped to `bounds`.
    ///
    /// The overlay keeps its full size off-image instead of shrinking, so the
    /// visible part stays aligned with the anchor. Returns `None` when nothing
    /// of the overlay is visible.
    pub fn anchored(
        overlay_w: u32,
        overlay_h: u32,
        anchor: (i32, i32),
        center: (i32, i32),
        bounds: &PixelRect,
    ) -> Option<Placement> {
        let full = PixelRect::new(
            center.0 - anchor.0,
            center.1 - anchor.1,
            overlay_w as i32,
            overlay_h as i32,
        );
        let target = full.intersect(bounds)?;
        Some(Placement {
            target,
            source_x: target.x - full.x,
            source_y: target.y - full.y,
        })
    }
}
