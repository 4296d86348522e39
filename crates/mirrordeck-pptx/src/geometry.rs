//! Horizontal mirroring of shape positions.
//!
//! All values are EMU. Mirroring reflects a shape across the vertical
//! center line of the slide so visual flow reverses direction.

use serde::{Deserialize, Serialize};

/// Position and size of a shape on the slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Distance from the left edge of the slide
    pub offset_x: i64,
    /// Distance from the top edge of the slide
    pub offset_y: i64,
    /// Shape width
    pub width: i64,
    /// Shape height
    pub height: i64,
}

impl Position {
    /// Create a position from `(x, y, cx, cy)`
    pub fn new(offset_x: i64, offset_y: i64, width: i64, height: i64) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// Same shape reflected across the slide's vertical center line
    pub fn mirrored(&self, container_width: i64) -> Self {
        Self {
            offset_x: mirror_offset(container_width, self.offset_x, self.width),
            ..*self
        }
    }
}

/// Mirrored left offset of a shape within a container.
///
/// `container_width - (offset_x + width)`, clamped to
/// `[0, container_width - width]`. A shape wider than the container is
/// placed at 0.
pub fn mirror_offset(container_width: i64, offset_x: i64, width: i64) -> i64 {
    let max = container_width.saturating_sub(width);
    if max < 0 {
        return 0;
    }
    container_width
        .saturating_sub(offset_x.saturating_add(width))
        .clamp(0, max)
}
