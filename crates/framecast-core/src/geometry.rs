use crate::CameraShape;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round both dimensions down to even values (required by yuv420p).
    pub fn even(self) -> Self {
        Self {
            width: even(self.width),
            height: even(self.height),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid width {:?}: {}", w, e))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid height {:?}: {}", h, e))?;
        if width == 0 || height == 0 {
            return Err(format!("dimensions must be non-zero, got {:?}", s));
        }
        Ok(Self { width, height })
    }
}

/// A position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Overlay position and size expressed in output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    /// Side length of the square overlay.
    pub size: u32,
    /// Left edge on the output canvas.
    pub x: i32,
    /// Top edge on the output canvas.
    pub y: i32,
}

/// Overlay geometry as laid out in the UI preview, plus the two spaces needed
/// to translate it into output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayGeometry {
    /// Side length of the overlay in preview pixels.
    pub size: u32,
    /// Top-left corner in preview pixels.
    pub position: Point,
    /// Mask applied to the overlay.
    pub shape: CameraShape,
    /// Size of the preview canvas the geometry was measured in.
    pub preview: Size,
    /// Size of the output canvas the overlay is composited onto.
    pub canvas: Size,
}

impl OverlayGeometry {
    /// Map the preview geometry into output pixels.
    pub fn placement(&self) -> OverlayPlacement {
        map_to_canvas(self.size, self.position, self.preview, self.canvas)
    }
}

/// Translate a square overlay from preview space into canvas space.
///
/// Scales by the ratio of canvas to preview size on each axis, keeps the side
/// length even and clamps the overlay inside the canvas.
pub(crate) fn map_to_canvas(
    size: u32,
    position: Point,
    preview: Size,
    canvas: Size,
) -> OverlayPlacement {
    let ratio_x = f64::from(canvas.width) / f64::from(preview.width.max(1));
    let ratio_y = f64::from(canvas.height) / f64::from(preview.height.max(1));

    let max_side = canvas.width.min(canvas.height);
    let side = even(((f64::from(size) * ratio_x).round() as u32).clamp(2, max_side.max(2)));

    let x = (f64::from(position.x) * ratio_x).round() as i64;
    let y = (f64::from(position.y) * ratio_y).round() as i64;
    let max_x = i64::from(canvas.width.saturating_sub(side));
    let max_y = i64::from(canvas.height.saturating_sub(side));

    OverlayPlacement {
        size: side,
        x: x.clamp(0, max_x) as i32,
        y: y.clamp(0, max_y) as i32,
    }
}

fn even(value: u32) -> u32 {
    value - value % 2
}
