use serde::{Deserialize, Serialize};

/// Pixel dimensions of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Diagonal length of the surface.
    pub fn diagonal(&self) -> f64 {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        (w * w + h * h).sqrt()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Viewport state derived from the current surface.
///
/// Recomputed on every surface assignment. Drawing code reads the cached
/// `radius` instead of deriving it per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Origin is always (0, 0); only the extent varies.
    pub size: ViewportSize,
    /// Window radius: the diagonal length of the surface.
    pub radius: f64,
}

impl Viewport {
    pub fn from_size(size: ViewportSize) -> Self {
        Self {
            size,
            radius: size.diagonal(),
        }
    }

    /// The `(x, y, width, height)` rectangle handed to the graphics backend.
    pub fn rect(&self) -> (i32, i32, u32, u32) {
        (0, 0, self.size.width, self.size.height)
    }
}
