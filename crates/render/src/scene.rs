use framehost_common::Viewport;

/// Background clear color (RGBA).
pub const CLEAR_COLOR: [f32; 4] = [0.9, 0.85, 0.46, 0.0];

/// Background rotation applied per frame.
pub const ROTATION_STEP_DEGREES: f32 = 1.5;

/// Per-loop scene state for the rotating background.
///
/// Owned by one drawer instance; there is no process-wide scene.
#[derive(Debug, Clone)]
pub struct BackgroundScene {
    rotation: f32,
    clear_color: [f32; 4],
    viewport: Viewport,
    frames: u64,
}

impl Default for BackgroundScene {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            clear_color: CLEAR_COLOR,
            viewport: Viewport::default(),
            frames: 0,
        }
    }
}

impl BackgroundScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clear_color(clear_color: [f32; 4]) -> Self {
        Self {
            clear_color,
            ..Self::default()
        }
    }

    /// Adopt the viewport of a newly assigned surface.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Step the animation by one frame.
    pub fn advance(&mut self) {
        self.rotation = (self.rotation + ROTATION_STEP_DEGREES) % 360.0;
        self.frames += 1;
    }

    /// Rotation in degrees, in `[0, 360)`.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Clear color with its RGB channels brightened as the background turns.
    pub fn modulated_color(&self) -> [f32; 4] {
        let pulse = 0.9 + 0.1 * self.rotation.to_radians().cos();
        let [r, g, b, a] = self.clear_color;
        [r * pulse, g * pulse, b * pulse, a]
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Radius of the current window, as needed to cover it with the background.
    pub fn window_radius(&self) -> f64 {
        self.viewport.radius
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
