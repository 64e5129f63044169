use glam::Vec2;

/// A single finger/pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// Finger pressed at a position.
    Down(Vec2),
    /// Finger lifted.
    Up,
    /// Finger moved to a position.
    Move(Vec2),
}

/// Tracks the state of the single active pointer.
///
/// Input never reaches the render loop; this only keeps enough state to log
/// strokes coherently and to feed optional touch handlers.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    pressed: bool,
    position: Option<Vec2>,
    moves_in_stroke: u32,
    strokes: u64,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &TouchEvent) {
        match *event {
            TouchEvent::Down(at) => {
                tracing::debug!("finger is down at {} {}", at.x, at.y);
                self.pressed = true;
                self.position = Some(at);
                self.moves_in_stroke = 0;
            }
            TouchEvent::Move(at) => {
                if self.pressed {
                    tracing::debug!("finger is moving at {} {}", at.x, at.y);
                    self.moves_in_stroke += 1;
                } else {
                    tracing::debug!("pointer moved at {} {} without a press", at.x, at.y);
                }
                self.position = Some(at);
            }
            TouchEvent::Up => {
                tracing::debug!("finger is now up");
                if self.pressed {
                    self.strokes += 1;
                }
                self.pressed = false;
            }
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Last known pointer position.
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Moves observed since the last press.
    pub fn moves_in_stroke(&self) -> u32 {
        self.moves_in_stroke
    }

    /// Completed down/up strokes.
    pub fn strokes(&self) -> u64 {
        self.strokes
    }
}
