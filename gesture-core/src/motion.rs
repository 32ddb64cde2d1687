use gesture_shared::Position;

/// Wrist displacement since the previous frame with a hand
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Movement {
    pub dx: f32,
    pub dy: f32,
    pub has_previous_position: bool,
}

/// Remembers where the wrist was on the last frame that had a hand.
#[derive(Debug, Clone, Default)]
pub struct MotionTracker {
    previous_wrist: Option<Position>,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta against the stored wrist, then remember `current`.
    ///
    /// The delta is read before the store, so the first call after a reset
    /// always reports no previous position.
    pub fn track(&mut self, current: Position) -> Movement {
        let movement = match self.previous_wrist {
            Some(previous) => Movement {
                dx: current.x - previous.x,
                dy: current.y - previous.y,
                has_previous_position: true,
            },
            None => Movement::default(),
        };
        self.previous_wrist = Some(current);
        movement
    }

    /// Forget the stored wrist; called whenever tracking is lost
    pub fn reset(&mut self) {
        self.previous_wrist = None;
    }

    pub fn previous_wrist(&self) -> Option<Position> {
        self.previous_wrist
    }
}
