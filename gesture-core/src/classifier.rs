use gesture_shared::{ClassifierSettings, Direction};

use crate::geometry::GeometrySnapshot;

/// Maps one frame's geometry to a cardinal direction.
///
/// Stateless: the same snapshot always yields the same answer, and nothing
/// carries over between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionClassifier {
    direction_threshold: f32,
    extension_threshold: f32,
}

impl DirectionClassifier {
    pub fn new(settings: &ClassifierSettings) -> Self {
        Self {
            direction_threshold: settings.direction_threshold,
            extension_threshold: settings.extension_threshold,
        }
    }

    pub fn direction_threshold(&self) -> f32 {
        self.direction_threshold
    }

    pub fn extension_threshold(&self) -> f32 {
        self.extension_threshold
    }

    /// `None` when the index finger is curled or the pointing vector sits in
    /// the dead zone of its dominant axis
    pub fn classify(&self, geometry: &GeometrySnapshot) -> Option<Direction> {
        if geometry.index_extension <= self.extension_threshold {
            return None;
        }

        let dx = geometry.pointing.x;
        let dy = geometry.pointing.y;
        let t = self.direction_threshold;

        // Image y grows downward: a fingertip above the wrist has dy < 0
        if libm::fabsf(dy) > libm::fabsf(dx) {
            if dy < -t {
                Some(Direction::Up)
            } else if dy > t {
                Some(Direction::Down)
            } else {
                None
            }
        } else if dx < -t {
            Some(Direction::Left)
        } else if dx > t {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        Self::new(&ClassifierSettings::default())
    }
}
