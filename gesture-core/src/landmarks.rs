use alloc::format;
use alloc::vec::Vec;
use gesture_shared::Position;

use crate::error::{GestureError, Result};

/// Points per hand in the 21-joint hand model
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices of the 21-joint hand model
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// One hand as reported by a provider, before validation
pub type RawHand = Vec<Position>;

/// A validated set of 21 normalized hand joints
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Position; LANDMARK_COUNT],
}

impl LandmarkSet {
    /// Validate a provider's raw points. Anything but 21 points is rejected.
    pub fn from_points(points: &[Position]) -> Result<Self> {
        let points: [Position; LANDMARK_COUNT] = points.try_into().map_err(|_| {
            GestureError::InvalidInput(format!(
                "expected {} landmarks, got {}",
                LANDMARK_COUNT,
                points.len()
            ))
        })?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Position; LANDMARK_COUNT] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Position {
        self.points[index]
    }

    pub fn wrist(&self) -> Position {
        self.points[index::WRIST]
    }

    pub fn index_mcp(&self) -> Position {
        self.points[index::INDEX_MCP]
    }

    pub fn index_tip(&self) -> Position {
        self.points[index::INDEX_TIP]
    }

    pub fn middle_mcp(&self) -> Position {
        self.points[index::MIDDLE_MCP]
    }
}

/// A decoded colour frame, packed RGB8, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(GestureError::InvalidInput(format!(
                "rgb buffer of {} bytes does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A black frame, mostly useful for providers that ignore pixels
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: alloc::vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB triple at `(x, y)`; caller keeps the coordinates in bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}
