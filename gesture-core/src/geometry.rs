use alloc::format;
use gesture_shared::{round_to_pixel, Position};

use crate::error::{GestureError, Result};
use crate::landmarks::LandmarkSet;

/// Per-frame measurements derived from one landmark set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySnapshot {
    /// Normalized wrist position
    pub wrist: Position,
    /// Wrist in pixels, rounded
    pub wrist_pixel: (i32, i32),
    /// Index tip minus wrist, normalized units
    pub pointing: Position,
    /// Index tip to index MCP distance, normalized units
    pub index_extension: f32,
    /// Wrist to middle MCP distance, normalized units
    pub hand_scale: f32,
    /// `hand_scale` measured against the longer frame side
    pub hand_scale_pixels: i32,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Derive the classification and overlay measurements for one frame
pub fn extract_geometry(
    landmarks: &LandmarkSet,
    width: u32,
    height: u32,
) -> Result<GeometrySnapshot> {
    if width == 0 || height == 0 {
        return Err(GestureError::InvalidInput(format!(
            "frame dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    let wrist = landmarks.wrist();
    let index_tip = landmarks.index_tip();
    let hand_scale = wrist.distance_to(&landmarks.middle_mcp());

    Ok(GeometrySnapshot {
        wrist,
        wrist_pixel: wrist.to_pixels(width, height),
        pointing: index_tip.offset_from(&wrist),
        index_extension: index_tip.distance_to(&landmarks.index_mcp()),
        hand_scale,
        hand_scale_pixels: round_to_pixel(hand_scale * width.max(height) as f32),
        frame_width: width,
        frame_height: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{index, LANDMARK_COUNT};

    fn landmarks() -> LandmarkSet {
        let mut points = vec![Position::new(0.5, 0.5); LANDMARK_COUNT];
        points[index::WRIST] = Position::new(0.5, 0.5);
        points[index::INDEX_MCP] = Position::new(0.5, 0.42);
        points[index::INDEX_TIP] = Position::new(0.5, 0.3);
        points[index::MIDDLE_MCP] = Position::new(0.53, 0.35);
        LandmarkSet::from_points(&points).unwrap()
    }

    #[test]
    fn test_extract_geometry() {
        let g = extract_geometry(&landmarks(), 640, 480).unwrap();

        assert_eq!(g.wrist_pixel, (320, 240));
        assert!((g.pointing.x - 0.0).abs() < 1e-6);
        assert!((g.pointing.y + 0.2).abs() < 1e-6);
        assert!((g.index_extension - 0.12).abs() < 1e-6);

        // sqrt(0.03^2 + 0.15^2) = 0.15297
        assert!((g.hand_scale - 0.152_97).abs() < 1e-4);
        assert_eq!(g.hand_scale_pixels, 98);
        assert_eq!((g.frame_width, g.frame_height), (640, 480));
    }

    #[test]
    fn test_hand_scale_uses_longer_side() {
        let portrait = extract_geometry(&landmarks(), 480, 640).unwrap();
        let landscape = extract_geometry(&landmarks(), 640, 480).unwrap();
        assert_eq!(portrait.hand_scale_pixels, landscape.hand_scale_pixels);
        assert_eq!(portrait.wrist_pixel, (240, 320));
    }

    #[test]
    fn test_zero_sized_frame_is_invalid() {
        let err = extract_geometry(&landmarks(), 0, 480).unwrap_err();
        assert!(matches!(err, GestureError::InvalidInput(_)));
    }
}
