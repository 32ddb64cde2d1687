use gesture_shared::{Joint, JointType, OverlayEvent};

use crate::geometry::GeometrySnapshot;
use crate::landmarks::{index, LandmarkSet};
use crate::motion::Movement;

/// Joints sent to the overlay, in wire order
pub const OVERLAY_JOINTS: [(usize, JointType); 10] = [
    (index::WRIST, JointType::Wrist),
    (index::THUMB_TIP, JointType::ThumbTip),
    (index::INDEX_TIP, JointType::IndexTip),
    (index::MIDDLE_TIP, JointType::MiddleTip),
    (index::RING_TIP, JointType::RingTip),
    (index::PINKY_TIP, JointType::PinkyTip),
    (index::INDEX_MCP, JointType::Mcp),
    (index::MIDDLE_MCP, JointType::Mcp),
    (index::RING_MCP, JointType::Mcp),
    (index::PINKY_MCP, JointType::Mcp),
];

pub fn build_overlay(
    geometry: &GeometrySnapshot,
    movement: &Movement,
    landmarks: &LandmarkSet,
) -> OverlayEvent {
    let joints = OVERLAY_JOINTS
        .iter()
        .map(|&(idx, joint_type)| {
            let (x, y) = landmarks
                .point(idx)
                .to_pixels(geometry.frame_width, geometry.frame_height);
            Joint { x, y, joint_type }
        })
        .collect();

    OverlayEvent {
        wrist_x: geometry.wrist_pixel.0,
        wrist_y: geometry.wrist_pixel.1,
        movement_dx: movement.dx,
        movement_dy: movement.dy,
        hand_scale_pixels: geometry.hand_scale_pixels,
        has_previous_position: movement.has_previous_position,
        frame_width: geometry.frame_width,
        frame_height: geometry.frame_height,
        joints,
    }
}
