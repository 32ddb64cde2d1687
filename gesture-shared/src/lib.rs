#![cfg_attr(not(feature = "std"), no_std)]

//! Wire types shared between the gesture pipeline and its clients.
//!
//! Everything here is plain serde data. The JSON shape (snake_case keys,
//! `event`/`data` envelopes) is what the browser overlay consumes.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Represents a 2D position, normalized to `[0, 1]` unless stated otherwise
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        libm::sqrtf(dx * dx + dy * dy)
    }

    /// Component-wise `self - origin`
    pub fn offset_from(&self, origin: &Position) -> Position {
        Position::new(self.x - origin.x, self.y - origin.y)
    }

    /// Scale a normalized position to integer pixel coordinates
    pub fn to_pixels(&self, width: u32, height: u32) -> (i32, i32) {
        (
            round_to_pixel(self.x * width as f32),
            round_to_pixel(self.y * height as f32),
        )
    }
}

pub fn round_to_pixel(value: f32) -> i32 {
    libm::roundf(value) as i32
}

/// One of the four cardinal pointing commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint category used by the overlay renderer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    Wrist,
    ThumbTip,
    IndexTip,
    MiddleTip,
    RingTip,
    PinkyTip,
    Mcp,
}

/// A joint in pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Joint {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub joint_type: JointType,
}

/// A classified pointing direction, stamped in milliseconds since the epoch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectionEvent {
    pub direction: Direction,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Success,
}

/// `gesture_command` payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GestureCommand {
    pub direction: Direction,
    pub status: CommandStatus,
    pub timestamp: u64,
}

impl From<DirectionEvent> for GestureCommand {
    fn from(event: DirectionEvent) -> Self {
        Self {
            direction: event.direction,
            status: CommandStatus::Success,
            timestamp: event.timestamp,
        }
    }
}

/// `hand_data` payload: everything a client needs to draw the hand overlay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayEvent {
    pub wrist_x: i32,
    pub wrist_y: i32,
    pub movement_dx: f32,
    pub movement_dy: f32,
    pub hand_scale_pixels: i32,
    #[serde(rename = "has_previous_pos")]
    pub has_previous_position: bool,
    pub frame_width: u32,
    pub frame_height: u32,
    pub joints: Vec<Joint>,
}

/// Classifier tuning, shared by the server config and the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Dead zone half-width on the pointing vector, normalized units
    pub direction_threshold: f32,
    /// Minimum index tip to index MCP distance for a finger to count as extended
    pub extension_threshold: f32,
    /// Reserved: consecutive identical frames for a "stable" direction.
    /// Only reported, never used to hold back a command.
    pub stable_threshold: u32,
    /// Drop frames unless `start_tracking` was received first
    pub require_tracking: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            direction_threshold: 0.15,
            extension_threshold: 0.08,
            stable_threshold: 5,
            require_tracking: false,
        }
    }
}

/// `frame` request payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FramePayload {
    /// Base64 image, optionally prefixed with a `data:image/...;base64,` header
    #[serde(default)]
    pub image: String,
}

/// Messages a client sends over the socket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    Frame(FramePayload),
    StartTracking,
    StopTracking,
}

/// `response` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponsePayload {
    pub message: String,
}

/// `error` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub message: String,
}

/// Messages the server pushes to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    GestureCommand(GestureCommand),
    HandData(OverlayEvent),
    Response(ResponsePayload),
    Error(ErrorPayload),
}

impl ServerMessage {
    pub fn response(message: impl Into<String>) -> Self {
        ServerMessage::Response(ResponsePayload {
            message: message.into(),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Event name as it appears on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::GestureCommand(_) => "gesture_command",
            ServerMessage::HandData(_) => "hand_data",
            ServerMessage::Response(_) => "response",
            ServerMessage::Error(_) => "error",
        }
    }

    #[cfg(feature = "std")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Liveness response for `GET /`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LivenessResponse {
    pub message: String,
    pub status: String,
}

impl LivenessResponse {
    pub fn ready() -> Self {
        Self {
            message: "Server is running!".into(),
            status: "ready".into(),
        }
    }
}
