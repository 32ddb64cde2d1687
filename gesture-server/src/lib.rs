//! WebSocket front end for the pointing-gesture pipeline.
//!
//! Clients stream base64 camera frames over `/ws`; each connection gets its
//! own [`gesture_core::FrameSession`] and receives `gesture_command` and
//! `hand_data` events back.

pub mod codec;
pub mod config;
pub mod connection;
pub mod server;

pub use config::{ConfigError, DetectorConfig, ServerConfig};
pub use server::{router, serve, skin_detector_factory, AppState, BoxedProvider, ProviderFactory};
