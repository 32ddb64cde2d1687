#![cfg_attr(not(feature = "std"), no_std)]

//! Pointing-gesture pipeline: landmarks in, direction commands and overlay
//! data out.
//!
//! The crate never touches the network or an image codec. A
//! [`FrameSession`] drives one client's stream: it asks a
//! [`LandmarkProvider`] for hand points, derives a [`GeometrySnapshot`],
//! classifies it with a [`DirectionClassifier`], tracks wrist motion with a
//! [`MotionTracker`] and packs everything with [`build_overlay`].

extern crate alloc;

pub mod classifier;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod motion;
pub mod overlay;
pub mod provider;
pub mod session;

pub use classifier::DirectionClassifier;
pub use error::{GestureError, Result};
pub use geometry::{extract_geometry, GeometrySnapshot};
pub use landmarks::{LandmarkSet, RawHand, RgbFrame, LANDMARK_COUNT};
pub use motion::{MotionTracker, Movement};
pub use overlay::{build_overlay, OVERLAY_JOINTS};
pub use provider::{LandmarkProvider, ProviderError, ProviderSource};
pub use session::{FrameEvents, FrameSession, SessionState};

pub use gesture_shared::{ClassifierSettings, Direction, DirectionEvent, OverlayEvent, Position};
