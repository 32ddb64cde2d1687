use alloc::vec::Vec;
use gesture_shared::{ClassifierSettings, Direction, DirectionEvent, OverlayEvent, ServerMessage};
use log::{debug, warn};

use crate::classifier::DirectionClassifier;
use crate::error::{GestureError, Result};
use crate::geometry::extract_geometry;
use crate::landmarks::{LandmarkSet, RawHand, RgbFrame};
use crate::motion::MotionTracker;
use crate::overlay::build_overlay;
use crate::provider::{LandmarkProvider, ProviderSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Tracking,
}

/// What one frame produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameEvents {
    pub gesture: Option<DirectionEvent>,
    pub hand_data: Option<OverlayEvent>,
}

impl FrameEvents {
    pub fn is_empty(&self) -> bool {
        self.gesture.is_none() && self.hand_data.is_none()
    }

    /// Outbound messages, gesture command first
    pub fn into_messages(self) -> Vec<ServerMessage> {
        let mut out = Vec::with_capacity(2);
        if let Some(event) = self.gesture {
            out.push(ServerMessage::GestureCommand(event.into()));
        }
        if let Some(overlay) = self.hand_data {
            out.push(ServerMessage::HandData(overlay));
        }
        out
    }
}

/// One client's tracking session.
///
/// Owns the motion state and the provider handle; nothing here is shared
/// with other sessions. Frames must be fed one at a time.
pub struct FrameSession<S: ProviderSource> {
    source: S,
    provider: Option<S::Provider>,
    settings: ClassifierSettings,
    classifier: DirectionClassifier,
    tracker: MotionTracker,
    state: SessionState,
    last_direction: Option<Direction>,
    stable_frames: u32,
    frames_processed: u64,
}

impl<S: ProviderSource> FrameSession<S> {
    pub fn new(source: S, settings: ClassifierSettings) -> Self {
        Self {
            source,
            provider: None,
            classifier: DirectionClassifier::new(&settings),
            settings,
            tracker: MotionTracker::new(),
            state: SessionState::Idle,
            last_direction: None,
            stable_frames: 0,
            frames_processed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &MotionTracker {
        &self.tracker
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Consecutive frames that classified to the same direction
    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    /// Diagnostic only; commands are sent whether or not this holds
    pub fn is_stable(&self) -> bool {
        self.last_direction.is_some() && self.stable_frames >= self.settings.stable_threshold
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Enter `Tracking`. Safe to call repeatedly.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_provider()?;
        self.lose_hand();
        self.state = SessionState::Tracking;
        Ok(())
    }

    /// Back to `Idle`, dropping the provider handle. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.provider = None;
        self.lose_hand();
        self.state = SessionState::Idle;
    }

    /// Run detection on a decoded frame and process the result.
    ///
    /// A provider failure tears the session down and is returned to the
    /// caller; the session must not be fed again until `start`.
    pub fn process_frame(&mut self, frame: &RgbFrame, timestamp_ms: u64) -> Result<FrameEvents> {
        if self.state == SessionState::Idle && self.settings.require_tracking {
            debug!("dropping frame: session idle");
            return Ok(FrameEvents::default());
        }

        let detected = self.ensure_provider()?.detect(frame);
        match detected {
            Ok(hands) => Ok(self.process_hands(&hands, frame.width(), frame.height(), timestamp_ms)),
            Err(err) => {
                self.stop();
                Err(err.into())
            }
        }
    }

    /// Process the provider's output for one frame.
    ///
    /// Only the first hand is used; an unusable hand counts as no hand.
    pub fn process_hands(
        &mut self,
        hands: &[RawHand],
        width: u32,
        height: u32,
        timestamp_ms: u64,
    ) -> FrameEvents {
        self.frames_processed += 1;

        let Some(first) = hands.first() else {
            self.lose_hand();
            return FrameEvents::default();
        };
        if hands.len() > 1 {
            debug!("{} hands detected, using the first", hands.len());
        }

        let landmarks = match LandmarkSet::from_points(first) {
            Ok(landmarks) => landmarks,
            Err(err) => {
                warn!("discarding hand: {}", err);
                self.lose_hand();
                return FrameEvents::default();
            }
        };
        let geometry = match extract_geometry(&landmarks, width, height) {
            Ok(geometry) => geometry,
            Err(err) => {
                warn!("discarding hand: {}", err);
                self.lose_hand();
                return FrameEvents::default();
            }
        };

        let direction = self.classifier.classify(&geometry);
        let movement = self.tracker.track(geometry.wrist);
        self.note_direction(direction);

        FrameEvents {
            gesture: direction.map(|direction| DirectionEvent {
                direction,
                timestamp: timestamp_ms,
            }),
            hand_data: Some(build_overlay(&geometry, &movement, &landmarks)),
        }
    }

    fn ensure_provider(&mut self) -> Result<&mut S::Provider> {
        if self.provider.is_none() {
            let provider = self.source.acquire().map_err(GestureError::from)?;
            debug!("landmark provider acquired");
            self.provider = Some(provider);
        }
        self.provider
            .as_mut()
            .ok_or_else(|| GestureError::ProviderUnavailable("provider not held".into()))
    }

    fn lose_hand(&mut self) {
        self.tracker.reset();
        self.last_direction = None;
        self.stable_frames = 0;
    }

    fn note_direction(&mut self, direction: Option<Direction>) {
        if direction.is_some() && direction == self.last_direction {
            self.stable_frames = self.stable_frames.saturating_add(1);
        } else {
            self.stable_frames = u32::from(direction.is_some());
        }
        self.last_direction = direction;
    }
}
