use alloc::string::String;
use thiserror::Error;

/// Failure classes of the frame pipeline.
///
/// Each variant has a fixed handling rule in the session: `Decode` drops the
/// frame and leaves tracking state alone, `InvalidInput` is treated as a
/// frame without a hand, `ProviderUnavailable` ends the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    /// Malformed or undecodable image payload
    #[error("decode error: {0}")]
    Decode(String),
    /// Landmarks or frame dimensions that break the pipeline's contract
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The landmark detector could not be acquired or failed mid-frame
    #[error("landmark provider unavailable: {0}")]
    ProviderUnavailable(String),
}

pub type Result<T> = core::result::Result<T, GestureError>;
