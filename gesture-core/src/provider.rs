use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use thiserror::Error;

use crate::error::GestureError;
use crate::landmarks::{RawHand, RgbFrame};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<ProviderError> for GestureError {
    fn from(err: ProviderError) -> Self {
        GestureError::ProviderUnavailable(err.0)
    }
}

/// A hand landmark detector.
///
/// Returns every hand found in the frame, each as 21 normalized points; an
/// empty vector means no hand. Implementations are not assumed to be
/// reentrant, hence `&mut self`.
pub trait LandmarkProvider {
    fn detect(&mut self, frame: &RgbFrame) -> Result<Vec<RawHand>, ProviderError>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn detect(&mut self, frame: &RgbFrame) -> Result<Vec<RawHand>, ProviderError> {
        (**self).detect(frame)
    }
}

/// Hands out one provider per session
pub trait ProviderSource {
    type Provider: LandmarkProvider;

    fn acquire(&self) -> Result<Self::Provider, ProviderError>;
}

impl<F, P> ProviderSource for F
where
    F: Fn() -> Result<P, ProviderError>,
    P: LandmarkProvider,
{
    type Provider = P;

    fn acquire(&self) -> Result<P, ProviderError> {
        self()
    }
}
