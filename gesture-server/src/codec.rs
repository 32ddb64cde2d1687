use base64::{engine::general_purpose::STANDARD, Engine as _};
use gesture_core::{GestureError, RgbFrame};

/// Drop a `data:image/...;base64,` header if there is one
pub fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, body)) => body,
        None => payload,
    }
}

/// Decode a base64 JPEG/PNG frame into packed RGB.
pub fn decode_frame(payload: &str) -> Result<RgbFrame, GestureError> {
    let body = strip_data_url(payload.trim());
    let bytes = STANDARD
        .decode(body.trim())
        .map_err(|e| GestureError::Decode(format!("invalid base64: {}", e)))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| GestureError::Decode(format!("invalid image: {}", e)))?;
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(GestureError::Decode("image has no pixels".into()));
    }

    RgbFrame::new(width, height, rgb.into_raw())
}
