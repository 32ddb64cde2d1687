#![cfg_attr(not(feature = "std"), no_std)]

//! Skin-colour hand detector.
//!
//! A dependency-free [`LandmarkProvider`] backend: it segments skin-toned
//! pixels, takes the point farthest from the blob centre as the index tip,
//! the point farthest from that as the wrist, and lays a 21-joint hand model
//! along that axis. Good enough for a single bare hand on a plain background;
//! swap in a learned detector for anything harder.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use gesture_core::landmarks::{index, LANDMARK_COUNT};
use gesture_core::{LandmarkProvider, ProviderError, RawHand, RgbFrame};
use gesture_shared::Position;
use log::trace;

/// RGB color value
#[derive(Debug, Clone, Copy)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// HSV color value
#[derive(Debug, Clone, Copy)]
pub struct Hsv {
    pub h: f32, // 0-360
    pub s: f32, // 0-100
    pub v: f32, // 0-100
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hsv(&self) -> Hsv {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * libm::fmodf((g - b) / delta, 6.0)
        } else if max == g {
            60.0 * (((b - r) / delta) + 2.0)
        } else {
            60.0 * (((r - g) / delta) + 4.0)
        };
        let h = if h < 0.0 { h + 360.0 } else { h };

        let s = if max == 0.0 { 0.0 } else { delta / max * 100.0 };

        Hsv { h, s, v: max * 100.0 }
    }

    /// Warm hues with moderate saturation and brightness
    pub fn is_skin_color(&self) -> bool {
        let hsv = self.to_hsv();
        hsv.h <= 50.0 && hsv.s >= 15.0 && hsv.s <= 90.0 && hsv.v >= 25.0 && hsv.v <= 95.0
    }
}

/// A point in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f32,
    y: f32,
}

impl Point {
    fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        libm::sqrtf(dx * dx + dy * dy)
    }
}

/// Hand detector using skin color segmentation
pub struct SkinHandDetector {
    min_skin_pixels: usize,
    sample_stride: usize,
    min_elongation: f32,
}

impl SkinHandDetector {
    pub fn new() -> Self {
        Self {
            min_skin_pixels: 2000,
            sample_stride: 2,
            min_elongation: 1.4,
        }
    }

    /// Minimum skin area, in full-resolution pixels, to accept a hand
    pub fn with_min_skin_pixels(mut self, min_pixels: usize) -> Self {
        self.min_skin_pixels = min_pixels;
        self
    }

    /// Only every n-th pixel on both axes is inspected
    pub fn with_sample_stride(mut self, stride: usize) -> Self {
        self.sample_stride = stride.max(1);
        self
    }

    /// Length over width ratio above which the blob counts as a pointing
    /// finger rather than a fist
    pub fn with_min_elongation(mut self, ratio: f32) -> Self {
        self.min_elongation = ratio;
        self
    }

    /// Detect a hand in a packed RGB8 image, returning 21 normalized points
    pub fn process_rgb_image(&self, width: usize, height: usize, data: &[u8]) -> Option<RawHand> {
        if width == 0 || height == 0 || data.len() < width * height * 3 {
            return None;
        }

        let stride = self.sample_stride;
        let mut skin = Vec::new();
        for y in (0..height).step_by(stride) {
            for x in (0..width).step_by(stride) {
                let idx = (y * width + x) * 3;
                if Rgb::new(data[idx], data[idx + 1], data[idx + 2]).is_skin_color() {
                    skin.push(Point::new(x as f32, y as f32));
                }
            }
        }

        if skin.len() * stride * stride < self.min_skin_pixels {
            return None;
        }

        let n = skin.len() as f32;
        let centroid = Point::new(
            skin.iter().map(|p| p.x).sum::<f32>() / n,
            skin.iter().map(|p| p.y).sum::<f32>() / n,
        );
        let tip = farthest_from(&skin, &centroid)?;
        let wrist = farthest_from(&skin, &tip)?;

        let span = wrist.distance_to(&tip);
        if span < 1.0 {
            return None;
        }

        // Unit axis wrist -> tip and its normal
        let ux = (tip.x - wrist.x) / span;
        let uy = (tip.y - wrist.y) / span;
        let (nx, ny) = (-uy, ux);

        let half_width = skin
            .iter()
            .map(|p| libm::fabsf((p.x - centroid.x) * nx + (p.y - centroid.y) * ny))
            .fold(1.0f32, f32::max);
        let elongation = span / (2.0 * half_width);
        let pointing = elongation >= self.min_elongation;
        trace!(
            "skin blob: {} samples, span {:.1}px, elongation {:.2}",
            skin.len(),
            span,
            elongation
        );

        let model = HandModel {
            wrist,
            axis: (ux, uy),
            normal: (nx, ny),
            span,
            half_width,
        };
        Some(model.landmarks(tip, pointing, width as f32, height as f32))
    }
}

impl Default for SkinHandDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkProvider for SkinHandDetector {
    fn detect(&mut self, frame: &RgbFrame) -> Result<Vec<RawHand>, ProviderError> {
        Ok(self
            .process_rgb_image(frame.width() as usize, frame.height() as usize, frame.data())
            .into_iter()
            .collect())
    }
}

fn farthest_from(points: &[Point], origin: &Point) -> Option<Point> {
    let mut best: Option<(f32, Point)> = None;
    for p in points {
        let d = p.distance_to(origin);
        if best.map_or(true, |(bd, _)| d > bd) {
            best = Some((d, *p));
        }
    }
    best.map(|(_, p)| p)
}

/// Hand frame anchored at the wrist: `along` runs towards the index tip in
/// units of the wrist-tip span, `across` runs sideways in units of the blob
/// half-width.
struct HandModel {
    wrist: Point,
    axis: (f32, f32),
    normal: (f32, f32),
    span: f32,
    half_width: f32,
}

impl HandModel {
    fn at(&self, along: f32, across: f32) -> Point {
        let a = along * self.span;
        let c = across * self.half_width;
        Point::new(
            self.wrist.x + self.axis.0 * a + self.normal.0 * c,
            self.wrist.y + self.axis.1 * a + self.normal.1 * c,
        )
    }

    /// Lay the 21 joints out; only the index finger is ever extended
    fn landmarks(&self, tip: Point, pointing: bool, width: f32, height: f32) -> RawHand {
        let mut px = vec![self.wrist; LANDMARK_COUNT];

        px[index::THUMB_CMC] = self.at(0.12, -0.45);
        px[index::THUMB_MCP] = self.at(0.22, -0.7);
        px[index::THUMB_IP] = self.at(0.3, -0.85);
        px[index::THUMB_TIP] = self.at(0.38, -0.95);

        let index_mcp = self.at(0.5, 0.0);
        let index_tip = if pointing { tip } else { self.at(0.55, 0.0) };
        px[index::INDEX_MCP] = index_mcp;
        px[index::INDEX_PIP] = lerp(&index_mcp, &index_tip, 1.0 / 3.0);
        px[index::INDEX_DIP] = lerp(&index_mcp, &index_tip, 2.0 / 3.0);
        px[index::INDEX_TIP] = index_tip;

        // Curled fingers: knuckles fan out across the palm, tips fold back
        let curled = [
            (index::MIDDLE_MCP, 0.48, 0.3),
            (index::RING_MCP, 0.45, 0.6),
            (index::PINKY_MCP, 0.4, 0.9),
        ];
        for (mcp, along, across) in curled {
            px[mcp] = self.at(along, across);
            px[mcp + 1] = self.at(along + 0.08, across);
            px[mcp + 2] = self.at(along + 0.1, across);
            px[mcp + 3] = self.at(along + 0.06, across);
        }

        px.into_iter()
            .map(|p| {
                Position::new(
                    (p.x / width).clamp(0.0, 1.0),
                    (p.y / height).clamp(0.0, 1.0),
                )
            })
            .collect()
    }
}

fn lerp(a: &Point, b: &Point, t: f32) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIN: [u8; 3] = [180, 150, 120];

    fn canvas(width: usize, height: usize) -> Vec<u8> {
        vec![255u8; width * height * 3]
    }

    fn paint(data: &mut [u8], width: usize, xs: core::ops::Range<usize>, ys: core::ops::Range<usize>) {
        for y in ys {
            for x in xs.clone() {
                let idx = (y * width + x) * 3;
                data[idx..idx + 3].copy_from_slice(&SKIN);
            }
        }
    }

    fn detector() -> SkinHandDetector {
        SkinHandDetector::new()
            .with_min_skin_pixels(500)
            .with_sample_stride(1)
    }

    fn pointing_vector(hand: &RawHand) -> (f32, f32) {
        let wrist = hand[index::WRIST];
        let tip = hand[index::INDEX_TIP];
        (tip.x - wrist.x, tip.y - wrist.y)
    }

    #[test]
    fn test_rgb_to_hsv() {
        let red = Rgb::new(255, 0, 0);
        let hsv = red.to_hsv();
        assert!((hsv.h - 0.0).abs() < 1.0);
        assert!((hsv.s - 100.0).abs() < 1.0);
        assert!((hsv.v - 100.0).abs() < 1.0);

        let magenta = Rgb::new(255, 0, 128).to_hsv();
        assert!(magenta.h > 300.0 && magenta.h < 360.0);
    }

    #[test]
    fn test_skin_color_detection() {
        assert!(Rgb::new(180, 150, 120).is_skin_color());
        assert!(!Rgb::new(50, 50, 200).is_skin_color());
        assert!(!Rgb::new(50, 200, 50).is_skin_color());
        assert!(!Rgb::new(255, 255, 255).is_skin_color());
    }

    #[test]
    fn test_no_skin_no_hand() {
        let data = canvas(100, 100);
        assert!(detector().process_rgb_image(100, 100, &data).is_none());
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(detector().process_rgb_image(10, 10, &[0u8; 20]).is_none());
    }

    #[test]
    fn test_finger_pointing_up() {
        let (w, h) = (200, 200);
        let mut data = canvas(w, h);
        paint(&mut data, w, 80..120, 120..170); // palm
        paint(&mut data, w, 96..104, 40..120); // index finger

        let hand = detector().process_rgb_image(w, h, &data).expect("hand");
        assert_eq!(hand.len(), LANDMARK_COUNT);

        let (dx, dy) = pointing_vector(&hand);
        assert!(dy < -0.5, "dy = {dy}");
        assert!(dy.abs() > dx.abs());

        let extension = hand[index::INDEX_TIP].distance_to(&hand[index::INDEX_MCP]);
        assert!(extension > 0.08, "extension = {extension}");
        assert!(hand.iter().all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
    }

    #[test]
    fn test_finger_pointing_left() {
        let (w, h) = (200, 200);
        let mut data = canvas(w, h);
        paint(&mut data, w, 120..170, 80..120); // palm
        paint(&mut data, w, 40..120, 96..104); // index finger

        let hand = detector().process_rgb_image(w, h, &data).expect("hand");
        let (dx, dy) = pointing_vector(&hand);
        assert!(dx < -0.5, "dx = {dx}");
        assert!(dx.abs() > dy.abs());
    }

    #[test]
    fn test_round_blob_reads_as_fist() {
        let (w, h) = (200, 200);
        let mut data = canvas(w, h);
        paint(&mut data, w, 70..130, 70..130);

        let hand = detector().process_rgb_image(w, h, &data).expect("hand");
        let extension = hand[index::INDEX_TIP].distance_to(&hand[index::INDEX_MCP]);
        assert!(extension < 0.08, "extension = {extension}");
    }

    #[test]
    fn test_provider_wraps_detection() {
        let (w, h) = (200, 200);
        let mut data = canvas(w, h);
        paint(&mut data, w, 80..120, 120..170);
        paint(&mut data, w, 96..104, 40..120);

        let frame = RgbFrame::new(w as u32, h as u32, data).unwrap();
        let mut provider = detector();
        assert_eq!(provider.detect(&frame).unwrap().len(), 1);

        let blank = RgbFrame::new(w as u32, h as u32, canvas(w, h)).unwrap();
        assert!(provider.detect(&blank).unwrap().is_empty());
    }
}
