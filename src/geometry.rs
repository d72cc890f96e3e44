//! Scaling and aspect-ratio geometry between source video and edit canvas
//!
//! The editing surface draws annotations on a canvas sized to the video as
//! displayed, so the overlay image has to be scaled back to match before it
//! can be composited. Everything here is pure value math; rotation metadata
//! is folded in once via [`MediaGeometry`] and the fit itself is
//! orientation-agnostic.

use std::fmt;

use serde::Serialize;

use crate::error::{BurnError, Result};

/// Pixel width/height pair. Both sides are strictly positive by construction.
/// Deliberately not `Deserialize`: construction always goes through the
/// validating [`Dimensions::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Create validated dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`BurnError::InvalidDimensions`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BurnError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width-to-height ratio.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Axes swapped (portrait <-> landscape).
    #[must_use]
    pub fn transposed(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Stream rotation metadata, quantized to quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Map a degree value (as reported by container metadata) to a quarter
    /// turn. Negative values are taken modulo 360, so a display-matrix
    /// rotation of -90 maps to 270.
    ///
    /// # Errors
    ///
    /// Returns [`BurnError::UnsupportedRotation`] for anything that is not a
    /// multiple of 90.
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::None),
            90 => Ok(Self::Quarter),
            180 => Ok(Self::Half),
            270 => Ok(Self::ThreeQuarter),
            _ => Err(BurnError::UnsupportedRotation(degrees)),
        }
    }

    #[must_use]
    pub fn degrees(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }

    /// Whether this rotation swaps the visual axes.
    #[must_use]
    pub fn is_transposed(&self) -> bool {
        matches!(self, Self::Quarter | Self::ThreeQuarter)
    }
}

/// A video's intrinsic size plus rotation, with the normalized (on-screen)
/// size computed once up front. Raw stream dimensions describe the stored
/// frames; the normalized pair is what the viewer actually sees and is what
/// all canvas math uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaGeometry {
    source: Dimensions,
    rotation: Rotation,
    normalized: Dimensions,
}

impl MediaGeometry {
    #[must_use]
    pub fn new(source: Dimensions, rotation: Rotation) -> Self {
        let normalized = if rotation.is_transposed() {
            source.transposed()
        } else {
            source
        };
        Self {
            source,
            rotation,
            normalized,
        }
    }

    #[must_use]
    pub fn source(&self) -> Dimensions {
        self.source
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Post-rotation visual dimensions.
    #[must_use]
    pub fn normalized(&self) -> Dimensions {
        self.normalized
    }
}

/// Scale `native` to the largest size that fits entirely inside `bounds`
/// while preserving its aspect ratio.
///
/// Fractional pixels truncate, so one axis fills its bound exactly and the
/// other lands at or just under it: 1920x1080 fit into 1080x1920 gives
/// 1080x607.
#[must_use]
pub fn fit_within(native: Dimensions, bounds: Dimensions) -> Dimensions {
    let scale = f64::min(
        f64::from(bounds.width) / f64::from(native.width),
        f64::from(bounds.height) / f64::from(native.height),
    );
    let width = (f64::from(native.width) * scale) as u32;
    let height = (f64::from(native.height) * scale) as u32;
    // Truncation can reach zero for extreme ratio mismatches; clamp to keep
    // the positivity invariant.
    Dimensions {
        width: width.max(1),
        height: height.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_reject_zero() {
        assert!(Dimensions::new(0, 1080).is_err());
        assert!(Dimensions::new(1920, 0).is_err());
        assert!(Dimensions::new(0, 0).is_err());
        assert!(Dimensions::new(1920, 1080).is_ok());
    }

    #[test]
    fn rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0).unwrap(), Rotation::None);
        assert_eq!(Rotation::from_degrees(90).unwrap(), Rotation::Quarter);
        assert_eq!(Rotation::from_degrees(180).unwrap(), Rotation::Half);
        assert_eq!(Rotation::from_degrees(270).unwrap(), Rotation::ThreeQuarter);
        // Display matrix reports counter-clockwise as negative
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::ThreeQuarter);
        assert_eq!(Rotation::from_degrees(-270).unwrap(), Rotation::Quarter);
        assert!(Rotation::from_degrees(45).is_err());
    }

    #[test]
    fn normalized_swaps_axes_for_quarter_turns() {
        let source = Dimensions::new(1080, 1920).unwrap();
        let geo = MediaGeometry::new(source, Rotation::Quarter);
        assert_eq!(geo.normalized(), Dimensions::new(1920, 1080).unwrap());

        let geo = MediaGeometry::new(source, Rotation::Half);
        assert_eq!(geo.normalized(), source);
    }

    #[test]
    fn fit_landscape_into_portrait_bounds() {
        let native = Dimensions::new(1920, 1080).unwrap();
        let bounds = Dimensions::new(1080, 1920).unwrap();
        let fitted = fit_within(native, bounds);
        assert_eq!(fitted, Dimensions::new(1080, 607).unwrap());
    }

    #[test]
    fn fit_720p_into_portrait_bounds() {
        let native = Dimensions::new(1280, 720).unwrap();
        let bounds = Dimensions::new(1080, 1920).unwrap();
        assert_eq!(fit_within(native, bounds), Dimensions::new(1080, 607).unwrap());
    }

    #[test]
    fn fit_matching_aspect_fills_bounds_exactly() {
        let native = Dimensions::new(1920, 1080).unwrap();
        let bounds = Dimensions::new(960, 540).unwrap();
        assert_eq!(fit_within(native, bounds), bounds);
    }

    #[test]
    fn fit_never_exceeds_bounds_and_keeps_ratio() {
        let cases = [
            (640, 480, 1080, 1920),
            (3840, 2160, 1280, 720),
            (720, 1280, 1080, 1920),
        ];
        for (nw, nh, bw, bh) in cases {
            let native = Dimensions::new(nw, nh).unwrap();
            let bounds = Dimensions::new(bw, bh).unwrap();
            let fitted = fit_within(native, bounds);
            assert!(fitted.width() <= bounds.width());
            assert!(fitted.height() <= bounds.height());
            // Ratio preserved up to one pixel of truncation on either axis
            let expected = native.aspect();
            let got = fitted.aspect();
            assert!(
                (got - expected).abs() / expected < 0.01,
                "{native} -> {fitted}: ratio {got} vs {expected}"
            );
        }
    }

    #[test]
    fn fit_clamps_degenerate_ratios_to_one_pixel() {
        // 1x1000 into a square bound truncates width to zero; the clamp keeps
        // the result a valid Dimensions.
        let native = Dimensions::new(1, 1000).unwrap();
        let bounds = Dimensions::new(500, 500).unwrap();
        let fitted = fit_within(native, bounds);
        assert_eq!(fitted.width(), 1);
        assert_eq!(fitted.height(), 500);
    }

    #[test]
    fn fit_upscales_small_sources() {
        let native = Dimensions::new(320, 240).unwrap();
        let bounds = Dimensions::new(1280, 960).unwrap();
        assert_eq!(fit_within(native, bounds), bounds);
    }
}
