//! Colors and the linear color gradient used by the heatmap.

use num_traits::{Float, ToPrimitive};

/// An 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const GREY: Rgb = Rgb(128, 128, 128);
    pub const DARK_GREY: Rgb = Rgb(64, 64, 64);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// A gradient through evenly spaced color stops, mapped linearly onto a
/// value range.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorGradient {
    stops: Vec<Rgb>,
}

impl Default for ColorGradient {
    /// Blue through white to red.
    fn default() -> Self {
        Self::new(vec![Rgb::BLUE, Rgb::WHITE, Rgb::RED])
    }
}

impl ColorGradient {
    /// Create a gradient; fewer than two stops gives a flat color.
    pub fn new(stops: Vec<Rgb>) -> Self {
        Self { stops }
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color at fraction `t` along the gradient, clamped to `[0, 1]`.
    pub fn at<F: Float>(&self, t: F) -> Rgb {
        let t = t.to_f64().unwrap_or(0.0);
        match self.stops.len() {
            0 => Rgb::GREY,
            1 => self.stops[0],
            n => {
                let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
                let scaled = t * (n - 1) as f64;
                let lower = (scaled.floor() as usize).min(n - 2);
                self.stops[lower].lerp(self.stops[lower + 1], scaled - lower as f64)
            }
        }
    }

    /// Color for `value` with the gradient stretched over `[min, max]`.
    ///
    /// A degenerate range (`min == max`) maps everything to the middle.
    pub fn map<V: ToPrimitive>(&self, value: V, (min, max): (f64, f64)) -> Rgb {
        let value = value.to_f64().unwrap_or(f64::NAN);
        let span = max - min;
        if span <= 0.0 {
            return self.at(0.5);
        }
        self.at((value - min) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints_and_middle() {
        let gradient = ColorGradient::default();
        assert_eq!(gradient.map(0.2, (0.2, 0.8)), Rgb::BLUE);
        assert_eq!(gradient.map(0.8, (0.2, 0.8)), Rgb::RED);
        assert_eq!(gradient.map(0.5, (0.2, 0.8)), Rgb::WHITE);
        // a quarter of the way is halfway between blue and white
        assert_eq!(gradient.map(0.25, (0.0, 1.0)), Rgb(128, 128, 255));
        let near = gradient.map(0.35, (0.2, 0.8));
        assert!(near.0.abs_diff(128) <= 1 && near.1.abs_diff(128) <= 1 && near.2 == 255);
    }

    #[test]
    fn test_gradient_clamps() {
        let gradient = ColorGradient::default();
        assert_eq!(gradient.map(-1.0, (0.0, 1.0)), Rgb::BLUE);
        assert_eq!(gradient.map(2.0, (0.0, 1.0)), Rgb::RED);
        assert_eq!(gradient.map(0.3, (0.3, 0.3)), Rgb::WHITE);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#00ff80"), Some(Rgb(0, 255, 128)));
        assert_eq!(Rgb::from_hex("00ff80"), None);
        assert_eq!(Rgb::from_hex("#00ff8"), None);
    }
}
