//! Plot appearance settings, [`PlotStyle`].
//!
//! Every field has a default, so a style file only needs the columns it
//! changes. A style file is a TSV with a header row and a single value row:
//!
//! ```text
//! width	height	dmr_color
//! 1600	1200	#1b9e77
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::{
    error::MethPlotError,
    io::build_tsv_reader,
    render::color::{ColorGradient, Rgb},
};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Fraction of the interval span added to each side of the display window.
    pub window_margin: f64,
    pub font_size: u32,
    /// Font size of the heatmap sample names.
    pub sample_font_size: u32,
    pub dmr_color: String,
    pub enhancer_color: String,
    pub gene_color: String,
    pub heatmap_low: String,
    pub heatmap_mid: String,
    pub heatmap_high: String,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 900,
            window_margin: 0.1,
            font_size: 12,
            sample_font_size: 8,
            dmr_color: "#008000".to_string(),
            enhancer_color: "#ffa500".to_string(),
            gene_color: "#404040".to_string(),
            heatmap_low: "#0000ff".to_string(),
            heatmap_mid: "#ffffff".to_string(),
            heatmap_high: "#ff0000".to_string(),
        }
    }
}

fn parse_color(field: &str, hex: &str) -> Result<Rgb, MethPlotError> {
    Rgb::from_hex(hex)
        .ok_or_else(|| MethPlotError::InvalidStyle(format!("{} '{}' is not #rrggbb", field, hex)))
}

impl PlotStyle {
    /// Read a style file, falling back to defaults for absent columns.
    pub fn from_path(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let filepath = filepath.into();
        let mut reader = build_tsv_reader(&filepath, true)?;
        let style = match reader.deserialize::<PlotStyle>().next() {
            Some(style) => style?,
            None => return Err(MethPlotError::EmptyFile(filepath.to_string_lossy().to_string())),
        };
        style.validate()?;
        Ok(style)
    }

    /// Check the dimensions, margin and every color.
    pub fn validate(&self) -> Result<(), MethPlotError> {
        if self.width == 0 || self.height == 0 {
            return Err(MethPlotError::InvalidStyle(
                "width and height must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.window_margin) {
            return Err(MethPlotError::InvalidStyle(format!(
                "window_margin {} is outside [0, 1]",
                self.window_margin
            )));
        }
        self.dmr_rgb()?;
        self.enhancer_rgb()?;
        self.gene_rgb()?;
        self.gradient()?;
        Ok(())
    }

    pub fn dmr_rgb(&self) -> Result<Rgb, MethPlotError> {
        parse_color("dmr_color", &self.dmr_color)
    }

    pub fn enhancer_rgb(&self) -> Result<Rgb, MethPlotError> {
        parse_color("enhancer_color", &self.enhancer_color)
    }

    pub fn gene_rgb(&self) -> Result<Rgb, MethPlotError> {
        parse_color("gene_color", &self.gene_color)
    }

    /// The heatmap gradient, low through mid to high.
    pub fn gradient(&self) -> Result<ColorGradient, MethPlotError> {
        Ok(ColorGradient::new(vec![
            parse_color("heatmap_low", &self.heatmap_low)?,
            parse_color("heatmap_mid", &self.heatmap_mid)?,
            parse_color("heatmap_high", &self.heatmap_high)?,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = PlotStyle::default();
        assert!(style.validate().is_ok());
        assert_eq!(style.dmr_rgb().unwrap(), Rgb::GREEN);
        assert_eq!(style.gradient().unwrap(), ColorGradient::default());
    }

    #[test]
    fn test_style_from_path() {
        let style = PlotStyle::from_path("tests_data/style.tsv").unwrap();
        assert_eq!(style.width, 1600);
        assert_eq!(style.height, 1200);
        assert_eq!(style.dmr_color, "#1b9e77");
        // untouched columns keep their defaults
        assert_eq!(style.sample_font_size, 8);
    }

    #[test]
    fn test_invalid_style() {
        let style = PlotStyle {
            gene_color: "grey".to_string(),
            ..PlotStyle::default()
        };
        assert!(matches!(style.validate(), Err(MethPlotError::InvalidStyle(_))));

        let style = PlotStyle {
            window_margin: 1.5,
            ..PlotStyle::default()
        };
        assert!(style.validate().is_err());
    }
}
