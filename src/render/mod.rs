//! Drawing a [`PlotRequest`] with `plotters`.
//!
//! Tracks are stacked top to bottom, each given a share of the image height
//! proportional to its weight. A fixed gutter on the left holds track names,
//! heatmap sample names and the group legend; the rest of the width is the
//! display window.
//!
//! SVG output needs no fonts. PNG output draws text only when built with the
//! `ttf` feature.

use std::path::{Path, PathBuf};

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::{
    annotation::Strand,
    error::MethPlotError,
    plot::{PlotRequest, Window},
    tracks::{GeneModelTrack, HeatmapTrack, IdeogramTrack, IntervalTrack, LinePlotTrack, Track},
    traits::TrackRenderer,
};

pub mod color;
pub mod layout;

use color::Rgb;
use layout::{axis_ticks, format_position, pack_rows, track_heights, XScale};

const LABEL_WIDTH: i32 = 120;
const RIGHT_PAD: i32 = 20;
const TRACK_PAD: i32 = 4;
const MAX_GENE_ROW_HEIGHT: i32 = 36;
const MISSING_CELL: Rgb = Rgb(220, 220, 220);

/// Line colors for the group averages, cycled when there are more groups.
pub const GROUP_PALETTE: [Rgb; 8] = [
    Rgb(27, 158, 119),
    Rgb(217, 95, 2),
    Rgb(117, 112, 179),
    Rgb(231, 41, 138),
    Rgb(102, 166, 30),
    Rgb(230, 171, 2),
    Rgb(166, 118, 29),
    Rgb(102, 102, 102),
];

impl From<Rgb> for RGBColor {
    fn from(value: Rgb) -> Self {
        RGBColor(value.0, value.1, value.2)
    }
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn render_error<E: std::fmt::Display>(error: E) -> MethPlotError {
    MethPlotError::Render(error.to_string())
}

fn font(size: u32, color: Rgb) -> TextStyle<'static> {
    ("sans-serif", f64::from(size))
        .into_font()
        .color(&RGBColor::from(color))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, MethPlotError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" => Ok(ImageFormat::Png),
            other => Err(MethPlotError::Render(format!(
                "unsupported image format '{}': use .svg or .png",
                other
            ))),
        }
    }
}

/// A [`TrackRenderer`] writing an SVG or PNG image file.
#[derive(Clone, Debug)]
pub struct PlottersRenderer {
    output: PathBuf,
    format: ImageFormat,
}

impl PlottersRenderer {
    pub fn new(output: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let output = output.into();
        let format = ImageFormat::from_path(&output)?;
        Ok(Self { output, format })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl TrackRenderer for PlottersRenderer {
    fn render(&self, request: &PlotRequest) -> Result<(), MethPlotError> {
        let size = (request.style.width, request.style.height);
        debug!("drawing {:?} image to {}", self.format, self.output.display());
        match self.format {
            ImageFormat::Svg => {
                let root = SVGBackend::new(&self.output, size).into_drawing_area();
                draw_request(&root, request, true).map_err(render_error)?;
                root.present().map_err(render_error)?;
            }
            ImageFormat::Png => {
                let root = BitMapBackend::new(&self.output, size).into_drawing_area();
                draw_request(&root, request, cfg!(feature = "ttf")).map_err(render_error)?;
                root.present().map_err(render_error)?;
            }
        }
        Ok(())
    }
}

/// Per-image drawing settings shared by every track.
struct Painter {
    scale: XScale,
    font_size: u32,
    text: bool,
}

impl Painter {
    fn label<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        text: &str,
        style: &TextStyle,
        position: (i32, i32),
    ) -> DrawResult<DB> {
        if !self.text {
            return Ok(());
        }
        area.draw_text(text, style, position)
    }

    fn track_name<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        name: &str,
    ) -> DrawResult<DB> {
        let (_, height) = area.dim_in_pixel();
        let style = font(self.font_size, Rgb::BLACK).pos(Pos::new(HPos::Right, VPos::Center));
        self.label(area, name, &style, (LABEL_WIDTH - 8, height as i32 / 2))
    }
}

/// Draw every track of `request` onto `root`. Text is skipped when `text`
/// is false.
pub fn draw_request<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    request: &PlotRequest,
    text: bool,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let (width, height) = root.dim_in_pixel();
    let painter = Painter {
        scale: XScale::new(request.window, LABEL_WIDTH, width as i32 - RIGHT_PAD),
        font_size: request.style.font_size,
        text,
    };
    let heights = track_heights(&request.weights(), height);

    let mut rest = root.clone();
    for (track, track_height) in request.tracks.iter().zip(heights) {
        let (area, below) = rest.split_vertically(track_height);
        match track {
            Track::Ideogram(ideogram) => draw_ideogram(&area, ideogram, &painter)?,
            Track::Axis(_) => draw_axis(&area, request.window, &painter)?,
            Track::GeneModel(genes) => {
                let color = request.style.gene_rgb().unwrap_or(Rgb::DARK_GREY);
                draw_genes(&area, genes, color, &painter)?
            }
            Track::Enhancers(intervals) | Track::Dmrs(intervals) => {
                draw_intervals(&area, intervals, &painter)?
            }
            Track::Heatmap(heatmap) => draw_heatmap(&area, heatmap, &painter)?,
            Track::GroupLines(lines) => draw_lines(&area, lines, &painter)?,
        }
        rest = below;
    }
    Ok(())
}

fn draw_ideogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    ideogram: &IdeogramTrack,
    painter: &Painter,
) -> DrawResult<DB> {
    let scale = &painter.scale;
    let (_, height) = area.dim_in_pixel();
    let height = height as i32;
    painter.track_name(area, &ideogram.chromosome)?;

    let chromosome = XScale::new(
        Window {
            from: 1,
            to: ideogram.chrom_length,
        },
        scale.left(),
        scale.right(),
    );
    let (top, bottom) = (height / 3, height - height / 3);
    area.draw(&Rectangle::new(
        [(scale.left(), top), (scale.right(), bottom)],
        RGBColor(235, 235, 235).filled(),
    ))?;
    area.draw(&Rectangle::new(
        [(scale.left(), top), (scale.right(), bottom)],
        RGBColor::from(Rgb::GREY).stroke_width(1),
    ))?;
    if let Some((x0, x1)) = chromosome.span(ideogram.highlight.start, ideogram.highlight.end) {
        area.draw(&Rectangle::new(
            [(x0 - 1, top - 2), (x1.max(x0 + 2), bottom + 2)],
            RGBColor::from(Rgb::RED).stroke_width(2),
        ))?;
    }
    Ok(())
}

fn draw_axis<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    window: Window,
    painter: &Painter,
) -> DrawResult<DB> {
    let scale = &painter.scale;
    let (_, height) = area.dim_in_pixel();
    let y = height as i32 / 3;
    let line = RGBColor::from(Rgb::BLACK).stroke_width(1);
    area.draw(&PathElement::new(vec![(scale.left(), y), (scale.right(), y)], line))?;

    let style = font(painter.font_size, Rgb::BLACK).pos(Pos::new(HPos::Center, VPos::Top));
    for tick in axis_ticks(window.from, window.to, 5) {
        let x = scale.pixel(tick);
        area.draw(&PathElement::new(vec![(x, y - 4), (x, y + 4)], line))?;
        painter.label(area, &format_position(tick), &style, (x, y + 6))?;
    }
    Ok(())
}

fn draw_genes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    track: &GeneModelTrack,
    color: Rgb,
    painter: &Painter,
) -> DrawResult<DB> {
    let scale = &painter.scale;
    painter.track_name(area, "genes")?;
    let visible: Vec<_> = track
        .genes
        .iter()
        .filter_map(|gene| {
            scale
                .span(gene.model.start, gene.model.end)
                .map(|span| (gene, span))
        })
        .collect();
    if visible.is_empty() {
        return Ok(());
    }

    let spans: Vec<(i32, i32)> = visible.iter().map(|(_, span)| *span).collect();
    let rows = pack_rows(&spans);
    let num_rows = rows.iter().max().map_or(1, |r| r + 1) as i32;
    let (_, height) = area.dim_in_pixel();
    let row_height = ((height as i32 - 2 * TRACK_PAD) / num_rows).min(MAX_GENE_ROW_HEIGHT);

    let stroke = RGBColor::from(color).stroke_width(1);
    let fill = RGBColor::from(color).filled();
    let style = font(painter.font_size, Rgb::BLACK).pos(Pos::new(HPos::Center, VPos::Bottom));
    for ((gene, (x0, x1)), row) in visible.iter().zip(rows) {
        let y = TRACK_PAD + row as i32 * row_height + row_height * 2 / 3;
        let exon_half = (row_height / 6).max(2);
        area.draw(&PathElement::new(vec![(*x0, y), (*x1, y)], stroke))?;
        for exon in &gene.model.exons {
            if let Some((e0, e1)) = scale.span(exon.start, exon.end) {
                area.draw(&Rectangle::new([(e0, y - exon_half), (e1, y + exon_half)], fill))?;
            }
        }
        let direction = match gene.model.strand {
            Strand::Forward => 1,
            Strand::Reverse => -1,
            Strand::Unknown => 0,
        };
        if direction != 0 {
            let mut x = x0 + 10;
            while x < x1 - 10 {
                let back = x - 3 * direction;
                area.draw(&PathElement::new(
                    vec![(back, y - 3), (x + 3 * direction, y), (back, y + 3)],
                    stroke,
                ))?;
                x += 24;
            }
        }
        painter.label(area, &gene.symbol, &style, ((x0 + x1) / 2, y - exon_half - 2))?;
    }
    Ok(())
}

fn draw_intervals<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    track: &IntervalTrack,
    painter: &Painter,
) -> DrawResult<DB> {
    painter.track_name(area, &track.name)?;
    let (_, height) = area.dim_in_pixel();
    let fill = RGBColor::from(track.color).filled();
    for region in &track.regions {
        if let Some((x0, x1)) = painter.scale.span(region.start, region.end) {
            area.draw(&Rectangle::new(
                [(x0, TRACK_PAD), (x1, height as i32 - TRACK_PAD)],
                fill,
            ))?;
        }
    }
    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    track: &HeatmapTrack,
    painter: &Painter,
) -> DrawResult<DB> {
    let num_samples = track.samples.len();
    if num_samples == 0 {
        return Ok(());
    }
    let (_, height) = area.dim_in_pixel();
    let row_height = (height as i32 - 2 * TRACK_PAD) as f64 / num_samples as f64;
    let row_top = |i: usize| TRACK_PAD + (i as f64 * row_height).round() as i32;

    let pixels: Vec<i32> = track
        .positions
        .iter()
        .map(|&p| painter.scale.pixel(p))
        .collect();
    let min_gap = pixels
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|&gap| gap > 0)
        .min()
        .unwrap_or(12);
    let half_width = (min_gap / 2).clamp(1, 6);

    for (site, &x) in pixels.iter().enumerate() {
        for sample in 0..num_samples {
            let color = track.cell_color(site, sample).unwrap_or(MISSING_CELL);
            area.draw(&Rectangle::new(
                [(x - half_width, row_top(sample)), (x + half_width, row_top(sample + 1))],
                RGBColor::from(color).filled(),
            ))?;
        }
    }

    let style = font(track.label_font_size, Rgb::BLACK).pos(Pos::new(HPos::Right, VPos::Center));
    for (i, sample) in track.samples.iter().enumerate() {
        let y = (row_top(i) + row_top(i + 1)) / 2;
        painter.label(area, sample, &style, (LABEL_WIDTH - 8, y))?;
    }
    Ok(())
}

fn draw_lines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    track: &LinePlotTrack,
    painter: &Painter,
) -> DrawResult<DB> {
    let scale = &painter.scale;
    let (_, height) = area.dim_in_pixel();
    let height = height as i32;
    area.draw(&Rectangle::new(
        [(scale.left(), TRACK_PAD), (scale.right(), height - TRACK_PAD)],
        RGBColor::from(Rgb::GREY).stroke_width(1),
    ))?;

    let range = track
        .groups
        .iter()
        .flat_map(|g| g.points.iter().map(|&(_, v)| v))
        .fold(None, |range: Option<(f64, f64)>, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });
    let Some((min, max)) = range else {
        return Ok(());
    };
    let plot_height = (height - 4 * TRACK_PAD) as f64;
    let y_of = |value: f64| {
        let fraction = if max > min { (value - min) / (max - min) } else { 0.5 };
        height - 2 * TRACK_PAD - (fraction * plot_height).round() as i32
    };

    for (i, group) in track.groups.iter().enumerate() {
        let rgb = GROUP_PALETTE[i % GROUP_PALETTE.len()];
        let color = RGBColor::from(rgb);
        let points: Vec<(i32, i32)> = group
            .points
            .iter()
            .map(|&(position, value)| (scale.pixel(position), y_of(value)))
            .collect();
        area.draw(&PathElement::new(points.clone(), color.stroke_width(2)))?;
        for point in points {
            area.draw(&Circle::new(point, 2, color.filled()))?;
        }

        let style = font(painter.font_size, rgb).pos(Pos::new(HPos::Right, VPos::Top));
        let y = TRACK_PAD + i as i32 * (painter.font_size as i32 + 2);
        painter.label(area, &group.label, &style, (LABEL_WIDTH - 8, y))?;
    }
    Ok(())
}
