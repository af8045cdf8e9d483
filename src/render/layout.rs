//! Pixel layout: track heights, the genomic x scale, axis ticks and gene rows.

use crate::{plot::Window, Position};

/// Split `total` pixels between tracks in proportion to their weights. Any
/// rounding remainder goes to the last track, so the heights sum to `total`.
pub fn track_heights(weights: &[u32], total: u32) -> Vec<u32> {
    let weight_sum: u64 = weights.iter().map(|&w| w as u64).sum();
    if weight_sum == 0 {
        return vec![0; weights.len()];
    }
    let mut heights: Vec<u32> = weights
        .iter()
        .map(|&w| (total as u64 * w as u64 / weight_sum) as u32)
        .collect();
    let used: u32 = heights.iter().sum();
    if let Some(last) = heights.last_mut() {
        *last += total - used;
    }
    heights
}

/// Maps genomic positions in a window onto a horizontal pixel range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XScale {
    from: Position,
    to: Position,
    left: i32,
    right: i32,
}

impl XScale {
    pub fn new(window: Window, left: i32, right: i32) -> Self {
        Self {
            from: window.from,
            to: window.to,
            left,
            right,
        }
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn pixel(&self, position: Position) -> i32 {
        let span = (self.to - self.from).max(1) as f64;
        let fraction = (position as f64 - self.from as f64) / span;
        self.left + (fraction * (self.right - self.left) as f64).round() as i32
    }

    /// Pixel extent of `[start, end]` clipped to the window; `None` if the
    /// range lies entirely outside it. Every visible range is at least one
    /// pixel wide.
    pub fn span(&self, start: Position, end: Position) -> Option<(i32, i32)> {
        if end < self.from || start > self.to {
            return None;
        }
        let x0 = self.pixel(start.max(self.from));
        let x1 = self.pixel(end.min(self.to));
        Some((x0, x1.max(x0 + 1)))
    }
}

/// A "nice" tick spacing (1, 2 or 5 times a power of ten) giving roughly
/// `target` ticks over `span` bases.
pub fn tick_step(span: u64, target: usize) -> u64 {
    let raw = (span as f64 / target.max(1) as f64).max(1.0);
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    (nice * magnitude) as u64
}

/// Tick positions inside `[from, to]`, all multiples of [`tick_step`].
pub fn axis_ticks(from: Position, to: Position, target: usize) -> Vec<Position> {
    let step = tick_step(to.saturating_sub(from) as u64, target);
    let mut tick = (from as u64).div_ceil(step) * step;
    let mut ticks = Vec::new();
    while tick <= to as u64 {
        ticks.push(tick as Position);
        tick += step;
    }
    ticks
}

/// Format a position with thousands separators, e.g. `27,015,600`.
pub fn format_position(position: Position) -> String {
    let digits = position.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(c);
    }
    formatted
}

/// Greedily assign each span to the first row where it does not overlap the
/// previous span. Spans should be ordered by start.
pub fn pack_rows(spans: &[(i32, i32)]) -> Vec<usize> {
    let mut row_ends: Vec<i32> = Vec::new();
    spans
        .iter()
        .map(|&(start, end)| match row_ends.iter().position(|&e| e < start) {
            Some(row) => {
                row_ends[row] = end;
                row
            }
            None => {
                row_ends.push(end);
                row_ends.len() - 1
            }
        })
        .collect()
}
