//! Virtual-scroll window arithmetic for fixed-height rows.

use serde::{Deserialize, Serialize};

/// Inputs to [`compute_window`]. Heights and offsets are in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportMetrics {
    pub row_height: f64,
    pub container_height: f64,
    pub scroll_top: f64,
    pub overscan: usize,
    pub row_count: usize,
}

/// The index range to materialize and where to place it.
///
/// Always `visible_start_index <= visible_end_index <= row_count`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualWindow {
    pub scroll_top: f64,
    pub visible_start_index: usize,
    pub visible_end_index: usize,
    pub total_height: f64,
    pub offset_y: f64,
}

impl VirtualWindow {
    pub fn len(&self) -> usize {
        self.visible_end_index - self.visible_start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `ceil(container_height / row_height)`, zero when either height is not positive.
pub fn rows_fitting(container_height: f64, row_height: f64) -> usize {
    if row_height <= 0.0 || container_height <= 0.0 || !container_height.is_finite() {
        return 0;
    }
    (container_height / row_height).ceil() as usize
}

/// Overscan used when none is configured: half a screen, at least three rows.
pub fn default_overscan(container_height: f64, row_height: f64) -> usize {
    (rows_fitting(container_height, row_height) / 2).max(3)
}

pub fn compute_window(metrics: &ViewportMetrics) -> VirtualWindow {
    let ViewportMetrics {
        row_height,
        container_height,
        overscan,
        row_count,
        ..
    } = *metrics;
    let scroll_top = if metrics.scroll_top.is_finite() {
        metrics.scroll_top.max(0.0)
    } else {
        0.0
    };

    if row_height <= 0.0 || !row_height.is_finite() {
        return VirtualWindow {
            scroll_top,
            ..VirtualWindow::default()
        };
    }
    let total_height = row_count as f64 * row_height;

    let fitting = rows_fitting(container_height, row_height);
    if fitting == 0 {
        return VirtualWindow {
            scroll_top,
            total_height,
            ..VirtualWindow::default()
        };
    }

    let first = (scroll_top / row_height).floor() as usize;
    let end = first
        .saturating_add(fitting)
        .saturating_add(overscan)
        .min(row_count);
    let start = first.saturating_sub(overscan).min(end);

    VirtualWindow {
        scroll_top,
        visible_start_index: start,
        visible_end_index: end,
        total_height,
        offset_y: start as f64 * row_height,
    }
}

/// Scroll offset that puts row `index` at the top of the viewport.
pub fn row_offset(index: usize, row_height: f64) -> f64 {
    index as f64 * row_height.max(0.0)
}

/// Scroll offset of the last row, zero for an empty set.
pub fn bottom_offset(row_count: usize, row_height: f64) -> f64 {
    row_offset(row_count.saturating_sub(1), row_height)
}

/// Rendered box of a sample row. Margins are CSS length strings such as `"4px"`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoxMetrics {
    pub height: f64,
    pub margin_top: String,
    pub margin_bottom: String,
}

/// Parse a CSS pixel length (`"4px"`, `"4"`, `" 2.5px "`). Anything else reads as 0.
pub fn parse_css_length(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    match number.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Effective row height: box height plus vertical margins.
pub fn measure_row_height(metrics: &BoxMetrics) -> f64 {
    metrics.height + parse_css_length(&metrics.margin_top) + parse_css_length(&metrics.margin_bottom)
}
