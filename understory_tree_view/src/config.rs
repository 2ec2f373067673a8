// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree view configuration.

use crate::geometry::RowHeight;

/// Layout metrics and interaction tuning for a [`TreeView`](crate::TreeView).
///
/// All lengths are in logical pixels; durations are milliseconds of the host's
/// monotonic clock.
#[derive(Clone, Copy, Debug)]
pub struct TreeViewConfig {
    /// Row heights.
    pub row_height: RowHeight,
    /// Left padding before the first indentation level.
    pub base_indent: f64,
    /// Horizontal offset per depth level.
    pub indent_width: f64,
    /// Width reserved for the disclosure affordance.
    pub disclosure_width: f64,
    /// Width of the icon gutter (icons are square).
    pub icon_size: f64,
    /// Gap between the icon and the label.
    pub icon_spacing: f64,
    /// Height of the "between" band at the bottom of each row during drags.
    pub between_band: f64,
    /// Pointer travel needed to turn a press into a drag.
    pub drag_threshold: f64,
    /// Hover time over a collapsed row before a drag expands it.
    pub auto_expand_delay_ms: u64,
    /// Lifetime of a ping highlight.
    pub ping_duration_ms: u64,
    /// Whether more than one row can be selected.
    pub multi_select: bool,
}

impl Default for TreeViewConfig {
    fn default() -> Self {
        Self {
            row_height: RowHeight::default(),
            base_indent: 2.0,
            indent_width: 14.0,
            disclosure_width: 14.0,
            icon_size: 16.0,
            icon_spacing: 2.0,
            between_band: 6.0,
            drag_threshold: 4.0,
            auto_expand_delay_ms: 700,
            ping_duration_ms: 1_500,
            multi_select: true,
        }
    }
}

impl TreeViewConfig {
    /// Set the row height model.
    #[must_use]
    pub fn with_row_height(mut self, row_height: RowHeight) -> Self {
        self.row_height = row_height;
        self
    }

    /// Set the indentation metrics.
    #[must_use]
    pub fn with_indent(mut self, base_indent: f64, indent_width: f64) -> Self {
        self.base_indent = base_indent;
        self.indent_width = indent_width;
        self
    }

    /// Set the "between" drop band height.
    #[must_use]
    pub fn with_between_band(mut self, band: f64) -> Self {
        self.between_band = band;
        self
    }

    /// Set the drag start threshold.
    #[must_use]
    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold;
        self
    }

    /// Set the auto-expand hover delay.
    #[must_use]
    pub fn with_auto_expand_delay(mut self, delay_ms: u64) -> Self {
        self.auto_expand_delay_ms = delay_ms;
        self
    }

    /// Set the ping duration.
    #[must_use]
    pub fn with_ping_duration(mut self, duration_ms: u64) -> Self {
        self.ping_duration_ms = duration_ms;
        self
    }

    /// Enable or disable multi-selection.
    #[must_use]
    pub fn with_multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }
}
