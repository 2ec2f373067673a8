// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render surface: per-row layout and the painter contract.
//!
//! The tree view never draws. For each visible row it computes a [`RowVisual`]
//! (rects for the disclosure affordance, icon, and label, plus state flags) and
//! hands it to a [`RowPainter`] supplied by the host.

use kurbo::{Point, Rect};

use crate::config::TreeViewConfig;
use crate::rename::RenameOverlay;
use crate::types::{IconHandle, ItemId};

/// Horizontal layout of one row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RowLayout {
    /// Disclosure affordance region.
    pub disclosure: Rect,
    /// Icon gutter.
    pub icon: Rect,
    /// Label region; also where the rename overlay goes.
    pub label: Rect,
}

/// Left edge of content at `depth`.
pub fn indent_x(config: &TreeViewConfig, row: Rect, depth: u32) -> f64 {
    row.x0 + config.base_indent + f64::from(depth) * config.indent_width
}

/// Lay out a row at display `depth` (the first visible level is 0).
pub fn layout_row(config: &TreeViewConfig, row: Rect, depth: u32) -> RowLayout {
    let x = indent_x(config, row, depth);
    let disclosure = Rect::new(x, row.y0, x + config.disclosure_width, row.y1);
    let icon_top = row.y0 + ((row.height() - config.icon_size) / 2.0).max(0.0);
    let icon = Rect::new(
        disclosure.x1,
        icon_top,
        disclosure.x1 + config.icon_size,
        (icon_top + config.icon_size).min(row.y1),
    );
    let label_x = (icon.x1 + config.icon_spacing).min(row.x1);
    let label = Rect::new(label_x, row.y0, row.x1.max(label_x), row.y1);
    RowLayout {
        disclosure,
        icon,
        label,
    }
}

/// Disclosure affordance state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Disclosure {
    /// Where to draw it.
    pub rect: Rect,
    /// Whether the row is expanded.
    pub expanded: bool,
}

/// Everything needed to paint one row.
#[derive(Clone, Debug, PartialEq)]
pub struct RowVisual<'a> {
    /// Index in the visible rows.
    pub index: usize,
    /// Row id (ephemeral for the pending row).
    pub id: ItemId,
    /// Display depth: tree depth, minus one when the root is hidden.
    pub depth: u32,
    /// Full row rect, in viewport coordinates.
    pub rect: Rect,
    /// Present only for rows with children.
    pub disclosure: Option<Disclosure>,
    /// Icon gutter.
    pub icon_rect: Rect,
    /// Label region.
    pub label_rect: Rect,
    /// Label text.
    pub label: &'a str,
    /// Icon, if the item has one.
    pub icon: Option<IconHandle>,
    /// Whether the row is selected.
    pub selected: bool,
    /// Whether the row is the selection anchor.
    pub focused: bool,
    /// Whether this is the uncommitted pending row.
    pub pending: bool,
    /// Whether the current drag would drop onto this row.
    pub drop_target: bool,
    /// Whether the row is being renamed; the label is covered by the overlay.
    pub renaming: bool,
}

/// Drag feedback.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DropIndicator {
    /// Highlight a row; items become its children.
    Onto(Rect),
    /// Insertion line.
    Between {
        /// Line start.
        from: Point,
        /// Line end.
        to: Point,
    },
    /// Highlight the empty area; items go under the root.
    Root(Rect),
    /// The drop would be refused. Carries the hovered row rect, if any.
    Rejected(Option<Rect>),
}

/// Host-supplied drawing.
///
/// Called once per visible row in order, then for the drop indicator, the
/// rename overlay, and the ping. Only [`row`](RowPainter::row) is required.
pub trait RowPainter {
    /// Draw a row.
    fn row(&mut self, row: &RowVisual<'_>);

    /// Draw extra decoration over a row, such as a status badge on the icon.
    fn row_overlay(&mut self, row: &RowVisual<'_>) {
        let _ = row;
    }

    /// Draw drag feedback.
    fn drop_indicator(&mut self, indicator: DropIndicator) {
        let _ = indicator;
    }

    /// Draw the rename editor.
    fn rename_overlay(&mut self, overlay: &RenameOverlay<'_>) {
        let _ = overlay;
    }

    /// Draw a ping highlight with `intensity` in `(0, 1]`.
    fn ping(&mut self, rect: Rect, intensity: f64) {
        let _ = (rect, intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_depth() {
        let config = TreeViewConfig::default();
        let row = Rect::new(0.0, 40.0, 200.0, 60.0);
        let top = layout_row(&config, row, 0);
        let nested = layout_row(&config, row, 2);
        assert_eq!(top.disclosure.x0, config.base_indent);
        assert_eq!(nested.disclosure.x0 - top.disclosure.x0, 2.0 * config.indent_width);
        assert_eq!(nested.icon.x0, nested.disclosure.x1);
        assert_eq!(nested.label.x0, nested.icon.x1 + config.icon_spacing);
        assert_eq!(nested.label.x1, 200.0);
        // 16px icon centered in a 20px row.
        assert_eq!(top.icon.y0, 42.0);
        assert_eq!(top.icon.y1, 58.0);
    }

    #[test]
    fn deep_rows_clamp_the_label() {
        let config = TreeViewConfig::default();
        let row = Rect::new(0.0, 0.0, 50.0, 20.0);
        let layout = layout_row(&config, row, 10);
        assert_eq!(layout.label.width(), 0.0);
    }
}
