// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical row geometry: offsets, hit testing, visible ranges, and scrolling math.

use alloc::vec::Vec;
use core::ops::RangeInclusive;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::source::Row;

/// Alignment mode when scrolling a row into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Align the top of the row with the top of the viewport.
    Start,
    /// Center the row within the viewport.
    Center,
    /// Align the bottom of the row with the bottom of the viewport.
    End,
    /// Move just enough to make the row fully visible.
    Nearest,
}

/// How tall each row is.
#[derive(Clone, Copy, Debug)]
pub enum RowHeight {
    /// Every row has the same height. Lookups are `O(1)`.
    Uniform(f64),
    /// Height computed per row. Lookups use prefix sums and a binary search.
    PerRow(fn(&Row) -> f64),
}

impl Default for RowHeight {
    fn default() -> Self {
        Self::Uniform(20.0)
    }
}

#[derive(Clone, Debug)]
enum Extents {
    Uniform { height: f64, len: usize },
    /// `starts[i]` is the top of row `i`; `starts[len]` is the total height.
    Prefix { starts: Vec<f64> },
}

/// Row offsets for one snapshot of the visible rows.
///
/// Rebuilt whenever the row projection changes; queries never allocate.
#[derive(Clone, Debug)]
pub struct RowGeometry {
    extents: Extents,
}

impl Default for RowGeometry {
    fn default() -> Self {
        Self {
            extents: Extents::Uniform {
                height: 0.0,
                len: 0,
            },
        }
    }
}

fn sanitize(height: f64) -> f64 {
    debug_assert!(height.is_finite(), "row heights must be finite; got {height:?}");
    if height.is_sign_negative() || !height.is_finite() {
        0.0
    } else {
        height
    }
}

impl RowGeometry {
    /// Build geometry for `rows`.
    pub fn build(rows: &[Row], height: RowHeight) -> Self {
        let extents = match height {
            RowHeight::Uniform(h) => Extents::Uniform {
                height: sanitize(h),
                len: rows.len(),
            },
            RowHeight::PerRow(f) => {
                let mut starts = Vec::with_capacity(rows.len() + 1);
                let mut pos = 0.0;
                for row in rows {
                    starts.push(pos);
                    pos += sanitize(f(row));
                }
                starts.push(pos);
                Extents::Prefix { starts }
            }
        };
        tracing::trace!(rows = rows.len(), "row geometry rebuilt");
        Self { extents }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match &self.extents {
            Extents::Uniform { len, .. } => *len,
            Extents::Prefix { starts } => starts.len().saturating_sub(1),
        }
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total content height.
    pub fn total_height(&self) -> f64 {
        match &self.extents {
            Extents::Uniform { height, len } => *height * *len as f64,
            Extents::Prefix { starts } => starts.last().copied().unwrap_or(0.0),
        }
    }

    /// Top of row `index`, in content coordinates. Clamped to the total height.
    pub fn row_top(&self, index: usize) -> f64 {
        match &self.extents {
            Extents::Uniform { height, len } => *height * index.min(*len) as f64,
            Extents::Prefix { starts } => starts
                .get(index)
                .or(starts.last())
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// Height of row `index`, or `0.0` out of range.
    pub fn row_height(&self, index: usize) -> f64 {
        if index >= self.len() {
            return 0.0;
        }
        match &self.extents {
            Extents::Uniform { height, .. } => *height,
            Extents::Prefix { starts } => starts[index + 1] - starts[index],
        }
    }

    /// Bottom of row `index`.
    pub fn row_bottom(&self, index: usize) -> f64 {
        self.row_top(index) + self.row_height(index)
    }

    /// The row covering content offset `y`, if any.
    pub fn row_at(&self, y: f64) -> Option<usize> {
        if y < 0.0 || y >= self.total_height() {
            return None;
        }
        let index = self.last_row_starting_at_or_before(y);
        Some(index)
    }

    fn last_row_starting_at_or_before(&self, y: f64) -> usize {
        let len = self.len();
        if len == 0 {
            return 0;
        }
        match &self.extents {
            Extents::Uniform { height, .. } => {
                if *height <= 0.0 {
                    return 0;
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "The value is non-negative and clamped to the row count."
                )]
                let i = (y.max(0.0) / *height) as usize;
                i.min(len - 1)
            }
            // Zero-height rows share a start; take the last of them.
            Extents::Prefix { starts } => starts[..len]
                .partition_point(|s| *s <= y)
                .saturating_sub(1),
        }
    }

    fn last_row_starting_before(&self, y: f64) -> usize {
        let len = self.len();
        if len == 0 {
            return 0;
        }
        match &self.extents {
            Extents::Uniform { height, .. } => {
                if *height <= 0.0 {
                    return len - 1;
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "The value is non-negative and clamped to the row count."
                )]
                let i = (y / *height).ceil().max(1.0) as usize - 1;
                i.min(len - 1)
            }
            Extents::Prefix { starts } => starts[..len]
                .partition_point(|s| *s < y)
                .saturating_sub(1),
        }
    }

    /// The smallest inclusive range of rows overlapping the viewport
    /// `[scroll, scroll + viewport_height)`.
    pub fn visible_range(&self, scroll: f64, viewport_height: f64) -> Option<RangeInclusive<usize>> {
        if viewport_height <= 0.0 {
            return None;
        }
        let first = self.row_at(scroll.max(0.0))?;
        let last = self.last_row_starting_before(scroll.max(0.0) + viewport_height);
        Some(first..=last.max(first))
    }

    /// Row reached by paging down one viewport from `index`.
    pub fn page_down(&self, index: usize, viewport_height: f64) -> usize {
        let len = self.len();
        if len == 0 {
            return 0;
        }
        let y = self.row_top(index) + viewport_height.max(0.0);
        let target = self.row_at(y).unwrap_or(len - 1);
        // Always make progress, even when a single row is taller than the viewport.
        target.max((index + 1).min(len - 1))
    }

    /// Row reached by paging up one viewport from `index`.
    pub fn page_up(&self, index: usize, viewport_height: f64) -> usize {
        if self.is_empty() || index == 0 {
            return 0;
        }
        let y = (self.row_top(index) - viewport_height.max(0.0)).max(0.0);
        let target = self.last_row_starting_at_or_before(y);
        target.min(index - 1)
    }

    /// Largest valid scroll offset for a viewport of `viewport_height`.
    pub fn max_scroll(&self, viewport_height: f64) -> f64 {
        (self.total_height() - viewport_height).max(0.0)
    }

    /// Clamp `scroll` so the viewport stays within the content.
    pub fn clamp_scroll(&self, scroll: f64, viewport_height: f64) -> f64 {
        scroll.clamp(0.0, self.max_scroll(viewport_height))
    }

    /// Scroll offset that brings row `index` into view with `align`.
    pub fn scroll_to_row(
        &self,
        index: usize,
        align: ScrollAlign,
        current: f64,
        viewport_height: f64,
    ) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let index = index.min(self.len() - 1);
        let top = self.row_top(index);
        let bottom = self.row_bottom(index);
        let offset = match align {
            ScrollAlign::Start => top,
            ScrollAlign::End => bottom - viewport_height,
            ScrollAlign::Center => (top + bottom) / 2.0 - viewport_height / 2.0,
            ScrollAlign::Nearest => {
                if top >= current && bottom <= current + viewport_height {
                    current
                } else if top < current {
                    top
                } else {
                    bottom - viewport_height
                }
            }
        };
        self.clamp_scroll(offset, viewport_height)
    }
}
