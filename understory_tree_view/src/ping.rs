// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transient highlight that draws attention to a row.

use kurbo::Rect;

use crate::types::ItemId;

/// A decaying highlight over a row.
///
/// The ping remembers the last screen rect of its row so it keeps fading out in
/// place when the row scrolls away or is collapsed. It never blocks input.
#[derive(Clone, Debug, PartialEq)]
pub struct Ping {
    id: ItemId,
    started_ms: u64,
    duration_ms: u64,
    rect: Option<Rect>,
}

impl Ping {
    /// Start a ping on `id` at `now_ms`.
    pub fn new(id: ItemId, now_ms: u64, duration_ms: u64) -> Self {
        Self {
            id,
            started_ms: now_ms,
            duration_ms,
            rect: None,
        }
    }

    /// The pinged row.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Last known screen rect of the row.
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Record where the row was last drawn.
    pub fn track(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }

    /// Strength in `(0, 1]`, or `None` once the ping has expired.
    pub fn intensity(&self, now_ms: u64) -> Option<f64> {
        let elapsed = now_ms.saturating_sub(self.started_ms);
        if self.duration_ms == 0 || elapsed >= self.duration_ms {
            return None;
        }
        Some(1.0 - elapsed as f64 / self.duration_ms as f64)
    }

    /// Whether the ping has run its course.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.intensity(now_ms).is_none()
    }
}
