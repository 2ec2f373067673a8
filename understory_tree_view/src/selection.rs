// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection state and click-derived selection rules.

use alloc::vec::Vec;

use crate::types::{ItemId, Modifiers};

/// The selected ids plus the anchor used for range clicks and keyboard moves.
///
/// The selection may reference ids that are not currently visible (inside a
/// collapsed subtree). Order is the order in which ids were selected, except for
/// range selections, which follow row order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ItemId>,
    anchor: Option<ItemId>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids.
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    /// The last-clicked id.
    pub fn anchor(&self) -> Option<ItemId> {
        self.anchor
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the selection and anchor. Returns `true` if the ids changed.
    pub fn set(&mut self, ids: Vec<ItemId>, anchor: Option<ItemId>) -> bool {
        self.anchor = anchor;
        if ids == self.ids {
            return false;
        }
        self.ids = ids;
        true
    }

    /// Clear the ids and the anchor. Returns `true` if the ids changed.
    pub fn clear(&mut self) -> bool {
        self.set(Vec::new(), None)
    }

    /// Keep only ids for which `keep` holds. Returns `true` if any were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(ItemId) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| keep(*id));
        if self.anchor.is_some_and(|a| !keep(a)) {
            self.anchor = None;
        }
        self.ids.len() != before
    }
}

/// Modifier interpretation for a click.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClickSelect {
    /// Toggle the clicked id, keeping the rest of the selection.
    pub keep_multi_selection: bool,
    /// Select the visible range from the anchor to the clicked id.
    pub range: bool,
}

impl ClickSelect {
    /// Read the flags from held modifiers.
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        Self {
            keep_multi_selection: modifiers.contains(Modifiers::ACTION),
            range: modifiers.contains(Modifiers::SHIFT),
        }
    }

    /// Whether either flag is set.
    pub fn is_modified(self) -> bool {
        self.keep_multi_selection || self.range
    }
}

/// Compute the selection after clicking `clicked`.
///
/// - Plain click: `{clicked}`, anchor moves to `clicked`.
/// - Toggle: flip `clicked` in the current selection, anchor moves to `clicked`.
/// - Range: the visible rows from the anchor to `clicked` inclusive replace the
///   selection; the anchor stays.
///
/// `allow_multi` is `false` when the clicked item forbids multi-selection; the
/// click then behaves as a plain click. A range click with no visible anchor
/// also degrades to a plain click.
///
/// ```
/// use understory_tree_view::{ClickSelect, ItemId, Selection, selection_after_click};
///
/// let rows: Vec<ItemId> = (0..5).map(ItemId).collect();
/// let mut current = Selection::new();
/// current.set(vec![ItemId(1)], Some(ItemId(1)));
///
/// let range = ClickSelect { range: true, ..ClickSelect::default() };
/// let next = selection_after_click(ItemId(3), range, true, &current, &rows);
/// assert_eq!(next.ids(), &[ItemId(1), ItemId(2), ItemId(3)]);
/// assert_eq!(next.anchor(), Some(ItemId(1)));
/// ```
pub fn selection_after_click(
    clicked: ItemId,
    click: ClickSelect,
    allow_multi: bool,
    current: &Selection,
    visible: &[ItemId],
) -> Selection {
    let plain = || Selection {
        ids: alloc::vec![clicked],
        anchor: Some(clicked),
    };
    if !allow_multi {
        return plain();
    }
    if click.range {
        let anchor_row = current
            .anchor
            .and_then(|a| visible.iter().position(|v| *v == a));
        let clicked_row = visible.iter().position(|v| *v == clicked);
        return match (anchor_row, clicked_row) {
            (Some(a), Some(c)) => Selection {
                ids: visible[a.min(c)..=a.max(c)].to_vec(),
                anchor: current.anchor,
            },
            _ => plain(),
        };
    }
    if click.keep_multi_selection {
        let mut ids = current.ids.clone();
        if let Some(pos) = ids.iter().position(|id| *id == clicked) {
            ids.remove(pos);
        } else {
            ids.push(clicked);
        }
        return Selection {
            ids,
            anchor: Some(clicked),
        };
    }
    plain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn rows() -> Vec<ItemId> {
        (0..5).map(ItemId).collect()
    }

    #[test]
    fn range_then_plain_click() {
        // Rows a..e are ids 0..5; anchor on b.
        let mut current = Selection::new();
        current.set(vec![ItemId(1)], Some(ItemId(1)));
        let shift = ClickSelect::from_modifiers(Modifiers::SHIFT);
        let next = selection_after_click(ItemId(3), shift, true, &current, &rows());
        assert_eq!(next.ids(), &[ItemId(1), ItemId(2), ItemId(3)]);
        assert_eq!(next.anchor(), Some(ItemId(1)));

        let next = selection_after_click(ItemId(0), ClickSelect::default(), true, &next, &rows());
        assert_eq!(next.ids(), &[ItemId(0)]);
        assert_eq!(next.anchor(), Some(ItemId(0)));
    }

    #[test]
    fn range_upwards_follows_row_order() {
        let mut current = Selection::new();
        current.set(vec![ItemId(4)], Some(ItemId(4)));
        let shift = ClickSelect::from_modifiers(Modifiers::SHIFT);
        let next = selection_after_click(ItemId(2), shift, true, &current, &rows());
        assert_eq!(next.ids(), &[ItemId(2), ItemId(3), ItemId(4)]);
    }

    #[test]
    fn toggle_adds_and_removes() {
        let action = ClickSelect::from_modifiers(Modifiers::ACTION);
        let mut current = Selection::new();
        current.set(vec![ItemId(1)], Some(ItemId(1)));
        let next = selection_after_click(ItemId(3), action, true, &current, &rows());
        assert_eq!(next.ids(), &[ItemId(1), ItemId(3)]);
        assert_eq!(next.anchor(), Some(ItemId(3)));
        let next = selection_after_click(ItemId(1), action, true, &next, &rows());
        assert_eq!(next.ids(), &[ItemId(3)]);
        assert_eq!(next.anchor(), Some(ItemId(1)));
    }

    #[test]
    fn forbidden_multi_select_is_a_plain_click() {
        let mut current = Selection::new();
        current.set(vec![ItemId(1)], Some(ItemId(1)));
        let both = ClickSelect::from_modifiers(Modifiers::SHIFT | Modifiers::ACTION);
        let next = selection_after_click(ItemId(3), both, false, &current, &rows());
        assert_eq!(next.ids(), &[ItemId(3)]);
        assert_eq!(next.anchor(), Some(ItemId(3)));
    }

    #[test]
    fn range_without_visible_anchor_is_a_plain_click() {
        let mut current = Selection::new();
        current.set(vec![ItemId(9)], Some(ItemId(9)));
        let shift = ClickSelect::from_modifiers(Modifiers::SHIFT);
        let next = selection_after_click(ItemId(2), shift, true, &current, &rows());
        assert_eq!(next.ids(), &[ItemId(2)]);
    }

    #[test]
    fn retain_drops_missing_anchor() {
        let mut sel = Selection::new();
        sel.set(vec![ItemId(1), ItemId(2)], Some(ItemId(2)));
        assert!(sel.retain(|id| id != ItemId(2)));
        assert_eq!(sel.ids(), &[ItemId(1)]);
        assert_eq!(sel.anchor(), None);
        assert!(!sel.retain(|_| true));
    }
}
