// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: item identifiers, display metadata, and input vocabulary.

use alloc::string::String;
use core::fmt;

/// Identifier of an item in the logical tree.
///
/// Ids are unique across the *entire* backing store, not just the part that is
/// currently materialized. Selection, expansion persistence, and rename matching
/// are all keyed by [`ItemId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque icon reference. Resolution into a texture or glyph is up to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IconHandle(pub u64);

/// Display metadata reported by a backend for a single item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemMeta {
    /// Text drawn in the row's label region.
    pub label: String,
    /// Optional icon drawn in the icon gutter.
    pub icon: Option<IconHandle>,
}

impl ItemMeta {
    /// Metadata with a label and no icon.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
        }
    }

    /// Attach an icon.
    #[must_use]
    pub fn with_icon(mut self, icon: IconHandle) -> Self {
        self.icon = Some(icon);
        self
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers held during an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift: range selection.
        const SHIFT  = 0b0000_0001;
        /// Ctrl on most platforms, Cmd on macOS: toggle selection.
        const ACTION = 0b0000_0010;
        /// Alt/Option: apply expand/collapse to all descendants.
        const ALT    = 0b0000_0100;
    }
}

/// Pointer button identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button; opens context menus.
    Secondary,
    /// Middle button. Ignored by the tree view.
    Auxiliary,
}

/// Key intents understood by the tree view.
///
/// Hosts map their platform key codes onto these; the tree view never sees raw
/// scan codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move to the previous visible row.
    Up,
    /// Move to the next visible row.
    Down,
    /// Collapse, or move to the parent.
    Left,
    /// Expand, or move to the first child.
    Right,
    /// Jump to the first visible row.
    Home,
    /// Jump to the last visible row.
    End,
    /// Move up by one viewport worth of rows.
    PageUp,
    /// Move down by one viewport worth of rows.
    PageDown,
    /// Enter/Return. Accepts an active rename.
    Commit,
    /// Escape. Cancels an active rename or drag.
    Cancel,
    /// Delete the character before the caret while renaming.
    Backspace,
    /// Start renaming the selected row (F2 on most platforms).
    Rename,
    /// Select every visible row.
    SelectAll,
}
