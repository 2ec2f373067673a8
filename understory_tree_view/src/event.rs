// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input fed to the tree view and notifications it produces.

use alloc::vec::Vec;
use kurbo::Point;

use crate::types::{ItemId, Key, Modifiers, PointerButton};

/// One input event, in viewport coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeInput {
    /// A pointer button went down.
    PointerDown {
        /// Pointer position.
        pos: Point,
        /// Button pressed.
        button: PointerButton,
        /// 1 for a single click, 2 for a double click, and so on.
        click_count: u8,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// The pointer moved.
    PointerMove {
        /// Pointer position.
        pos: Point,
    },
    /// A pointer button went up.
    PointerUp {
        /// Pointer position.
        pos: Point,
        /// Button released.
        button: PointerButton,
    },
    /// The pointer left the view.
    PointerLeave,
    /// A key intent.
    Key {
        /// The key.
        key: Key,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A typed character. Only consumed while renaming.
    Text(char),
}

/// Notifications for the host. Payloads are ids, never item references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    /// The selection changed; carries the new selection.
    SelectionChanged(Vec<ItemId>),
    /// A row was double-clicked.
    DoubleClick(ItemId),
    /// A secondary click on a row, or on empty space (`None`).
    ContextClick(Option<ItemId>),
    /// A drag ended, dropped or not.
    DragEnded {
        /// The dragged ids.
        dragged: Vec<ItemId>,
        /// Whether the drop was performed.
        accepted: bool,
    },
    /// A rename of an existing item ended.
    RenameEnded {
        /// The edited item.
        id: ItemId,
        /// Whether a new name was applied.
        accepted: bool,
    },
    /// A pending creation ended.
    CreationEnded {
        /// Ephemeral id of the pending row.
        pending: ItemId,
        /// Committed id, or `None` if the creation was cancelled or failed.
        id: Option<ItemId>,
    },
}
