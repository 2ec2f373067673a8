// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for contract violations.

use crate::types::ItemId;

/// Misuse of the tree view contracts.
///
/// These are reported, never used for control flow: a caller that hits one has
/// asked for something impossible (renaming an id that does not exist, expanding
/// an id twice through the low-level set). Conditions the host cannot prevent,
/// such as an item vanishing from the backend between frames, are handled
/// silently instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No item with this id exists in the tree.
    #[error("no item with id {0}")]
    UnknownItem(ItemId),
    /// The id is already a member of the expanded set.
    #[error("item {0} is already expanded")]
    AlreadyExpanded(ItemId),
    /// The id is not a member of the expanded set.
    #[error("item {0} is not expanded")]
    NotExpanded(ItemId),
    /// The backend already holds an item with this id.
    #[error("an item with id {0} already exists")]
    DuplicateItem(ItemId),
    /// A rename session is already active.
    #[error("a rename is already in progress")]
    RenameInProgress,
    /// There is no rename session to end.
    #[error("no rename is in progress")]
    NoActiveRename,
    /// A pending (uncommitted) item is already spliced into the rows.
    #[error("pending item {0} already exists")]
    PendingItemExists(ItemId),
    /// The operation is not allowed while a drag gesture is active.
    #[error("a drag is in progress")]
    DragInProgress,
}
