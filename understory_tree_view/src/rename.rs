// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rename-in-place: the edit session and the commit hooks.

use alloc::string::String;
use kurbo::Rect;

use crate::source::PendingItem;
use crate::types::ItemId;

/// What a rename session edits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenameTarget {
    /// A committed item.
    Existing(ItemId),
    /// The pending item with this ephemeral id; accepting creates it.
    Creating(ItemId),
}

impl RenameTarget {
    /// The row id the session is attached to.
    pub fn id(self) -> ItemId {
        match self {
            Self::Existing(id) | Self::Creating(id) => id,
        }
    }
}

/// How an accepted session resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameResolution {
    /// Apply this (trimmed) name.
    Commit(String),
    /// Keep the original name. Used for empty and unchanged text.
    Revert,
}

/// Live state of an in-place edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameSession {
    target: RenameTarget,
    original: String,
    text: String,
    accepted: Option<bool>,
}

impl RenameSession {
    /// Start editing with the original text as the initial value.
    pub fn new(target: RenameTarget, original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            target,
            text: original.clone(),
            original,
            accepted: None,
        }
    }

    /// The edited row.
    pub fn target(&self) -> RenameTarget {
        self.target
    }

    /// Text before editing.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Current edit text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the edit text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.accepted.is_none() {
            self.text = text.into();
        }
    }

    /// `Some(true)` once accepted, `Some(false)` once cancelled, `None` while live.
    pub fn accepted(&self) -> Option<bool> {
        self.accepted
    }

    /// Close the session, recording whether the user accepted it.
    ///
    /// A cancelled session always reverts. Edits after closing are ignored.
    pub fn finish(&mut self, accept: bool) -> RenameResolution {
        self.accepted = Some(accept);
        if accept {
            self.resolve()
        } else {
            RenameResolution::Revert
        }
    }

    /// Append a character. Control characters are ignored.
    pub fn insert_char(&mut self, ch: char) {
        if self.accepted.is_none() && !ch.is_control() {
            self.text.push(ch);
        }
    }

    /// Delete the last character.
    pub fn backspace(&mut self) {
        if self.accepted.is_none() {
            self.text.pop();
        }
    }

    /// Resolve the session as if the user accepted it.
    ///
    /// Whitespace-only text reverts. Renaming an existing item to its current
    /// name also reverts; a pending creation keeps its initial name.
    pub fn resolve(&self) -> RenameResolution {
        let name = self.text.trim();
        if name.is_empty() {
            return RenameResolution::Revert;
        }
        match self.target {
            RenameTarget::Existing(_) if name == self.original => RenameResolution::Revert,
            _ => RenameResolution::Commit(name.into()),
        }
    }
}

/// Commit hooks for accepted edits.
///
/// The hooks receive the data source's backend so a host can apply the change
/// where the data lives.
pub trait RenameHandler<B: ?Sized> {
    /// Apply `name` to `id`. Return `false` to reject the rename.
    fn rename(&mut self, backend: &mut B, id: ItemId, name: &str) -> bool;

    /// Create the pending item with `name`. Returns the committed id, or `None`
    /// if creation failed.
    fn create(&mut self, backend: &mut B, pending: &PendingItem, name: &str) -> Option<ItemId>;
}

/// Rejects every edit.
impl<B: ?Sized> RenameHandler<B> for () {
    fn rename(&mut self, _backend: &mut B, _id: ItemId, _name: &str) -> bool {
        false
    }

    fn create(&mut self, _backend: &mut B, _pending: &PendingItem, _name: &str) -> Option<ItemId> {
        None
    }
}

/// Where and what to draw for the active rename.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenameOverlay<'a> {
    /// The row's label region, in viewport coordinates.
    pub rect: Rect,
    /// Current edit text.
    pub text: &'a str,
    /// The edited row.
    pub target: RenameTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unchanged_revert() {
        let mut session = RenameSession::new(RenameTarget::Existing(ItemId(42)), "report");
        assert_eq!(session.resolve(), RenameResolution::Revert);
        session.set_text("   ");
        assert_eq!(session.resolve(), RenameResolution::Revert);
        session.set_text("");
        assert_eq!(session.resolve(), RenameResolution::Revert);
        session.set_text(" report ");
        assert_eq!(session.resolve(), RenameResolution::Revert);
    }

    #[test]
    fn edits_commit_trimmed() {
        let mut session = RenameSession::new(RenameTarget::Existing(ItemId(1)), "ab");
        session.backspace();
        session.insert_char('z');
        session.insert_char('\n');
        session.insert_char(' ');
        assert_eq!(session.text(), "az ");
        assert_eq!(session.resolve(), RenameResolution::Commit("az".into()));
        assert_eq!(session.original(), "ab");
    }

    #[test]
    fn finishing_records_the_outcome() {
        let mut session = RenameSession::new(RenameTarget::Existing(ItemId(3)), "old");
        session.set_text("new");
        assert_eq!(session.accepted(), None);
        assert_eq!(session.finish(false), RenameResolution::Revert);
        assert_eq!(session.accepted(), Some(false));

        let mut session = RenameSession::new(RenameTarget::Existing(ItemId(3)), "old");
        session.set_text("new");
        assert_eq!(session.finish(true), RenameResolution::Commit("new".into()));
        assert_eq!(session.accepted(), Some(true));
        session.insert_char('!');
        session.set_text("later");
        assert_eq!(session.text(), "new");
    }

    #[test]
    fn creation_keeps_initial_name() {
        let session = RenameSession::new(RenameTarget::Creating(ItemId(-1)), "New Folder");
        assert_eq!(
            session.resolve(),
            RenameResolution::Commit("New Folder".into())
        );
        assert_eq!(session.target().id(), ItemId(-1));
    }
}
