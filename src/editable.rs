//! Editable-entity primitives shared by the list and tree controllers.
//!
//! `EditableText` keeps an inline-edited value in a two-state form so a
//! failed save can fall back to the last confirmed value instead of leaving
//! the local copy permanently diverged from the backend. `BusyMap` tracks
//! which entities have a mutation in flight, one operation per entity.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// EditableText
// ---------------------------------------------------------------------------

/// An inline-editable text field. `Clean` mirrors the backend; `Dirty`
/// carries both the local edit and the confirmed original it diverged from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditableText {
    Clean(String),
    Dirty { local: String, original: String },
}

impl EditableText {
    pub fn new(value: impl Into<String>) -> Self {
        EditableText::Clean(value.into())
    }

    /// The value to display: the local edit when dirty, the confirmed value
    /// otherwise.
    pub fn value(&self) -> &str {
        match self {
            EditableText::Clean(value) => value,
            EditableText::Dirty { local, .. } => local,
        }
    }

    /// The last backend-confirmed value.
    pub fn original(&self) -> &str {
        match self {
            EditableText::Clean(value) => value,
            EditableText::Dirty { original, .. } => original,
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, EditableText::Dirty { .. })
    }

    /// Apply a local edit. Editing back to the original collapses to
    /// `Clean`, so "undo by retyping" leaves no dirty residue.
    pub fn edit(&mut self, new_value: impl Into<String>) {
        let new_value = new_value.into();
        let original = self.original().to_string();
        *self = if new_value == original {
            EditableText::Clean(original)
        } else {
            EditableText::Dirty {
                local: new_value,
                original,
            }
        };
    }

    /// The save round trip succeeded: the local value becomes confirmed.
    pub fn commit(&mut self) {
        if let EditableText::Dirty { local, .. } = self {
            *self = EditableText::Clean(std::mem::take(local));
        }
    }

    /// The save round trip failed: drop the local edit and fall back to the
    /// confirmed value.
    pub fn revert(&mut self) {
        if let EditableText::Dirty { original, .. } = self {
            *self = EditableText::Clean(std::mem::take(original));
        }
    }
}

// ---------------------------------------------------------------------------
// BusyMap
// ---------------------------------------------------------------------------

/// The kind of mutation in flight for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyOp {
    StatusUpdate,
    Delete,
    Rename,
}

/// In-flight mutation markers, keyed by entity id. A set rather than a
/// single scalar: mutations on different rows may overlap, but an entity
/// with a mutation already in flight refuses a second one.
#[derive(Debug, Default)]
pub struct BusyMap {
    inflight: HashMap<String, BusyOp>,
}

impl BusyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an entity busy. Returns `false` (and changes nothing) when the
    /// entity already has an operation in flight.
    pub fn begin(&mut self, id: &str, op: BusyOp) -> bool {
        if self.inflight.contains_key(id) {
            return false;
        }
        self.inflight.insert(id.to_string(), op);
        true
    }

    /// Clear an entity's busy marker. Must run on every exit path of the
    /// operation that set it.
    pub fn finish(&mut self, id: &str) {
        self.inflight.remove(id);
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.inflight.contains_key(id)
    }

    pub fn op(&self, id: &str) -> Option<BusyOp> {
        self.inflight.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
