//! Structure Editor - the ordered, pre-generation list of sections or slides
//!
//! Sections and slides follow two different identity strategies:
//!
//! - **Append-only** (sections): a new id is one past the largest id in
//!   the structure. Reordering and renaming never change an id.
//! - **Positional** (slides): a slide's id is its 1-based position. Moving a
//!   slide swaps titles between positions, and removal renumbers the tail.
//!
//! Every mutation leaves at least one unit in the structure.


use crate::models::{OutlineEntry, UnitKind, MAX_SLIDES};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Minimum number of units in any structure
pub const MIN_UNITS: usize = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("A {} structure must keep at least one unit", .kind.plural())]
    MinimumUnitsViolation { kind: UnitKind },

    #[error("No unit with id {0}")]
    UnitNotFound(u32),

    #[error("A deck holds at most {max} slides")]
    MaximumUnitsReached { max: usize },

    #[error("'{operation}' is not supported for {}", .kind.plural())]
    UnsupportedOperation {
        operation: &'static str,
        kind: UnitKind,
    },

    #[error("Structure invariant broken: {0}")]
    InvariantViolation(String),
}

/// How unit identifiers are issued and maintained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// Monotonic ids that survive reorder and removal of other units
    AppendOnly,
    /// Ids always equal 1-based positions
    Positional,
}

impl IdentityPolicy {
    pub fn for_kind(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Sections => IdentityPolicy::AppendOnly,
            UnitKind::Slides => IdentityPolicy::Positional,
        }
    }
}

/// In-memory editor for one structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureEditor {
    kind: UnitKind,
    entries: Vec<OutlineEntry>,
}

impl StructureEditor {
    /// Create an editor holding the starter structure for a kind
    pub fn new(kind: UnitKind) -> Self {
        let entries: Vec<OutlineEntry> = kind
            .starter_titles()
            .iter()
            .zip(1u32..)
            .map(|(title, id)| OutlineEntry::new(id, *title))
            .collect();
        Self { kind, entries }
    }

    /// Create an editor from explicit titles. Empty input falls back to the
    /// starter structure; slide decks are capped at the maximum.
    pub fn from_titles<S: AsRef<str>>(kind: UnitKind, titles: &[S]) -> Self {
        let mut editor = Self::new(kind);
        let entries: Vec<OutlineEntry> = titles
            .iter()
            .zip(1u32..)
            .map(|(title, id)| OutlineEntry::new(id, title.as_ref()))
            .collect();
        editor.apply_outline(entries);
        editor
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn policy(&self) -> IdentityPolicy {
        IdentityPolicy::for_kind(self.kind)
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Titles in order, as sent with a generation request
    pub fn titles(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.title.clone()).collect()
    }

    pub fn get(&self, id: u32) -> Option<&OutlineEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Position (0-based) of the unit with this id
    pub fn position_of(&self, id: u32) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Append a unit with a default title and return its id
    pub fn add_unit(&mut self) -> Result<u32, StructureError> {
        let id = match self.policy() {
            IdentityPolicy::AppendOnly => {
                self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
            }
            IdentityPolicy::Positional => {
                if self.entries.len() >= MAX_SLIDES {
                    return Err(StructureError::MaximumUnitsReached { max: MAX_SLIDES });
                }
                self.entries.len() as u32 + 1
            }
        };

        let title = self.kind.default_title(self.entries.len() + 1);
        self.entries.push(OutlineEntry::new(id, title));
        self.debug_check();
        Ok(id)
    }

    /// Remove a unit by id, keeping the relative order of the rest
    pub fn remove_unit(&mut self, id: u32) -> Result<OutlineEntry, StructureError> {
        if self.entries.len() <= MIN_UNITS {
            return Err(StructureError::MinimumUnitsViolation { kind: self.kind });
        }
        let index = self
            .position_of(id)
            .ok_or(StructureError::UnitNotFound(id))?;

        let removed = self.entries.remove(index);
        if self.policy() == IdentityPolicy::Positional {
            self.renumber();
        }
        self.debug_check();
        Ok(removed)
    }

    /// Swap the unit at `index` with its predecessor. Returns whether
    /// anything moved.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.entries.len() {
            return false;
        }
        self.swap_positions(index - 1, index);
        true
    }

    /// Swap the unit at `index` with its successor. Returns whether
    /// anything moved.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.entries.len() {
            return false;
        }
        self.swap_positions(index, index + 1);
        true
    }

    /// Replace a unit's title in place
    pub fn rename_unit(&mut self, id: u32, title: impl Into<String>) -> Result<(), StructureError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StructureError::UnitNotFound(id))?;
        entry.title = title.into();
        Ok(())
    }

    /// Resize a slide deck to `count` slides, clamped to 1..=20.
    ///
    /// Existing positions keep their titles; new positions get default
    /// titles. Returns the resulting count.
    pub fn set_unit_count(&mut self, count: i64) -> Result<usize, StructureError> {
        if self.policy() != IdentityPolicy::Positional {
            return Err(StructureError::UnsupportedOperation {
                operation: "set unit count",
                kind: self.kind,
            });
        }

        let target = count.clamp(MIN_UNITS as i64, MAX_SLIDES as i64) as usize;
        let resized: Vec<OutlineEntry> = (1..=target as u32)
            .map(|id| {
                self.get(id)
                    .cloned()
                    .unwrap_or_else(|| OutlineEntry::new(id, self.kind.default_title(id as usize)))
            })
            .collect();

        self.entries = resized;
        self.debug_check();
        Ok(target)
    }

    /// Replace the structure with parsed outline entries.
    ///
    /// An empty outline leaves the structure untouched and returns false.
    /// Ids are reissued 1..n; slide decks are capped at the maximum.
    pub fn apply_outline(&mut self, entries: Vec<OutlineEntry>) -> bool {
        if entries.is_empty() {
            return false;
        }

        let limit = match self.policy() {
            IdentityPolicy::AppendOnly => entries.len(),
            IdentityPolicy::Positional => entries.len().min(MAX_SLIDES),
        };
        if limit < entries.len() {
            log::warn!(
                "[outline] Outline has {} slides, keeping the first {}",
                entries.len(),
                limit
            );
        }

        self.entries = entries
            .into_iter()
            .take(limit)
            .zip(1u32..)
            .map(|(entry, id)| OutlineEntry::new(id, entry.title))
            .collect();
        self.debug_check();
        true
    }

    /// Check count, id uniqueness and, for positional ids, id == position
    pub fn validate(&self) -> Result<(), StructureError> {
        if self.entries.len() < MIN_UNITS {
            return Err(StructureError::MinimumUnitsViolation { kind: self.kind });
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id) {
                return Err(StructureError::InvariantViolation(format!(
                    "duplicate id {}",
                    entry.id
                )));
            }
        }

        if self.policy() == IdentityPolicy::Positional {
            if self.entries.len() > MAX_SLIDES {
                return Err(StructureError::MaximumUnitsReached { max: MAX_SLIDES });
            }
            for (position, entry) in (1u32..).zip(&self.entries) {
                if entry.id != position {
                    return Err(StructureError::InvariantViolation(format!(
                        "slide at position {} has id {}",
                        position, entry.id
                    )));
                }
            }
        }

        Ok(())
    }

    fn swap_positions(&mut self, a: usize, b: usize) {
        match self.policy() {
            IdentityPolicy::AppendOnly => self.entries.swap(a, b),
            IdentityPolicy::Positional => {
                // Ids stay with positions; only the titles trade places
                let title_a = std::mem::take(&mut self.entries[a].title);
                let title_b = std::mem::replace(&mut self.entries[b].title, title_a);
                self.entries[a].title = title_b;
            }
        }
        self.debug_check();
    }

    fn renumber(&mut self) {
        for (entry, id) in self.entries.iter_mut().zip(1u32..) {
            entry.id = id;
        }
    }

    fn debug_check(&self) {
        let result = self.validate();
        debug_assert!(result.is_ok(), "{:?}", result);
    }
}
