//! Attachment slot bookkeeping for the compose form

use crate::error::{Result, WidgetError};
use crate::models::FileHandle;

/// Ordered file slots shown in the compose form
///
/// Invariants: there is always at least one slot, and the last slot is always
/// empty so the form keeps a visible entry point. Every other slot holds a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSlots {
    slots: Vec<Option<FileHandle>>,
}

impl Default for AttachmentSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentSlots {
    pub fn new() -> Self {
        Self { slots: vec![None] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the list holds no slots at all
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Option<FileHandle>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&FileHandle> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Files in slot order, skipping empty slots
    pub fn files(&self) -> impl Iterator<Item = &FileHandle> {
        self.slots.iter().flatten()
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Put a file into a slot.
    ///
    /// Filling the trailing empty slot appends a fresh empty one after it;
    /// filling an occupied slot replaces its file.
    pub fn set(&mut self, index: usize, file: FileHandle) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(WidgetError::NoSuchSlot { index })?;
        *slot = Some(file);
        self.ensure_trailing_empty();
        Ok(())
    }

    /// Fill the trailing empty slot, returning its index
    pub fn push(&mut self, file: FileHandle) -> usize {
        let index = self.slots.len() - 1;
        self.slots[index] = Some(file);
        self.ensure_trailing_empty();
        index
    }

    /// Handle a slot's remove action (also used when its picker is cleared).
    ///
    /// An occupied slot is removed, unless it is the only slot, in which case
    /// it is cleared in place. Removing an empty slot does nothing.
    pub fn remove(&mut self, index: usize) -> Result<Option<FileHandle>> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(WidgetError::NoSuchSlot { index })?;
        if slot.is_none() {
            return Ok(None);
        }

        let removed = if self.slots.len() == 1 {
            self.slots[0].take()
        } else {
            self.slots.remove(index)
        };
        self.ensure_trailing_empty();
        Ok(removed)
    }

    fn ensure_trailing_empty(&mut self) {
        if self.slots.last().is_none_or(Option::is_some) {
            self.slots.push(None);
        }
    }
}
