//! Recognized-item list editing with undo.

use thiserror::Error;

use scanventory_recognition::RecognizedItem;

/// An edit attempted against an index the list does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("index {index} is out of bounds (list has {len} items)")]
pub struct SessionError {
    pub index: usize,
    pub len: usize,
}

/// One reversible mutation, recorded before the mutation takes effect.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// An item was replaced; `previous` is the value it had.
    Updated { index: usize, previous: RecognizedItem },
    /// An item was removed from `index`.
    Removed { index: usize, item: RecognizedItem },
    /// The selection changed away from `previous`.
    Selected { previous: Option<usize> },
}

/// What `undo` reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoneAction {
    Update { index: usize },
    Remove { index: usize },
    Select,
}

/// Follow-up the caller should perform after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Index the selection should advance to, when auto-advance applies.
    /// `None` for the last item or when auto-advance is off.
    pub advance_to: Option<usize>,
}

/// The list of recognized items currently under review.
///
/// Every mutation is bounds-checked and recorded, so any sequence of edits
/// can be unwound step by step. The session never panics on bad indices; it
/// returns [`SessionError`] instead.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    items: Vec<RecognizedItem>,
    selected: Option<usize>,
    history: Vec<HistoryEntry>,
    auto_advance: bool,
}

impl ScanSession {
    /// Start a session over freshly recognized items. Auto-advance is on by
    /// default; shelf review flows turn it off.
    pub fn new(items: Vec<RecognizedItem>) -> Self {
        Self {
            items,
            selected: None,
            history: Vec::new(),
            auto_advance: true,
        }
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
    }

    pub fn items(&self) -> &[RecognizedItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&RecognizedItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&RecognizedItem> {
        self.items.get(self.selected?)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Replace the item at `index`, recording the previous value.
    pub fn update(
        &mut self,
        index: usize,
        item: RecognizedItem,
    ) -> Result<UpdateOutcome, SessionError> {
        self.check_bounds(index)?;
        let previous = std::mem::replace(&mut self.items[index], item);
        self.history.push(HistoryEntry::Updated { index, previous });

        let advance_to = if self.auto_advance && index + 1 < self.items.len() {
            Some(index + 1)
        } else {
            None
        };
        Ok(UpdateOutcome { advance_to })
    }

    /// Remove the item at `index`, recording it for undo.
    ///
    /// The selection is cleared if it pointed at the removed index and
    /// shifted down by one if it pointed past it.
    pub fn remove(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_bounds(index)?;
        let item = self.items.remove(index);
        match self.selected {
            Some(sel) if sel == index => self.selected = None,
            Some(sel) if sel > index => self.selected = Some(sel - 1),
            _ => {}
        }
        self.history.push(HistoryEntry::Removed { index, item });
        Ok(())
    }

    /// Move the selection, recording where it was.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_bounds(index)?;
        self.history.push(HistoryEntry::Selected { previous: self.selected });
        self.selected = Some(index);
        Ok(())
    }

    /// Drop the selection, recording where it was.
    pub fn clear_selection(&mut self) {
        self.history.push(HistoryEntry::Selected { previous: self.selected });
        self.selected = None;
    }

    /// Revert the most recent mutation. No-op on empty history.
    ///
    /// History is a strict LIFO stack and every mutation goes through this
    /// session, so recorded indices are always valid at the moment their
    /// entry is popped.
    pub fn undo(&mut self) -> Option<UndoneAction> {
        let undone = match self.history.pop()? {
            HistoryEntry::Updated { index, previous } => {
                self.items[index] = previous;
                UndoneAction::Update { index }
            }
            HistoryEntry::Removed { index, item } => {
                self.items.insert(index, item);
                // Keep the selection pointing at the same item it was on.
                if let Some(sel) = self.selected {
                    if sel >= index {
                        self.selected = Some(sel + 1);
                    }
                }
                UndoneAction::Remove { index }
            }
            HistoryEntry::Selected { previous } => {
                self.selected = previous;
                UndoneAction::Select
            }
        };
        tracing::debug!(?undone, remaining = self.history.len(), "undid session action");
        Some(undone)
    }

    /// Advance the selection from `index` to `index + 1`, if the selection
    /// still sits on `index` and a next item exists. Returns whether it moved.
    ///
    /// This is the delayed auto-advance landing; it is cosmetic and is not
    /// recorded in history.
    pub fn advance_selection_from(&mut self, index: usize) -> bool {
        if self.selected == Some(index) && index + 1 < self.items.len() {
            self.selected = Some(index + 1);
            true
        } else {
            false
        }
    }

    /// Throw away items, selection and history and start over.
    pub fn reset(&mut self, items: Vec<RecognizedItem>) {
        tracing::debug!(items = items.len(), "scan session reset");
        self.items = items;
        self.selected = None;
        self.history.clear();
    }

    fn check_bounds(&self, index: usize) -> Result<(), SessionError> {
        if index >= self.items.len() {
            return Err(SessionError { index, len: self.items.len() });
        }
        Ok(())
    }
}
