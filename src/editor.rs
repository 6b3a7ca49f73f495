//! Per-label editor state and well toggles
//!
//! The editor window collects a [`WellToggle`] for every clicked well while it
//! draws, and the app applies them once the frame's UI pass is over.

use tracing::warn;

use crate::error::Result;
use crate::plate::{Label, PlateStore, ToggleOutcome, Well};

/// State of one label's editor window.
pub struct EditorState {
    pub label: Label,
    /// Value written into the next empty well that is clicked
    pub pending: String,
    pub open: bool,
}

impl EditorState {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            pending: String::new(),
            open: false,
        }
    }

    pub fn toggle(&self, well: Well) -> WellToggle {
        WellToggle {
            label: self.label,
            well,
        }
    }
}

/// A click on one well of one label's plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellToggle {
    pub label: Label,
    pub well: Well,
}

impl WellToggle {
    pub fn apply(&self, store: &mut PlateStore, pending: &str) -> Result<ToggleOutcome> {
        store.toggle(self.label, self.well, pending)
    }
}

/// Apply a frame's worth of toggles in click order. A failed save does not
/// stop the rest; the first error is returned once all are applied.
pub fn apply_all(
    toggles: &[WellToggle],
    editors: &[EditorState],
    store: &mut PlateStore,
) -> Result<usize> {
    let mut first_error = None;
    for toggle in toggles {
        let pending = editors
            .iter()
            .find(|e| e.label == toggle.label)
            .map(|e| e.pending.as_str())
            .unwrap_or_default();
        if let Err(e) = toggle.apply(store, pending) {
            warn!(label = %toggle.label, well = %toggle.well, "toggle not saved: {e}");
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(toggles.len()),
    }
}
