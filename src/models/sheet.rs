//! Sheet list and selection state.
//!
//! `SheetSelection` is the single source of truth for which sheets are
//! selected: it keeps the backend-ordered name list plus a set of selected
//! names, and computes the per-entry checked flag on read. There is no
//! separate checked flag to keep consistent.

use std::collections::HashSet;

use serde::Serialize;

/// One discovered sheet as presented to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetEntry {
    pub name: String,
    pub checked: bool,
}

/// Ordered sheet list with the set of currently selected names.
#[derive(Debug, Clone, Default)]
pub struct SheetSelection {
    /// Sheet names in the order returned by the backend. This order is
    /// preserved through every selection operation.
    names: Vec<String>,
    selected: HashSet<String>,
}

impl SheetSelection {
    /// Build from the backend's sheet list with every sheet selected.
    pub fn from_names(names: Vec<String>) -> Self {
        let selected = names.iter().cloned().collect();
        Self { names, selected }
    }

    pub fn select_all(&mut self) {
        self.selected = self.names.iter().cloned().collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Flip membership of `name` in the selection. Toggling a name that was
    /// never discovered is a caller bug; it is logged and ignored so state
    /// cannot be corrupted.
    pub fn toggle(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            log::warn!("toggle for unknown sheet name ignored: {}", name);
            return;
        }
        if !self.selected.remove(name) {
            self.selected.insert(name.to_string());
        }
    }

    /// Sheet entries in backend order with the checked flag computed from the
    /// selected set.
    pub fn entries(&self) -> Vec<SheetEntry> {
        self.names
            .iter()
            .map(|name| SheetEntry {
                name: name.clone(),
                checked: self.selected.contains(name),
            })
            .collect()
    }

    /// Selected sheet names in backend order, not selection order.
    pub fn selected_in_order(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| self.selected.contains(*n))
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn total(&self) -> usize {
        self.names.len()
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.selected.clear();
    }
}
