//! Chart selection state machine.
//!
//! Two independent single-value slots, one per selectable chart axis. A click
//! on the value that is already selected clears the slot; a click anywhere
//! else replaces it. The slot projects into the same filter shape as the
//! dropdowns, so the pipeline only ever reads [`ActiveFilterState`].

use shared::{ActiveFilterState, ChartAxis, FilterValue, SelectionState};
use tracing::debug;

/// Outcome of a chart click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionTransition {
    /// The axis now holds this value
    Selected(String),
    /// The clicked value was already selected and has been cleared
    Cleared,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStateMachine {
    state: SelectionState,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self, axis: ChartAxis) -> Option<&str> {
        self.state.slot(axis)
    }

    /// Apply a click at `index` of a chart showing `labels`.
    ///
    /// Returns `None` when the index does not address a label; the state is
    /// left untouched in that case.
    pub fn click(
        &mut self,
        axis: ChartAxis,
        index: usize,
        labels: &[String],
    ) -> Option<SelectionTransition> {
        let value = labels.get(index)?;
        let transition = if self.selected(axis) == Some(value.as_str()) {
            self.set(axis, None);
            SelectionTransition::Cleared
        } else {
            self.set(axis, Some(value.clone()));
            SelectionTransition::Selected(value.clone())
        };
        debug!("{} axis click at {} -> {:?}", axis, index, transition);
        Some(transition)
    }

    /// Overwrite one slot. Dropdown changes go through here so the most
    /// recent writer on an axis wins.
    pub fn set(&mut self, axis: ChartAxis, value: Option<String>) {
        match axis {
            ChartAxis::Month => self.state.selected_month = value,
            ChartAxis::Category => self.state.selected_category = value,
        }
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::default();
    }

    /// Copy one axis slot into the matching filter field (`None` becomes "all")
    pub fn project_into(&self, axis: ChartAxis, filters: &mut ActiveFilterState) {
        let value = FilterValue::from_selection(self.selected(axis));
        match axis {
            ChartAxis::Month => filters.month = value,
            ChartAxis::Category => filters.category = value,
        }
    }
}
