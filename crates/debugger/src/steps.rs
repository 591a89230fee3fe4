//! Step bookkeeping: available steps, selection, and the composite stack.

use std::collections::HashMap;

use runtime_protocol::types::{Location, Step};

use crate::error::DebuggerError;

/// Tracks the runtime-reported steps and the stack of entered composites.
///
/// After every update the first reported step is selected by default;
/// [`StepManager::select`] overrides that until the next update. The stack
/// mirrors a call stack: a composite is pushed when entered and popped when
/// the runtime reports it completed.
#[derive(Debug, Default)]
pub struct StepManager {
    available: Vec<Step>,
    selected: Option<usize>,
    stack: Vec<Step>,
    /// Locations fetched for currently-available steps, by step id.
    available_locations: HashMap<String, Option<Location>>,
    /// Locations of the steps on the stack, by step id.
    stack_locations: HashMap<String, Option<Location>>,
}

impl StepManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the outcome of a runtime step operation.
    ///
    /// An empty `completed` means a composite was just entered: the selected
    /// step moves onto the stack, taking its cached location along.
    /// Otherwise the stack is unwound for as long as its top appears among
    /// the completed ids. The new step list then replaces the old one and
    /// selection resets to the first step.
    pub fn update(&mut self, available: Vec<Step>, completed: &[String]) {
        if completed.is_empty() {
            if let Some(selected) = self.selected.map(|i| self.available[i].clone()) {
                let location = self
                    .available_locations
                    .get(&selected.id)
                    .copied()
                    .flatten();
                self.stack_locations.insert(selected.id.clone(), location);
                tracing::trace!(step = %selected.id, "pushing composite step");
                self.stack.push(selected);
            }
        } else {
            let mut completed: Vec<&String> = completed.iter().collect();
            while let Some(top) = self.stack.last() {
                let Some(position) = completed.iter().position(|c| **c == top.id) else {
                    break;
                };
                completed.remove(position);
                self.available_locations.remove(&top.id);
                self.stack_locations.remove(&top.id);
                let popped = self.stack.pop();
                tracing::trace!(step = ?popped.map(|s| s.id), "popped completed composite");
            }
        }

        self.selected = if available.is_empty() { None } else { Some(0) };
        self.available = available;
        self.available_locations.clear();
    }

    /// Override the default selection.
    ///
    /// Returns whether the selection actually changed. Unknown ids are
    /// rejected.
    pub fn select(&mut self, step_id: &str) -> Result<bool, DebuggerError> {
        let position = self
            .available
            .iter()
            .position(|s| s.id == step_id)
            .ok_or_else(|| DebuggerError::UnknownStep(step_id.to_string()))?;

        let changed = self.selected != Some(position);
        self.selected = Some(position);
        Ok(changed)
    }

    pub fn selected(&self) -> Option<&Step> {
        self.selected.map(|i| &self.available[i])
    }

    pub fn available(&self) -> &[Step] {
        &self.available
    }

    pub fn stack(&self) -> &[Step] {
        &self.stack
    }

    /// Cache the location of a currently-available step.
    pub fn cache_available_location(&mut self, step_id: &str, location: Option<Location>) {
        self.available_locations
            .insert(step_id.to_string(), location);
    }

    /// The cached location of a step on the stack.
    pub fn stack_location(&self, step_id: &str) -> Option<Location> {
        self.stack_locations.get(step_id).copied().flatten()
    }
}
