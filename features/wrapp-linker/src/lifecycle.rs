use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::registry::Registry;

/// Lifecycle state of one registered instance
///
/// States only move forward. An instance whose init hook fails moves from
/// [LifecycleState::Initializing] straight to [LifecycleState::Shutdown].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Registered,
    Injected,
    PostConstructed,
    Initializing,
    Initialized,
    Shutdown,
}

/// Per instance states, plus the order in which instances reached [LifecycleState::Initialized]
#[derive(Debug)]
pub(crate) struct Lifecycle {
    states: Vec<LifecycleState>,
    initialized: Vec<usize>,
}
impl Lifecycle {
    pub fn new(len: usize) -> Self {
        Lifecycle {
            states: vec![LifecycleState::Registered; len],
            initialized: Vec::with_capacity(len),
        }
    }

    pub fn state(&self, index: usize) -> LifecycleState {
        self.states[index]
    }

    pub fn states(&self) -> &[LifecycleState] {
        &self.states
    }

    /// Realized initialization order
    pub fn initialized(&self) -> &[usize] {
        &self.initialized
    }

    /// Moves every instance to `state`
    pub fn advance_all(&mut self, state: LifecycleState) {
        self.states.fill(state);
    }

    pub fn set(&mut self, index: usize, state: LifecycleState) {
        debug_assert!(
            self.states[index] <= state,
            "lifecycle states only move forward"
        );
        self.states[index] = state;
        if state == LifecycleState::Initialized {
            self.initialized.push(index);
        }
    }

    pub fn has_running(&self) -> bool {
        self.initialized
            .iter()
            .any(|&index| self.states[index] == LifecycleState::Initialized)
    }

    /// Runs the shutdown hooks of every initialized instance, in reverse initialization order
    ///
    /// Instances that already shut down are skipped, so calling this again is a no-op.
    /// A panicking hook is logged and the walk continues.
    pub fn shutdown_all(&mut self, registry: &Registry) {
        for &index in self.initialized.iter().rev() {
            if self.states[index] != LifecycleState::Initialized {
                continue;
            }
            self.states[index] = LifecycleState::Shutdown;

            let entry = registry.entry(index);
            let Some(hook) = entry
                .component
                .as_ref()
                .and_then(|component| component.as_shutdown())
            else {
                continue;
            };

            tracing::debug!("Shutting down {}", entry.id);
            if catch_unwind(AssertUnwindSafe(|| hook.shutdown())).is_err() {
                tracing::error!("Shutdown hook of {} panicked", entry.id);
            }
        }
    }
}
