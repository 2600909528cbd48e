use std::fmt::Debug;

use crate::{
    dependency_graph::DependencyGraph,
    lifecycle::{Lifecycle, LifecycleState},
    registry::Registry,
    types::ComponentId,
};

/// A linked and initialized graph of components
///
/// Stays running until [Linked::shutdown_all] is called. Dropping it does not run any hooks.
pub struct Linked {
    registry: Registry,
    graph: DependencyGraph,
    lifecycle: Lifecycle,
}
impl Debug for Linked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Linked");
        for (id, state) in self.states() {
            map.field(&id.to_string(), &state);
        }
        map.finish()
    }
}

impl Linked {
    pub(crate) fn new(registry: Registry, graph: DependencyGraph, lifecycle: Lifecycle) -> Self {
        Self {
            registry,
            graph,
            lifecycle,
        }
    }

    /// Shuts down every initialized component, in exact reverse of the initialization order
    ///
    /// Calling it again does nothing.
    pub fn shutdown_all(&mut self) {
        if !self.lifecycle.has_running() {
            tracing::debug!("Nothing left to shut down");
            return;
        }

        tracing::debug!("Shutting down {} instances", self.lifecycle.initialized().len());
        self.lifecycle.shutdown_all(&self.registry);
        tracing::info!("All instances shut down");
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// State of the first instance registered under `name`
    pub fn state_of(&self, name: &str) -> Option<LifecycleState> {
        self.registry
            .named(name)
            .next()
            .map(|entry| self.lifecycle.state(entry.id.index))
    }

    /// All instances with their state, in registration order
    pub fn states(&self) -> impl Iterator<Item = (&ComponentId, LifecycleState)> {
        self.registry
            .ids()
            .zip(self.lifecycle.states().iter().copied())
    }

    /// The order in which instances reached [LifecycleState::Initialized]
    pub fn initialization_order(&self) -> Vec<&ComponentId> {
        self.lifecycle
            .initialized()
            .iter()
            .map(|&index| &self.registry.entry(index).id)
            .collect()
    }
}

impl Drop for Linked {
    fn drop(&mut self) {
        if self.lifecycle.has_running() {
            tracing::warn!("Linked graph dropped without shutdown, shutdown hooks will not run");
        }
    }
}
