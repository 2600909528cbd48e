use std::fmt::Debug;

use thiserror::Error;

use crate::{
    registry::Registry,
    resolver::{Binding, BindingSource},
    types::ComponentId,
};

/// Graph of all registered instances, with an edge from every dependent to each of its providers
///
/// Drives cycle detection and the initialization order. It also records how every slot was
/// bound.
pub struct DependencyGraph {
    nodes: Vec<DependencyGraphEntry>,
}

struct DependencyGraphEntry {
    id: ComponentId,
    /// Every slot of the node and where its value came from
    slots: Vec<(&'static str, BindingSource)>,
    /// Indices of the providers, without duplicates
    dependencies: Vec<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl DependencyGraph {
    pub(crate) fn new(registry: &Registry, bindings: &[Binding]) -> Self {
        let mut graph = Self {
            nodes: registry
                .ids()
                .map(|id| DependencyGraphEntry {
                    id: id.clone(),
                    slots: Vec::new(),
                    dependencies: Vec::new(),
                })
                .collect(),
        };

        for binding in bindings {
            let node = &mut graph.nodes[binding.dependent];
            node.slots.push((binding.field, binding.source.clone()));

            if let Some(provider) = binding.provider() {
                if !node.dependencies.contains(&provider) {
                    node.dependencies.push(provider);
                }
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in registration order
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.nodes.iter().map(|node| &node.id)
    }

    /// The providers the given node depends on
    pub fn dependencies_of(&self, id: &ComponentId) -> impl Iterator<Item = &ComponentId> {
        self.nodes
            .get(id.index)
            .into_iter()
            .flat_map(|node| node.dependencies.iter())
            .map(|&provider| &self.nodes[provider].id)
    }

    /// The slots of the given node and how each was bound
    pub fn slots_of(&self, id: &ComponentId) -> &[(&'static str, BindingSource)] {
        self.nodes
            .get(id.index)
            .map(|node| node.slots.as_slice())
            .unwrap_or_default()
    }

    /// Validate the graph
    pub fn check(&self) -> Result<(), DependencyGraphError> {
        self.walk().map(|_| ())
    }

    /// Orders the nodes so that every provider comes before its dependents
    pub fn topological_order(&self) -> Result<Vec<&ComponentId>, DependencyGraphError> {
        Ok(self
            .walk()?
            .into_iter()
            .map(|index| &self.nodes[index].id)
            .collect())
    }

    /// Depth first walk in registration order, returning the nodes in post order
    ///
    /// Reaching a node that is still on the stack closes a cycle.
    pub(crate) fn walk(&self) -> Result<Vec<usize>, DependencyGraphError> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }

            // (node, next dependency to visit) - the stack is also the current dependency chain
            marks[root] = Mark::OnStack;
            let mut stack = vec![(root, 0)];

            while let Some((node, next)) = stack.last_mut() {
                let node = *node;
                let Some(&dependency) = self.nodes[node].dependencies.get(*next) else {
                    marks[node] = Mark::Done;
                    order.push(node);
                    stack.pop();
                    continue;
                };
                *next += 1;

                match marks[dependency] {
                    Mark::Unvisited => {
                        marks[dependency] = Mark::OnStack;
                        stack.push((dependency, 0));
                    }
                    Mark::OnStack => return Err(self.cycle(&stack, dependency)),
                    Mark::Done => {}
                }
            }
        }

        Ok(order)
    }

    fn cycle(&self, stack: &[(usize, usize)], closing: usize) -> DependencyGraphError {
        let start = stack
            .iter()
            .position(|&(node, _)| node == closing)
            .unwrap_or_default();

        let mut chain: Vec<ComponentId> = stack[start..]
            .iter()
            .map(|&(node, _)| self.nodes[node].id.clone())
            .collect();
        chain.push(self.nodes[closing].id.clone());

        let to = chain[chain.len() - 2].clone();
        DependencyGraphError::CircularDependency {
            from: self.nodes[closing].id.clone(),
            to,
            chain,
        }
    }
}

impl Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for node in &self.nodes {
            let dependencies: Vec<String> = node
                .dependencies
                .iter()
                .map(|&provider| self.nodes[provider].id.to_string())
                .collect();
            map.entry(&node.id.to_string(), &dependencies);
        }
        map.finish()
    }
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    /// `from` depends on `to` through the chain, and `to` depends on `from`
    #[error("Found a loop in the object graph dependencies between {from} and {to}: {}", path(.chain))]
    CircularDependency {
        from: ComponentId,
        to: ComponentId,
        chain: Vec<ComponentId>,
    },
}

fn path(chain: &[ComponentId]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
