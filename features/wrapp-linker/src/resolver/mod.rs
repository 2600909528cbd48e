//! Binding of slots to providers.
//!
//! Every slot of every component is resolved against the registry:
//! 1. candidates are all registrations injectable as the slot's type
//! 2. a requested name narrows the candidates to registrations under that name
//! 3. exactly one candidate binds, more than one is ambiguous, none falls back to the default
//!    of an optional slot or fails a required one
//!
//! There is no implicit tie-break, the first ambiguity fails the whole resolution.

use std::any::type_name;

use crate::{
    errors::{DefaultError, LinkError},
    registry::{Entry, Registry},
    slot::{BoundValue, Slot, ViewValue},
    tags::TagParser,
    types::TypeInfo,
};

pub mod arc;
pub mod value;

/// A type which can be stored in a slot
pub trait SlotValue: Sized + Send + Sync + 'static {
    /// The type a provider has to be injectable as
    fn provided_by() -> TypeInfo;

    /// Takes the value out of a provider view, which holds an `Arc` of [SlotValue::provided_by]
    fn from_view(view: ViewValue) -> Option<Self>;

    /// Converts the default literal of an optional slot
    fn from_literal(literal: &str) -> Result<Self, DefaultError> {
        let _ = literal;
        Err(DefaultError::Unsupported {
            slot_type: type_name::<Self>(),
        })
    }
}

/// Where the value of a slot comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSource {
    /// Index of the providing registration
    Provider(usize),
    /// Converted default literal
    Default(String),
    /// Optional slot left empty
    Unbound,
}

/// A resolved slot, holding the value until it is written
pub(crate) struct Binding {
    pub dependent: usize,
    pub slot: usize,
    pub field: &'static str,
    pub source: BindingSource,
    value: Option<BoundValue>,
}
impl Binding {
    pub fn provider(&self) -> Option<usize> {
        match self.source {
            BindingSource::Provider(index) => Some(index),
            _ => None,
        }
    }
}

/// Resolves all slots against a registry
pub(crate) struct Resolver<'a> {
    registry: &'a Registry,
    parser: &'a dyn TagParser,
}
impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry, parser: &'a dyn TagParser) -> Self {
        Resolver { registry, parser }
    }

    /// Resolves every slot of every component
    ///
    /// Nothing is written yet, see [assign]
    pub fn resolve(&self) -> Result<Vec<Binding>, LinkError> {
        let mut bindings = Vec::new();
        for entry in self.registry.entries() {
            let Some(component) = &entry.component else {
                continue;
            };

            for (index, slot) in component.slots().iter().enumerate() {
                bindings.push(self.resolve_slot(entry, index, slot)?);
            }
        }

        tracing::debug!("Resolved {} slots", bindings.len());
        Ok(bindings)
    }

    fn resolve_slot(
        &self,
        dependent: &Entry,
        index: usize,
        slot: &Slot<'_>,
    ) -> Result<Binding, LinkError> {
        let tag = self
            .parser
            .parse(slot.tag)
            .map_err(|source| LinkError::SlotDeclaration {
                component: dependent.id.clone(),
                field: slot.field,
                source,
            })?;

        let wanted = slot.target.wanted();
        let requested = (!tag.name.is_empty()).then(|| tag.name.clone());
        let missing = || LinkError::MissingDependency {
            component: dependent.id.clone(),
            field: slot.field,
            wanted,
            requested: requested.clone(),
        };

        let candidates: Vec<&Entry> = self
            .registry
            .compatible(wanted)
            .filter(|candidate| {
                requested
                    .as_deref()
                    .map_or(true, |name| candidate.answers_to(name))
            })
            .collect();

        let (source, value) = match candidates.as_slice() {
            [provider] => {
                let value = provider
                    .view(wanted)
                    .and_then(|view| slot.target.from_view(view.value()))
                    .ok_or_else(|| {
                        tracing::error!(
                            "{} is registered as '{}' but did not hand out a '{}'",
                            provider.id,
                            wanted,
                            slot.target.slot_type()
                        );
                        missing()
                    })?;

                tracing::debug!(
                    "Bound slot '{}' of {} to {}",
                    slot.field,
                    dependent.id,
                    provider.id
                );
                (BindingSource::Provider(provider.id.index), Some(value))
            }
            [] if tag.optional => match tag.default {
                Some(literal) => {
                    let value = slot.target.from_literal(&literal).map_err(|source| {
                        LinkError::DefaultConversion {
                            component: dependent.id.clone(),
                            field: slot.field,
                            literal: literal.clone(),
                            source,
                        }
                    })?;

                    tracing::debug!(
                        "Bound slot '{}' of {} to default \"{}\"",
                        slot.field,
                        dependent.id,
                        literal
                    );
                    (BindingSource::Default(literal), Some(value))
                }
                None => {
                    tracing::debug!(
                        "Optional slot '{}' of {} stays unbound",
                        slot.field,
                        dependent.id
                    );
                    (BindingSource::Unbound, None)
                }
            },
            [] => return Err(missing()),
            _ => {
                return Err(LinkError::AmbiguousBinding {
                    component: dependent.id.clone(),
                    field: slot.field,
                    wanted,
                    requested,
                    candidates: candidates.iter().map(|entry| entry.id.clone()).collect(),
                })
            }
        };

        Ok(Binding {
            dependent: dependent.id.index,
            slot: index,
            field: slot.field,
            source,
            value,
        })
    }
}

/// Writes the resolved values into the slots
pub(crate) fn assign(registry: &Registry, bindings: Vec<Binding>) {
    for binding in bindings {
        let Some(value) = binding.value else {
            continue;
        };
        let entry = registry.entry(binding.dependent);
        let Some(component) = &entry.component else {
            continue;
        };

        let slots = component.slots();
        let assigned = slots
            .get(binding.slot)
            .is_some_and(|slot| slot.target.assign(value));
        if !assigned {
            tracing::warn!(
                "Slot '{}' of {} was already bound, keeping the previous value",
                binding.field,
                entry.id
            );
        }
    }
}
