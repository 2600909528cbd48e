use thiserror::Error;

use crate::{
    cancel::CancelReason,
    dependency_graph::DependencyGraphError,
    tags::TagError,
    types::{ComponentId, DynError, TypeInfo},
};

/// Errors while linking and initializing the registered components
///
/// Everything except [LinkError::InitializationFailed] is a configuration error,
/// reported before any lifecycle hook runs.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The raw tag of a slot could not be parsed
    #[error("Slot '{field}' of {component} has a malformed declaration: {source}")]
    SlotDeclaration {
        component: ComponentId,
        field: &'static str,
        #[source]
        source: TagError,
    },
    /// A required slot has no provider
    #[error("Slot '{field}' of {component} requires '{wanted}'{}, but nothing registered provides it", by_name(.requested))]
    MissingDependency {
        component: ComponentId,
        field: &'static str,
        wanted: TypeInfo,
        requested: Option<String>,
    },
    /// More than one provider fits a slot
    #[error("Ambiguous component assignment for the slot '{field}' of {component} with type '{wanted}'{}: {}", by_name(.requested), list(.candidates))]
    AmbiguousBinding {
        component: ComponentId,
        field: &'static str,
        wanted: TypeInfo,
        requested: Option<String>,
        candidates: Vec<ComponentId>,
    },
    /// The default literal of an optional slot does not convert to the slot's type
    #[error("Could not assign the default value \"{literal}\" to the slot '{field}' of {component}: {source}")]
    DefaultConversion {
        component: ComponentId,
        field: &'static str,
        literal: String,
        #[source]
        source: DefaultError,
    },
    /// The bindings form a cycle
    #[error(transparent)]
    DependencyCycle(#[from] DependencyGraphError),
    /// An init hook failed or the initialization was cancelled
    #[error("Initialization of {component} failed: {cause}")]
    InitializationFailed {
        component: ComponentId,
        cause: InitFailure,
    },
}

/// Why an init hook did not complete
#[derive(Error, Debug)]
pub enum InitFailure {
    /// The hook returned an error
    #[error("{0}")]
    Hook(DynError),
    /// The shared token fired before or during the hook
    #[error(transparent)]
    Cancelled(#[from] CancelReason),
}

/// Errors when converting a default literal into a slot value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefaultError {
    #[error("slots of type '{slot_type}' do not accept default literals")]
    Unsupported { slot_type: &'static str },
    #[error("not a valid '{slot_type}': {reason}")]
    Parse {
        slot_type: &'static str,
        reason: String,
    },
}

fn by_name(requested: &Option<String>) -> String {
    match requested {
        Some(name) => format!(" named '{}'", name),
        None => String::new(),
    }
}

fn list(candidates: &[ComponentId]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
