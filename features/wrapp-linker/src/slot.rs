use std::{
    any::{type_name, Any},
    fmt::Debug,
    ops::Deref,
    sync::OnceLock,
};

use crate::{errors::DefaultError, resolver::SlotValue, types::TypeInfo};

/// Value produced for a slot, ready to be written into it
pub type BoundValue = Box<dyn Any + Send>;

/// Value handed out by a provider for one of the types it can be injected as
pub type ViewValue = Box<dyn Any + Send>;

/// Storage of an injectable slot on a component
///
/// The linker writes the slot once during linking, afterwards it is read only.
/// An optional slot without provider and default stays empty.
///
/// ### Panics
///
/// Dereferencing panics if the slot was never bound, use [Inject::get] for optional slots.
pub struct Inject<T>(OnceLock<T>);
impl<T> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> Inject<T> {
    pub const fn new() -> Self {
        Inject(OnceLock::new())
    }

    /// Returns the bound value, `None` while unbound
    pub fn get(&self) -> Option<&T> {
        self.0.get()
    }

    pub fn is_bound(&self) -> bool {
        self.0.get().is_some()
    }
}
impl<T> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get().unwrap_or_else(|| {
            panic!(
                "slot of type '{}' accessed before it was bound",
                type_name::<T>()
            )
        })
    }
}
impl<T: Debug> Debug for Inject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Inject").field(value).finish(),
            None => f.debug_tuple("Inject").field(&"unbound").finish(),
        }
    }
}

/// Object safe access to a slot's storage, used by the resolver
pub trait SlotTarget: Send + Sync {
    /// The type a provider must be injectable as
    fn wanted(&self) -> TypeInfo;

    /// Type name of the slot value itself
    fn slot_type(&self) -> &'static str;

    /// Takes the slot value out of a provider view
    fn from_view(&self, view: ViewValue) -> Option<BoundValue>;

    /// Converts a default literal into a slot value
    fn from_literal(&self, literal: &str) -> Result<BoundValue, DefaultError>;

    /// Writes the value
    ///
    /// Returns false if the slot was already bound or the value has the wrong type
    fn assign(&self, value: BoundValue) -> bool;
}
impl<T: SlotValue> SlotTarget for Inject<T> {
    fn wanted(&self) -> TypeInfo {
        T::provided_by()
    }

    fn slot_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn from_view(&self, view: ViewValue) -> Option<BoundValue> {
        T::from_view(view).map(|value| Box::new(value) as BoundValue)
    }

    fn from_literal(&self, literal: &str) -> Result<BoundValue, DefaultError> {
        T::from_literal(literal).map(|value| Box::new(value) as BoundValue)
    }

    fn assign(&self, value: BoundValue) -> bool {
        match value.downcast::<T>() {
            Ok(value) => self.0.set(*value).is_ok(),
            Err(_) => false,
        }
    }
}

/// One row of a component's slot table
pub struct Slot<'a> {
    /// Field name, used in errors and logs
    pub field: &'static str,
    /// Raw declaration, e.g. `inject:"name,optional:default"`
    pub tag: &'static str,
    pub target: &'a dyn SlotTarget,
}
impl<'a> Slot<'a> {
    pub fn new(field: &'static str, tag: &'static str, target: &'a dyn SlotTarget) -> Self {
        Slot { field, tag, target }
    }
}
impl Debug for Slot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("field", &self.field)
            .field("tag", &self.tag)
            .field("wanted", &self.target.wanted())
            .finish()
    }
}
