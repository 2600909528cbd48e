use std::{fmt::Debug, sync::Arc};

use crate::{
    component::Component,
    slot::ViewValue,
    types::{ComponentId, Injectable, TypeInfo},
};

/// One type a provider can be injected as, e.g. its concrete type or a `dyn Trait` it exposes
pub(crate) struct View {
    pub info: TypeInfo,
    make: Box<dyn Fn() -> ViewValue + Send + Sync>,
}
impl View {
    fn of<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Self {
        View {
            info: TypeInfo::of::<T>(),
            make: Box::new(move || Box::new(instance.clone())),
        }
    }

    /// Hands out the provider as `Box<Arc<T>>`
    pub fn value(&self) -> ViewValue {
        (self.make)()
    }
}

/// A pending registration of an instance
///
/// Plain values (numbers, strings, shared services) only act as providers.
/// Components additionally get their slots bound and their lifecycle driven.
pub struct Registration<T: Injectable> {
    instance: Arc<T>,
    views: Vec<View>,
    component: Option<Arc<dyn Component>>,
}
impl<T: Injectable> Registration<T> {
    /// Registers a provider value without slots or lifecycle hooks
    pub fn value(instance: Arc<T>) -> Self {
        Registration {
            views: vec![View::of(instance.clone())],
            instance,
            component: None,
        }
    }

    /// Lets slots of type `Arc<I>` match this instance
    ///
    /// # Example
    /// ```rust,ignore
    /// Registration::component(Arc::new(SqlStore::default())).exposes::<dyn Store>(|store| store)
    /// ```
    pub fn exposes<I: ?Sized + Send + Sync + 'static>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self {
        self.views.push(View::of(cast(self.instance.clone())));
        self
    }
}
impl<T: Component> Registration<T> {
    /// Registers a component, its slots get bound and its hooks called by the linker
    pub fn component(instance: Arc<T>) -> Self {
        let component: Arc<dyn Component> = instance.clone();
        Registration {
            component: Some(component),
            ..Self::value(instance)
        }
    }
}

/// A registered instance
///
/// Registering the same `Arc` again does not create a second entry, the new name and views
/// are added to the existing one.
pub(crate) struct Entry {
    pub id: ComponentId,
    /// Further names the instance was registered under
    pub aliases: Vec<String>,
    pub views: Vec<View>,
    pub component: Option<Arc<dyn Component>>,
    address: usize,
}
impl Entry {
    pub fn view(&self, wanted: TypeInfo) -> Option<&View> {
        self.views.iter().find(|view| view.info == wanted)
    }

    pub fn answers_to(&self, name: &str) -> bool {
        self.id.name.as_deref() == Some(name) || self.aliases.iter().any(|alias| alias == name)
    }

    fn merge(&mut self, name: &str, views: Vec<View>, component: Option<Arc<dyn Component>>) {
        if !name.is_empty() && !self.answers_to(name) {
            if self.id.name.is_none() {
                self.id.name = Some(name.to_string());
            } else {
                self.aliases.push(name.to_string());
            }
        }

        for view in views {
            if self.view(view.info).is_none() {
                self.views.push(view);
            }
        }
        if self.component.is_none() {
            self.component = component;
        }
    }
}

/// Ordered collection of everything registered with a linker
///
/// Duplicate and empty names are allowed, ambiguity is judged by the resolver.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}
impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.id.to_string()))
            .finish()
    }
}

impl Registry {
    /// Appends a registration, an empty name registers it anonymously
    ///
    /// An instance that is already registered keeps its entry and gains the name
    pub(crate) fn push<T: Injectable>(&mut self, name: &str, registration: Registration<T>) {
        let address = Arc::as_ptr(&registration.instance) as *const () as usize;
        let type_info = TypeInfo::of::<T>();

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.address == address && entry.id.type_info == type_info)
        {
            entry.merge(name, registration.views, registration.component);
            tracing::debug!("Registered {} again as '{}'", entry.id, name);
            return;
        }

        let id = ComponentId {
            index: self.entries.len(),
            name: (!name.is_empty()).then(|| name.to_string()),
            type_info,
        };
        tracing::debug!("Registered {}", id);

        self.entries.push(Entry {
            id,
            aliases: Vec::new(),
            views: registration.views,
            component: registration.component,
            address,
        });
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn entry(&self, index: usize) -> &Entry {
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Everything injectable as `wanted`, in registration order
    pub(crate) fn compatible(&self, wanted: TypeInfo) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(move |entry| entry.view(wanted).is_some())
    }

    /// Everything registered under `name`, in registration order
    pub(crate) fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Entry> {
        self.entries
            .iter()
            .filter(move |entry| entry.answers_to(name))
    }

    /// Ids of all registered instances, in registration order
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.entries.iter().map(|entry| &entry.id)
    }
}
