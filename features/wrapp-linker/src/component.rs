use std::{future::Future, pin::Pin};

use crate::{cancel::CancelToken, slot::Slot, types::DynError};

/// A registered instance taking part in dependency resolution and the lifecycle
///
/// A component declares its slots through [Component::slots] and its lifecycle hooks through the
/// `as_*` queries. Every query defaults to "not implemented".
///
/// # Example
/// ```rust,ignore
/// #[derive(Default)]
/// struct Server {
///     port: Inject<u16>,
///     store: Inject<Arc<dyn Store>>,
/// }
///
/// impl Component for Server {
///     fn slots(&self) -> Vec<Slot<'_>> {
///         vec![
///             Slot::new("port", r#"inject:"port,optional:8080""#, &self.port),
///             Slot::new("store", r#"inject:"""#, &self.store),
///         ]
///     }
///
///     fn as_init(&self) -> Option<&dyn DynInit> {
///         Some(self)
///     }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// Returns the slot table of the component
    ///
    /// Must return the same rows, in the same order, on every call
    fn slots(&self) -> Vec<Slot<'_>> {
        Vec::new()
    }

    fn as_post_construct(&self) -> Option<&dyn PostConstruct> {
        None
    }

    fn as_init(&self) -> Option<&dyn DynInit> {
        None
    }

    fn as_shutdown(&self) -> Option<&dyn Shutdown> {
        None
    }
}

/// Called once all slots of every component are bound, before any init hook
pub trait PostConstruct {
    fn post_construct(&self);
}

/// Brings the component up, after all of its providers have been initialized
pub trait Init: Send + Sync {
    /// Initializes the component
    ///
    /// The token is shared by every init hook of the run. Long running hooks should observe it,
    /// the linker never interrupts a running hook.
    fn init(
        &self,
        ctx: CancelToken,
    ) -> impl Future<Output = Result<(), impl Into<DynError>>> + Send + '_;
}

/// Called in reverse initialization order when the linked graph shuts down
pub trait Shutdown {
    fn shutdown(&self);
}

/// Wrapper Trait for init hooks, allowing for dynamic dispatch
pub trait DynInit: Send + Sync {
    fn init(
        &self,
        ctx: CancelToken,
    ) -> Pin<Box<dyn Future<Output = Result<(), DynError>> + Send + '_>>;
}
// Impl DynInit for any Init
impl<T: Init> DynInit for T {
    fn init(
        &self,
        ctx: CancelToken,
    ) -> Pin<Box<dyn Future<Output = Result<(), DynError>> + Send + '_>> {
        Box::pin(async move {
            // Forward the call to the specific implementation
            Init::init(self, ctx).await.map_err(|e| e.into())
        })
    }
}
