use std::sync::Arc;

use crate::{resolver::SlotValue, slot::ViewValue, types::TypeInfo};

/// Shared providers, `T` may be a concrete type or a `dyn Trait` the provider exposes
impl<T: ?Sized + Send + Sync + 'static> SlotValue for Arc<T> {
    fn provided_by() -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn from_view(view: ViewValue) -> Option<Self> {
        view.downcast::<Arc<T>>().ok().map(|shared| *shared)
    }
}
