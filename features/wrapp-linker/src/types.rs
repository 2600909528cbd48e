use std::{any::TypeId, fmt::Display};

/// Boxed error returned by lifecycle hooks
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything registered with the linker may be shared with dependents living on other threads,
/// so it needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Identifies a registered component in errors, logs and the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentId {
    /// Position in registration order
    pub index: usize,
    /// Registered name, `None` for anonymous registrations
    pub name: Option<String>,
    pub type_info: TypeInfo,
}
impl Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "'{}' ({})", name, self.type_info),
            None => write!(f, "#{} ({})", self.index, self.type_info),
        }
    }
}
