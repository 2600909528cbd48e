//! Wrapp Linker wires a set of registered components together and drives them through their
//! lifecycle.
//!
//! Each component declares its injectable slots through a small static table. The linker binds
//! every slot to exactly one registered provider (or the slot's default), rejects ambiguous,
//! missing and cyclic configurations before any hook runs, and then calls the hooks:
//! 1. `post_construct` on every component
//! 2. `init` in dependency order, providers first, sharing one [CancelToken]
//! 3. `shutdown` in exact reverse of the realized init order, once the owner asks for it
//!
//! If an `init` hook fails or the token fires, everything initialized so far is shut down
//! in reverse and a single [LinkError::InitializationFailed] is returned.
//!
//! # Examples
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Database {
//!     url: Inject<String>,
//!     pool_size: Inject<u32>,
//! }
//! impl Component for Database {
//!     fn slots(&self) -> Vec<Slot<'_>> {
//!         vec![
//!             Slot::new("url", r#"inject:"dbUrl""#, &self.url),
//!             Slot::new("pool_size", r#"inject:"poolSize,optional:8""#, &self.pool_size),
//!         ]
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Api {
//!     db: Inject<Arc<Database>>,
//! }
//! impl Component for Api {
//!     fn slots(&self) -> Vec<Slot<'_>> {
//!         vec![Slot::new("db", r#"inject:"""#, &self.db)]
//!     }
//! }
//!
//! async fn run() -> Result<(), LinkError> {
//!     let mut linked = Linker::new()
//!         .register("dbUrl", Registration::value(Arc::new("postgres://localhost".to_string())))
//!         .register("", Registration::component(Arc::new(Database::default())))
//!         .register("api", Registration::component(Arc::new(Api::default())))
//!         .initialize_all_timeout(Duration::from_secs(5))
//!         .await?;
//!
//!     // ... serve
//!
//!     linked.shutdown_all();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod cancel;
pub mod component;
pub mod config;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod slot;
pub mod tags;
pub mod types;

mod initiator;

pub use builder::Linker;
pub use cancel::{CancelReason, CancelToken};
pub use component::{Component, DynInit, Init, PostConstruct, Shutdown};
pub use config::LinkerConfig;
pub use container::Linked;
pub use dependency_graph::{DependencyGraph, DependencyGraphError};
pub use errors::{DefaultError, InitFailure, LinkError};
pub use lifecycle::LifecycleState;
pub use registry::{Registration, Registry};
pub use resolver::{BindingSource, SlotValue};
pub use slot::{Inject, Slot, SlotTarget};
pub use tags::{ParsedTag, StructTagParser, TagError, TagParser};
pub use types::{ComponentId, DynError, Injectable, TypeInfo};
