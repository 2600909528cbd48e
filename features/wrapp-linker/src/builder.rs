use std::{fmt::Debug, time::Duration};

use crate::{
    cancel::CancelToken,
    config::LinkerConfig,
    container::Linked,
    errors::LinkError,
    initiator::LinkInitiator,
    registry::{Registration, Registry},
    tags::{StructTagParser, TagParser},
    types::Injectable,
};

/// The Linker where one registers all components and provider values
///
/// Linking happens in [Linker::initialize_all]:
/// 1. every slot is resolved against the registrations and checked for cycles
/// 2. slots are written and post construct hooks run
/// 3. init hooks run, providers before their dependents
///
/// The result is a [Linked] graph, which runs the shutdown hooks in reverse.
pub struct Linker {
    registry: Registry,
    config: LinkerConfig,
    parser: Box<dyn TagParser>,
}
impl Default for Linker {
    fn default() -> Self {
        Self::new()
    }
}
impl Debug for Linker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linker")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

impl Linker {
    pub fn new() -> Self {
        Self::with_config(LinkerConfig::default())
    }

    pub fn with_config(config: LinkerConfig) -> Self {
        Linker {
            registry: Registry::default(),
            parser: Box::new(StructTagParser::new(config.tag_key.clone())),
            config,
        }
    }

    /// Replaces the parser used for slot tags
    pub fn tag_parser(mut self, parser: impl TagParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Registers an instance, an empty name registers it anonymously
    ///
    /// Names don't have to be unique, ambiguity is only an error for slots that can't tell the
    /// candidates apart.
    pub fn register<T: Injectable>(mut self, name: &str, registration: Registration<T>) -> Self {
        self.registry.push(name, registration);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Links and initializes everything, bounded by [LinkerConfig::init_timeout] if set
    pub async fn initialize(self) -> Result<Linked, LinkError> {
        let ctx = match self.config.init_timeout {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        };
        self.initialize_all(ctx).await
    }

    /// Links and initializes everything
    ///
    /// The token is handed to every init hook. If an init hook fails, or the token fires before
    /// or during a hook, the already initialized components are shut down in reverse order and
    /// the failure is returned.
    pub async fn initialize_all(self, ctx: CancelToken) -> Result<Linked, LinkError> {
        LinkInitiator::new(self.registry)
            .initiate(self.parser.as_ref(), ctx)
            .await
    }

    pub async fn initialize_all_timeout(self, timeout: Duration) -> Result<Linked, LinkError> {
        self.initialize_all(CancelToken::with_timeout(timeout)).await
    }
}
